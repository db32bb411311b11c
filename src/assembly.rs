//! The parallel branch-and-bound assembly search.
//!
//! A pool of workers consumes pathways from a bounded FIFO job queue. Each
//! job tries to extend its pathway by one more duplicate: connected subgraphs
//! of the remnant (up to half its edges) are matched against the rest of the
//! remnant, and every match spawns a child pathway, published back to the
//! queue when there is room and otherwise recursed on depth first in the
//! producing worker. A mutex-guarded incumbent prunes pathways whose
//! optimistic floor cannot beat the best index already achieved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::Mutex;
use std::thread;

use clap::ValueEnum;
use log::{debug, info};

use crate::bounds::best_assembly_index;
use crate::canonize::are_isomorphic;
use crate::enumerate::EdgeTrace;
use crate::graph::Graph;
use crate::pathway::{Duplicates, Pathway};
use crate::split::{break_on_edges, recombine};

/// Which pathways the search reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Default)]
pub enum Variant {
    /// One shortest pathway.
    #[default]
    Shortest,
    /// Every shortest pathway. Reserved: the collected list is not
    /// deduplicated, so equivalent pathways may be reported more than once.
    #[value(name = "all_shortest")]
    AllShortest,
    /// Every pathway. Reserved; currently behaves like `shortest`.
    All,
}

/// Tuning knobs for the worker pool.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Number of pool workers; at least 1.
    pub workers: usize,
    /// Capacity of the bounded job queue; at least 1. A full queue pushes the
    /// producing worker into depth-first recursion.
    pub queue_capacity: usize,
    pub variant: Variant,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: 100,
            queue_capacity: 100,
            variant: Variant::Shortest,
        }
    }
}

enum Job {
    Extend(Pathway),
    Stop,
}

/// State shared by every worker for one search run.
struct Search<'a> {
    original: &'a Graph,
    variant: Variant,
    jobs: SyncSender<Job>,
    best: Mutex<Vec<Pathway>>,
    active: Mutex<i64>,
    done: SyncSender<()>,
    stop: AtomicBool,
}

impl Search<'_> {
    /// A pathway is dead when the incumbent's achieved index already beats
    /// the best this pathway could still reach.
    fn prune(&self, pathway: &Pathway) -> bool {
        let best = self.best.lock().expect("best holder poisoned");
        best[0].assembly_index(self.original) < best_assembly_index(self.original, pathway)
    }

    fn record_if_better(&self, pathway: &Pathway) {
        let mut best = self.best.lock().expect("best holder poisoned");
        let best_saved = best[0].steps_saved();
        let new_saved = pathway.steps_saved();
        if new_saved > best_saved {
            debug!(
                "new best pathway: {} steps saved, index {}",
                new_saved,
                pathway.assembly_index(self.original)
            );
            *best = vec![pathway.clone()];
        } else if new_saved == best_saved && new_saved > 0 && self.variant == Variant::AllShortest {
            best.push(pathway.clone());
        }
    }

    fn add_job(&self) {
        *self.active.lock().expect("job counter poisoned") += 1;
    }

    fn idle(&self) -> bool {
        *self.active.lock().expect("job counter poisoned") == 0
    }

    /// Process one job. Every invocation accounts for exactly one active job,
    /// whether the job came from the queue or from the depth-first fallback.
    fn extend_pathway(&self, pathway: Pathway) {
        if !self.stop.load(Ordering::Relaxed) && !self.prune(&pathway) {
            self.record_if_better(&pathway);
            self.search_duplicates(&pathway);
        }
        *self.active.lock().expect("job counter poisoned") -= 1;
    }

    /// Enumerate candidate duplicate subgraphs of the remnant in trace order.
    /// A candidate with no match anywhere in the rest of the remnant has no
    /// matching superset either, so its branch of the trace is abandoned.
    fn search_duplicates(&self, pathway: &Pathway) {
        let remnant = pathway.remnant();
        let cap = remnant.edge_count() / 2;
        let adjacencies = remnant.edge_adjacencies();

        for anchor in 0..remnant.edge_count() {
            let mut trace = EdgeTrace::new(&adjacencies, anchor);
            loop {
                if trace.grow(Some(cap)) {
                    let (candidate, rest) = break_on_edges(remnant, trace.current());
                    if self.find_matches(pathway, &candidate, &rest) {
                        continue;
                    }
                }
                if !trace.retreat() {
                    break;
                }
            }
        }
    }

    /// Search `rest` for connected subgraphs of exactly the candidate's size
    /// that are isomorphic to it. Each unordered pair is considered once: the
    /// candidate's sorted edge list must be strictly less than the match's.
    /// Returns whether any match was found.
    fn find_matches(&self, pathway: &Pathway, candidate: &Graph, rest: &Graph) -> bool {
        let size = candidate.edge_count();
        let candidate_edges = candidate.flat_sorted_edges();
        let adjacencies = rest.edge_adjacencies();
        let mut matched = false;

        for anchor in 0..rest.edge_count() {
            let mut trace = EdgeTrace::new(&adjacencies, anchor);
            loop {
                if trace.grow(Some(size)) {
                    if trace.len() == size {
                        let (duplicate, remainder) = break_on_edges(rest, trace.current());
                        if edge_list_less(&candidate_edges, &duplicate.flat_sorted_edges())
                            && are_isomorphic(candidate, &duplicate)
                        {
                            matched = true;
                            self.publish(pathway, candidate, &duplicate, &remainder);
                        }
                    }
                    continue;
                }
                if !trace.retreat() {
                    break;
                }
            }
        }
        matched
    }

    /// Extend a deep copy of the pathway with the discovered duplicate and
    /// hand it to the pool. The new remnant is the remainder and the matched
    /// copy placed side by side, not reconnected; renumbered vertices flow
    /// into the atom-equivalence classes.
    fn publish(&self, pathway: &Pathway, candidate: &Graph, duplicate: &Graph, remainder: &Graph) {
        let mut child = pathway.clone();
        child.fragments.push(candidate.clone());
        child.duplicates.push(Duplicates {
            left: candidate.edges(),
            right: duplicate.edges(),
        });
        let (remnant, vertex_map) = recombine(remainder, duplicate);
        child.remnant = remnant;
        child.update_atom_equivalents(&vertex_map);

        self.add_job();
        if let Err(err) = self.jobs.try_send(Job::Extend(child)) {
            let job = match err {
                TrySendError::Full(job) | TrySendError::Disconnected(job) => job,
            };
            if let Job::Extend(child) = job {
                // Queue saturated: this worker extends the child itself.
                self.extend_pathway(child);
            }
        }
    }
}

fn worker_loop(search: &Search<'_>, jobs: &Mutex<Receiver<Job>>) {
    loop {
        let job = {
            let receiver = jobs.lock().expect("job queue poisoned");
            receiver.recv()
        };
        match job {
            Ok(Job::Extend(pathway)) => {
                search.extend_pathway(pathway);
                if search.idle() {
                    let _ = search.done.try_send(());
                }
            }
            Ok(Job::Stop) | Err(_) => return,
        }
    }
}

/// Length-first, then lexicographic comparison of flattened sorted edge
/// lists.
fn edge_list_less(left: &[u32], right: &[u32]) -> bool {
    if left.len() != right.len() {
        return left.len() < right.len();
    }
    left < right
}

/// Find one shortest assembly pathway for `graph` and its assembly index.
pub fn index_search(graph: &Graph, options: &SearchOptions) -> (Vec<Pathway>, usize) {
    pathway_search(graph, Pathway::seed(graph), options)
}

/// Like [`index_search`], but starting from a caller-supplied pathway, e.g.
/// to force a particular duplicate into every solution.
pub fn pathway_search(graph: &Graph, seed: Pathway, options: &SearchOptions) -> (Vec<Pathway>, usize) {
    run_search(graph, seed, options, None)
}

/// Like [`pathway_search`], with an interrupt channel: any message (or the
/// sender disconnecting after a message) ends the search early, returning the
/// best pathway found so far. The CLI wires OS signals to this.
pub fn pathway_search_interruptible(
    graph: &Graph,
    seed: Pathway,
    options: &SearchOptions,
    interrupt: Receiver<()>,
) -> (Vec<Pathway>, usize) {
    run_search(graph, seed, options, Some(interrupt))
}

fn run_search(
    graph: &Graph,
    seed: Pathway,
    options: &SearchOptions,
    interrupt: Option<Receiver<()>>,
) -> (Vec<Pathway>, usize) {
    assert!(options.workers >= 1, "the search needs at least one worker");
    assert!(options.queue_capacity >= 1, "the job queue needs capacity of at least one");

    let (jobs_tx, jobs_rx) = sync_channel(options.queue_capacity);
    let (done_tx, done_rx) = sync_channel::<()>(1);

    let search = Search {
        original: graph,
        variant: options.variant,
        jobs: jobs_tx.clone(),
        best: Mutex::new(vec![seed.clone()]),
        active: Mutex::new(1),
        done: done_tx.clone(),
        stop: AtomicBool::new(false),
    };

    if let Some(receiver) = interrupt {
        // Detached forwarder: one interrupt message becomes the done signal.
        // After the search finishes the send fails and the thread exits.
        let done = done_tx.clone();
        thread::spawn(move || {
            if receiver.recv().is_ok() {
                info!("interrupted; returning the best pathway found so far");
                let _ = done.try_send(());
            }
        });
    }

    info!(
        "assembly search over {} edges: {} workers, queue capacity {}",
        graph.edge_count(),
        options.workers,
        options.queue_capacity
    );

    let jobs_rx = Mutex::new(jobs_rx);
    jobs_tx
        .send(Job::Extend(seed))
        .expect("job queue closed before the search started");

    thread::scope(|scope| {
        for _ in 0..options.workers {
            scope.spawn(|| worker_loop(&search, &jobs_rx));
        }

        done_rx
            .recv()
            .expect("the done channel cannot close before a signal");

        // Poison the pool; each worker consumes exactly one Stop and exits.
        search.stop.store(true, Ordering::Relaxed);
        for _ in 0..options.workers {
            let _ = jobs_tx.send(Job::Stop);
        }
    });

    let best = search
        .best
        .into_inner()
        .expect("best holder poisoned");
    let index = best[0].assembly_index(graph);
    info!("assembly search finished: index {index}");
    (best, index)
}
