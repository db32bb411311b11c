//! Enumerate connected edge-induced subgraphs with the path-trace algorithm
//! of Rücker & Rücker (2000).
//!
//! A trace is anchored at an edge `e` and visits every connected subgraph
//! whose minimum edge index is `e` exactly once. Running one trace per anchor
//! therefore covers every connected edge-induced subgraph of the graph
//! exactly once. Anchors are independent and fan out in parallel.

use std::sync::mpsc::Sender;

use bit_set::BitSet;
use rayon::prelude::*;

use crate::graph::Graph;

/// One anchored path trace: the subgraph under construction, grown one edge
/// at a time towards the first non-forbidden neighbor and shrunk again with
/// forbidden-level bookkeeping so no subgraph is ever produced twice.
///
/// Edges with indices below the anchor are invisible to the trace; together
/// with one trace per anchor this yields exactly-once enumeration.
pub struct EdgeTrace<'a> {
    adjacencies: &'a [Vec<usize>],
    anchor: usize,
    sub: Vec<usize>,
    in_sub: BitSet,
    forbidden: BitSet,
    forbid_level: Vec<usize>,
}

impl<'a> EdgeTrace<'a> {
    /// Start a trace at `anchor`. The initial one-edge subgraph counts as
    /// produced.
    pub fn new(adjacencies: &'a [Vec<usize>], anchor: usize) -> Self {
        let n = adjacencies.len();
        let mut in_sub = BitSet::with_capacity(n);
        in_sub.insert(anchor);
        Self {
            adjacencies,
            anchor,
            sub: vec![anchor],
            in_sub,
            forbidden: BitSet::with_capacity(n),
            forbid_level: vec![0; n],
        }
    }

    /// The current subgraph, as edge indices in insertion order.
    pub fn current(&self) -> &[usize] {
        &self.sub
    }

    pub fn len(&self) -> usize {
        self.sub.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub.is_empty()
    }

    /// The first non-forbidden neighbor of the current subgraph: subgraph
    /// edges are scanned in insertion order, their adjacency lists in
    /// ascending order.
    fn neighbor(&self) -> Option<usize> {
        for &e in &self.sub {
            for &f in &self.adjacencies[e] {
                if f >= self.anchor && !self.in_sub.contains(f) && !self.forbidden.contains(f) {
                    return Some(f);
                }
            }
        }
        None
    }

    /// Extend the subgraph by one edge if a non-forbidden neighbor exists and
    /// the result stays within `cap` edges. Returns whether it grew; a grown
    /// subgraph counts as produced.
    pub fn grow(&mut self, cap: Option<usize>) -> bool {
        if let Some(cap) = cap {
            if self.sub.len() + 1 > cap {
                return false;
            }
        }
        match self.neighbor() {
            Some(f) => {
                self.sub.push(f);
                self.in_sub.insert(f);
                true
            }
            None => false,
        }
    }

    /// Pop the last edge and forbid it at the size it was popped from; any
    /// edge forbidden at a deeper level is unforbidden again. Returns `false`
    /// once the subgraph is empty, which ends the trace.
    pub fn retreat(&mut self) -> bool {
        let level = self.sub.len();
        let popped = self.sub.pop().expect("retreat on an exhausted trace");
        self.in_sub.remove(popped);
        let lifted: Vec<usize> = self
            .forbidden
            .iter()
            .filter(|&e| self.forbid_level[e] > level)
            .collect();
        for e in lifted {
            self.forbidden.remove(e);
        }
        self.forbidden.insert(popped);
        self.forbid_level[popped] = level;
        !self.sub.is_empty()
    }
}

/// Count the subgraphs anchored at one edge.
fn count_on_anchor(adjacencies: &[Vec<usize>], anchor: usize) -> usize {
    let mut trace = EdgeTrace::new(adjacencies, anchor);
    let mut count = 1;
    loop {
        if trace.grow(None) {
            count += 1;
        } else if !trace.retreat() {
            return count;
        }
    }
}

/// Collect the subgraphs anchored at one edge, in trace order.
fn collect_on_anchor(adjacencies: &[Vec<usize>], anchor: usize) -> Vec<Vec<usize>> {
    let mut trace = EdgeTrace::new(adjacencies, anchor);
    let mut subgraphs = vec![trace.current().to_vec()];
    loop {
        if trace.grow(None) {
            subgraphs.push(trace.current().to_vec());
        } else if !trace.retreat() {
            return subgraphs;
        }
    }
}

/// The number of connected edge-induced subgraphs of `g`, without
/// materializing them.
pub fn subgraph_count(g: &Graph) -> usize {
    let adjacencies = g.edge_adjacencies();
    (0..g.edge_count())
        .into_par_iter()
        .map(|anchor| count_on_anchor(&adjacencies, anchor))
        .sum()
}

/// Every connected edge-induced subgraph of `g` as an edge-index list,
/// grouped by anchor in ascending anchor order.
pub fn all_subgraphs(g: &Graph) -> Vec<Vec<usize>> {
    let adjacencies = g.edge_adjacencies();
    let mut per_anchor: Vec<Vec<Vec<usize>>> = (0..g.edge_count())
        .into_par_iter()
        .map(|anchor| collect_on_anchor(&adjacencies, anchor))
        .collect();
    per_anchor.drain(..).flatten().collect()
}

/// Stream every connected edge-induced subgraph of `g` into `sink`, one
/// anchor per parallel task. The sink's channel is closed when the last
/// anchor finishes. Subgraphs from different anchors interleave arbitrarily.
pub fn stream_subgraphs(g: &Graph, sink: Sender<Vec<usize>>) {
    let adjacencies = g.edge_adjacencies();
    rayon::scope(|scope| {
        for anchor in 0..g.edge_count() {
            let sink = sink.clone();
            let adjacencies = &adjacencies;
            scope.spawn(move |_| {
                let mut trace = EdgeTrace::new(adjacencies, anchor);
                let _ = sink.send(trace.current().to_vec());
                loop {
                    if trace.grow(None) {
                        let _ = sink.send(trace.current().to_vec());
                    } else if !trace.retreat() {
                        break;
                    }
                }
            });
        }
    });
    drop(sink);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::mpsc;

    use super::*;

    fn triangle() -> Graph {
        Graph::new(vec![0, 1, 2], vec![(0, 1), (1, 2), (2, 0)])
    }

    fn square() -> Graph {
        Graph::new(vec![0, 1, 2, 3], vec![(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    #[test]
    fn triangle_has_seven_subgraphs() {
        // 3 single edges, 3 two-edge paths, 1 triangle.
        assert_eq!(subgraph_count(&triangle()), 7);
    }

    #[test]
    fn square_has_thirteen_subgraphs() {
        assert_eq!(subgraph_count(&square()), 13);
    }

    #[test]
    fn six_ring_has_thirty_one_subgraphs() {
        let ring = Graph::new(
            vec![0, 1, 2, 3, 4, 5],
            vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)],
        );
        assert_eq!(subgraph_count(&ring), 31);
    }

    #[test]
    fn collect_agrees_with_count() {
        for g in [triangle(), square()] {
            assert_eq!(all_subgraphs(&g).len(), subgraph_count(&g));
        }
    }

    #[test]
    fn stream_agrees_with_collect() {
        let g = square();
        let (tx, rx) = mpsc::channel();
        stream_subgraphs(&g, tx);
        let streamed: HashSet<Vec<usize>> = rx
            .iter()
            .map(|mut sub| {
                sub.sort_unstable();
                sub
            })
            .collect();
        let collected: HashSet<Vec<usize>> = all_subgraphs(&g)
            .into_iter()
            .map(|mut sub| {
                sub.sort_unstable();
                sub
            })
            .collect();
        assert_eq!(streamed, collected);
    }

    #[test]
    fn subgraphs_are_unique_and_connected() {
        let g = square();
        let subs = all_subgraphs(&g);
        let distinct: HashSet<Vec<usize>> = subs
            .iter()
            .map(|sub| {
                let mut sorted = sub.clone();
                sorted.sort_unstable();
                sorted
            })
            .collect();
        assert_eq!(distinct.len(), subs.len());

        let adjacencies = g.edge_adjacencies();
        for sub in &subs {
            // Each edge after the first must touch an earlier edge.
            for (i, &e) in sub.iter().enumerate().skip(1) {
                assert!(sub[..i].iter().any(|&f| adjacencies[f].contains(&e)));
            }
        }
    }

    #[test]
    fn anchor_respects_minimum_index() {
        let g = triangle();
        let adjacencies = g.edge_adjacencies();
        let subs = collect_on_anchor(&adjacencies, 1);
        // Anchored at 1, edge 0 never appears.
        assert!(subs.iter().all(|sub| !sub.contains(&0)));
        assert_eq!(subs.len(), 2); // [1] and [1, 2]
    }

    #[test]
    fn grow_respects_cap() {
        let g = square();
        let adjacencies = g.edge_adjacencies();
        let mut trace = EdgeTrace::new(&adjacencies, 0);
        assert!(trace.grow(Some(2)));
        assert!(!trace.grow(Some(2)));
        assert_eq!(trace.len(), 2);
    }
}
