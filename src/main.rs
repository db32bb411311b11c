use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use assembly_index::assembly::{pathway_search_interruptible, SearchOptions, Variant};
use assembly_index::enumerate::subgraph_count;
use assembly_index::loader;
use assembly_index::pathway::{assembly_string, pathway_from_graphs, Pathway};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the input file (.mol by default; see --graph and --pathway).
    input: PathBuf,

    /// Parse the input as a plain five-line graph file instead of a molfile.
    #[arg(long)]
    graph: bool,

    /// The input is an SDF record list describing a starting pathway: the
    /// original molecule first, the remnant last, duplicate fragments in
    /// between.
    #[arg(long, conflicts_with = "graph")]
    pathway: bool,

    /// Count the connected subgraphs of the input and exit without searching.
    #[arg(long)]
    molinfo: bool,

    /// Number of workers in the search pool.
    #[arg(long, default_value_t = 100)]
    workers: usize,

    /// Capacity of the bounded job queue; a full queue pushes workers into
    /// depth-first search.
    #[arg(long, default_value_t = 100)]
    queue: usize,

    /// Which pathways to report.
    #[arg(long, value_enum, default_value = "shortest")]
    variant: Variant,

    /// Print full pathway information, not just the assembly index.
    #[arg(long)]
    verbose: bool,

    /// Log search progress at debug level.
    #[arg(long)]
    debug: bool,
}

#[cfg(unix)]
fn spawn_interrupt_listener(interrupt: mpsc::Sender<()>) -> Result<()> {
    use signal_hook::consts::SIGINT;
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT]).context("Cannot register SIGINT handler.")?;
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            eprintln!("interrupted - exiting with the best pathway found");
            let _ = interrupt.send(());
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_interrupt_listener(_interrupt: mpsc::Sender<()>) -> Result<()> {
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    let input = fs::read_to_string(&cli.input).context("Cannot read input file.")?;

    // Build the original graph and the starting pathway.
    let (original, seed) = if cli.pathway {
        let graphs = loader::parse_sdfile_str(&input).context("Cannot parse SDF input.")?;
        pathway_from_graphs(graphs)
    } else if cli.graph {
        let (graph, _name) = loader::parse_graph_str(&input).context("Cannot parse graph file.")?;
        let seed = Pathway::seed(&graph);
        (graph, seed)
    } else {
        let graph = loader::parse_molfile_str(&input).context("Cannot parse molfile.")?;
        let seed = Pathway::seed(&graph);
        (graph, seed)
    };

    if cli.molinfo {
        println!("{original}");
        println!("connected subgraphs: {}", subgraph_count(&original));
        return Ok(());
    }

    let options = SearchOptions {
        workers: cli.workers,
        queue_capacity: cli.queue,
        variant: cli.variant,
    };

    let (interrupt_tx, interrupt_rx) = mpsc::channel();
    spawn_interrupt_listener(interrupt_tx)?;

    let start = Instant::now();
    let (pathways, index) = pathway_search_interruptible(&original, seed, &options, interrupt_rx);
    let elapsed = start.elapsed();

    if cli.verbose {
        println!("running on file: {}", cli.input.display());
        println!("{}", assembly_string(&pathways, &original));
        println!("assembly index: {index}");
        println!("time (seconds): {}", elapsed.as_secs_f64());
    } else {
        println!("{index}");
    }

    Ok(())
}
