//! End-to-end assembly search checks on known graphs and molecules.

use std::fs;
use std::path::Path;

use assembly_index::assembly::{index_search, pathway_search, SearchOptions, Variant};
use assembly_index::bounds::{best_assembly_index, max_steps_saved};
use assembly_index::enumerate::subgraph_count;
use assembly_index::graph::Graph;
use assembly_index::loader::{parse_graph_str, parse_molfile_str};
use assembly_index::pathway::Pathway;

fn load_graph(name: &str) -> Graph {
    let path = Path::new("data").join("graphs").join(name);
    let text = fs::read_to_string(&path).unwrap_or_else(|_| panic!("cannot read {path:?}"));
    parse_graph_str(&text)
        .unwrap_or_else(|e| panic!("cannot parse {path:?}: {e}"))
        .0
}

fn load_molecule(name: &str) -> Graph {
    let path = Path::new("data").join("checks").join(name);
    let text = fs::read_to_string(&path).unwrap_or_else(|_| panic!("cannot read {path:?}"));
    parse_molfile_str(&text).unwrap_or_else(|e| panic!("cannot parse {path:?}: {e}"))
}

fn options(workers: usize, queue: usize) -> SearchOptions {
    SearchOptions {
        workers,
        queue_capacity: queue,
        variant: Variant::Shortest,
    }
}

#[test]
fn triangle_assembly_index_is_two() {
    let (_, index) = index_search(&load_graph("triangle.txt"), &options(100, 100));
    assert_eq!(index, 2);
}

#[test]
fn square_assembly_index_is_two() {
    let (_, index) = index_search(&load_graph("square.txt"), &options(100, 100));
    assert_eq!(index, 2);
}

#[test]
fn aspirin_has_579_subgraphs() {
    assert_eq!(subgraph_count(&load_molecule("aspirin.mol")), 579);
}

#[test]
fn aspirin_assembly_index_is_eight() {
    let aspirin = load_molecule("aspirin.mol");
    let (pathways, index) = index_search(&aspirin, &options(100, 100));
    assert_eq!(index, 8);
    assert_eq!(pathways[0].assembly_index(&aspirin), 8);
}

#[test]
fn nine_grid_remnant_bound() {
    // Twelve edges in one component: (12 - 1) - floor(log2(12)) = 8.
    let grid = load_graph("ninegrid.txt");
    assert_eq!(max_steps_saved(&Pathway::seed(&grid)), 8);
}

#[test]
fn fragment_savings_over_nine_grid() {
    // Fragments of four and three edges save 5 of the 11 naive steps.
    let pathway = Pathway::new(
        vec![load_graph("square.txt"), load_graph("triangle.txt")],
        load_graph("square.txt"),
        Vec::new(),
        Vec::new(),
    );
    assert_eq!(pathway.steps_saved(), 5);
    assert_eq!(pathway.assembly_index(&load_graph("ninegrid.txt")), 6);
}

#[test]
fn seeded_search_matches_unseeded() {
    let square = load_graph("square.txt");
    let seed = Pathway::seed(&square);
    let (_, seeded) = pathway_search(&square, seed, &options(8, 8));
    let (_, unseeded) = index_search(&square, &options(8, 8));
    assert_eq!(seeded, unseeded);
}

#[test]
fn serial_runs_are_deterministic() {
    let square = load_graph("square.txt");
    let triangle = load_graph("triangle.txt");
    for _ in 0..100 {
        assert_eq!(index_search(&square, &options(1, 1)).1, 2);
        assert_eq!(index_search(&triangle, &options(1, 1)).1, 2);
    }
}

#[test]
fn parallel_runs_are_deterministic() {
    let square = load_graph("square.txt");
    for _ in 0..50 {
        assert_eq!(index_search(&square, &options(100, 100)).1, 2);
    }
}

#[test]
fn aspirin_parallel_runs_agree() {
    let aspirin = load_molecule("aspirin.mol");
    for _ in 0..3 {
        assert_eq!(index_search(&aspirin, &options(100, 100)).1, 8);
    }
}

#[test]
fn incumbent_index_is_within_bounds() {
    let benzene = load_molecule("benzene.mol");
    let (pathways, index) = index_search(&benzene, &options(8, 8));
    let edge_count = benzene.edge_count();
    assert!(index <= edge_count - 1);
    for pathway in &pathways {
        let achieved = pathway.assembly_index(&benzene);
        assert!(achieved <= edge_count - 1);
        assert!(best_assembly_index(&benzene, pathway) <= achieved);
    }
}
