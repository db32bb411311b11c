//! Splitting graphs on edge sets and recombining the pieces.

use std::collections::BTreeMap;

use crate::graph::Graph;

/// Partition `g`'s edges into the graph induced by `edges` and its
/// complement. Each output keeps only the vertices touched by its edges,
/// with their original labels and colors, in first-touch order.
pub fn break_on_edges(g: &Graph, edges: &[usize]) -> (Graph, Graph) {
    let mut broken = GraphBuilder::new(g);
    let mut remnant = GraphBuilder::new(g);
    for i in 0..g.edge_count() {
        if edges.contains(&i) {
            broken.push_edge(i);
        } else {
            remnant.push_edge(i);
        }
    }
    (broken.finish(), remnant.finish())
}

/// Incrementally copies edges (and the vertices they touch) out of a source
/// graph.
struct GraphBuilder<'a> {
    source: &'a Graph,
    vertices: Vec<u32>,
    edges: Vec<(u32, u32)>,
    vertex_colors: Vec<String>,
    edge_colors: Vec<String>,
}

impl<'a> GraphBuilder<'a> {
    fn new(source: &'a Graph) -> Self {
        Self {
            source,
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_colors: Vec::new(),
            edge_colors: Vec::new(),
        }
    }

    fn push_edge(&mut self, edge: usize) {
        let (u, v) = self.source.edge_endpoints(edge);
        for label in [u, v] {
            if !self.vertices.contains(&label) {
                self.vertices.push(label);
                if let Some(color) = self.source.vertex_color(label) {
                    self.vertex_colors.push(color.to_owned());
                }
            }
        }
        self.edges.push((u, v));
        if let Some(color) = self.source.edge_color(edge) {
            self.edge_colors.push(color.to_owned());
        }
    }

    fn finish(self) -> Graph {
        Graph::with_colors(self.vertices, self.edges, self.vertex_colors, self.edge_colors)
    }
}

/// Place two graphs side by side in a single graph without connecting them.
/// Left-side labels are preserved; right-side labels that collide with the
/// left are renumbered from one past the overall maximum. Returns the
/// combined graph and the old-to-new map for every right-side vertex, so
/// callers can update atom-equivalence bookkeeping.
pub fn recombine(left: &Graph, right: &Graph) -> (Graph, BTreeMap<u32, u32>) {
    let mut vertices = Vec::new();
    let mut edges = Vec::new();
    let mut vertex_colors = Vec::new();
    let mut edge_colors = Vec::new();

    for (label, color) in left.vertex_rows() {
        vertices.push(label);
        if let Some(c) = color {
            vertex_colors.push(c.to_owned());
        }
    }
    for ((u, v), color) in left.edge_rows() {
        edges.push((u, v));
        if let Some(c) = color {
            edge_colors.push(c.to_owned());
        }
    }

    let mut next = left.max_label().max(right.max_label()) + 1;
    let mut vertex_map = BTreeMap::new();
    for (label, color) in right.vertex_rows() {
        let new_label = if vertices.contains(&label) {
            let fresh = next;
            next += 1;
            fresh
        } else {
            label
        };
        vertices.push(new_label);
        vertex_map.insert(label, new_label);
        if let Some(c) = color {
            vertex_colors.push(c.to_owned());
        }
    }
    for ((u, v), color) in right.edge_rows() {
        edges.push((vertex_map[&u], vertex_map[&v]));
        if let Some(c) = color {
            edge_colors.push(c.to_owned());
        }
    }

    (
        Graph::with_colors(vertices, edges, vertex_colors, edge_colors),
        vertex_map,
    )
}

/// Partition the edge indices of `g` into connected components by breadth
/// first search over edge adjacency. Components are discovered in ascending
/// order of their smallest edge index.
pub fn connected_component_edges(g: &Graph) -> Vec<Vec<usize>> {
    let adjacencies = g.edge_adjacencies();
    let mut used = vec![false; g.edge_count()];
    let mut components = Vec::new();

    for start in 0..g.edge_count() {
        if used[start] {
            continue;
        }
        let mut component = vec![start];
        used[start] = true;
        let mut cursor = 0;
        while cursor < component.len() {
            for &next in &adjacencies[component[cursor]] {
                if !used[next] {
                    used[next] = true;
                    component.push(next);
                }
            }
            cursor += 1;
        }
        components.push(component);
    }
    components
}
