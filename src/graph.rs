//! Labeled multigraph values with optional vertex and edge colors.
//!
//! Vertices carry integer labels that are stable across derivation (splitting,
//! recombination, permutation); edges are an ordered multiset whose indices
//! are significant. Colors are arbitrary strings: element symbols on vertices
//! and bond types on edges for molecular input.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

#[derive(Debug, Clone)]
struct Vertex {
    label: u32,
    color: Option<String>,
}

/// An immutable labeled multigraph. Derived graphs are fresh values and never
/// share mutable state with their parents.
#[derive(Debug, Clone)]
pub struct Graph {
    g: UnGraph<Vertex, Option<String>>,
}

impl Graph {
    /// Construct an uncolored graph from vertex labels and edge label pairs.
    pub fn new(vertices: Vec<u32>, edges: Vec<(u32, u32)>) -> Self {
        Self::with_colors(vertices, edges, Vec::new(), Vec::new())
    }

    /// Construct a colored graph. Empty color lists mean "uncolored";
    /// otherwise their lengths must match the vertex and edge lists exactly.
    /// Length mismatches and edges over unknown vertices are programming
    /// errors and panic.
    pub fn with_colors(
        vertices: Vec<u32>,
        edges: Vec<(u32, u32)>,
        vertex_colors: Vec<String>,
        edge_colors: Vec<String>,
    ) -> Self {
        assert!(
            vertex_colors.is_empty() || vertex_colors.len() == vertices.len(),
            "vertex color list must be empty or match the vertex list"
        );
        assert!(
            edge_colors.is_empty() || edge_colors.len() == edges.len(),
            "edge color list must be empty or match the edge list"
        );

        let mut g = UnGraph::default();
        let mut index: HashMap<u32, NodeIndex> = HashMap::with_capacity(vertices.len());
        for (i, &label) in vertices.iter().enumerate() {
            let color = (!vertex_colors.is_empty()).then(|| vertex_colors[i].clone());
            let ix = g.add_node(Vertex { label, color });
            let previous = index.insert(label, ix);
            assert!(previous.is_none(), "duplicate vertex label {label}");
        }
        for (i, &(u, v)) in edges.iter().enumerate() {
            let ui = *index
                .get(&u)
                .unwrap_or_else(|| panic!("edge endpoint {u} is not a vertex"));
            let vi = *index
                .get(&v)
                .unwrap_or_else(|| panic!("edge endpoint {v} is not a vertex"));
            let color = (!edge_colors.is_empty()).then(|| edge_colors[i].clone());
            g.add_edge(ui, vi, color);
        }

        Graph { g }
    }

    pub fn vertex_count(&self) -> usize {
        self.g.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.g.edge_count()
    }

    /// Vertex labels in insertion order.
    pub fn vertices(&self) -> Vec<u32> {
        self.g.node_weights().map(|w| w.label).collect()
    }

    pub fn sorted_vertices(&self) -> Vec<u32> {
        let mut vs = self.vertices();
        vs.sort_unstable();
        vs
    }

    /// Edge label pairs in edge-index order, oriented as inserted.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        self.g
            .edge_references()
            .map(|e| (self.g[e.source()].label, self.g[e.target()].label))
            .collect()
    }

    pub fn edge_endpoints(&self, edge: usize) -> (u32, u32) {
        let (u, v) = self
            .g
            .edge_endpoints(petgraph::graph::EdgeIndex::new(edge))
            .expect("edge index out of range");
        (self.g[u].label, self.g[v].label)
    }

    /// Vertex labels with their colors, in insertion order.
    pub fn vertex_rows(&self) -> Vec<(u32, Option<&str>)> {
        self.g
            .node_weights()
            .map(|w| (w.label, w.color.as_deref()))
            .collect()
    }

    /// Edge label pairs with their colors, in edge-index order.
    pub fn edge_rows(&self) -> Vec<((u32, u32), Option<&str>)> {
        self.g
            .edge_references()
            .map(|e| {
                (
                    (self.g[e.source()].label, self.g[e.target()].label),
                    e.weight().as_deref(),
                )
            })
            .collect()
    }

    pub fn is_vertex_colored(&self) -> bool {
        self.g.node_count() > 0 && self.g.node_weights().all(|w| w.color.is_some())
    }

    pub fn is_edge_colored(&self) -> bool {
        self.g.edge_count() > 0 && self.g.edge_weights().all(|w| w.is_some())
    }

    pub fn vertex_color(&self, label: u32) -> Option<&str> {
        self.g
            .node_weights()
            .find(|w| w.label == label)
            .and_then(|w| w.color.as_deref())
    }

    pub fn edge_color(&self, edge: usize) -> Option<&str> {
        self.g
            .edge_weight(petgraph::graph::EdgeIndex::new(edge))
            .and_then(|w| w.as_deref())
    }

    pub fn max_label(&self) -> u32 {
        self.g.node_weights().map(|w| w.label).max().unwrap_or(0)
    }

    /// Map from edge index to the indices of edges sharing an endpoint,
    /// each adjacency list in ascending order.
    pub fn edge_adjacencies(&self) -> Vec<Vec<usize>> {
        let mut adjacencies = vec![Vec::new(); self.g.edge_count()];
        for e in self.g.edge_references() {
            let i = e.id().index();
            for node in [e.source(), e.target()] {
                for f in self.g.edges(node) {
                    if f.id() != e.id() {
                        adjacencies[i].push(f.id().index());
                    }
                }
            }
            adjacencies[i].sort_unstable();
            adjacencies[i].dedup();
        }
        adjacencies
    }

    /// Edge pairs canonicalized to ordered tuples and sorted.
    pub fn sorted_edge_list(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .edges()
            .into_iter()
            .map(|(u, v)| if u <= v { (u, v) } else { (v, u) })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// The sorted edge list flattened to a single label sequence, used for
    /// lexicographic graph comparison.
    pub fn flat_sorted_edges(&self) -> Vec<u32> {
        self.sorted_edge_list()
            .into_iter()
            .flat_map(|(u, v)| [u, v])
            .collect()
    }

    /// Lexicographic comparison of flattened sorted edge lists.
    pub fn edge_list_greater(&self, other: &Graph) -> bool {
        self.flat_sorted_edges() > other.flat_sorted_edges()
    }

    fn vertex_color_map(&self) -> BTreeMap<u32, &str> {
        self.g
            .node_weights()
            .filter_map(|w| w.color.as_deref().map(|c| (w.label, c)))
            .collect()
    }

    fn edge_color_multimap(&self) -> BTreeMap<(u32, u32), Vec<&str>> {
        let mut map: BTreeMap<(u32, u32), Vec<&str>> = BTreeMap::new();
        for ((u, v), color) in self.edge_rows() {
            if let Some(c) = color {
                let key = if u <= v { (u, v) } else { (v, u) };
                map.entry(key).or_default().push(c);
            }
        }
        for colors in map.values_mut() {
            colors.sort_unstable();
        }
        map
    }

    /// Relabel vertices by a permutation over the sorted vertex labels: the
    /// vertex named by `permutation[i]` receives the i-th smallest label.
    /// Colors follow their vertices; edge colors are positionally preserved.
    /// A permutation of the wrong length is a programming error.
    pub fn permute(&self, permutation: &[u32]) -> Graph {
        assert_eq!(
            permutation.len(),
            self.g.node_count(),
            "permutation length must equal the number of vertices"
        );
        let sorted = self.sorted_vertices();
        let map: HashMap<u32, u32> = permutation
            .iter()
            .zip(sorted.iter())
            .map(|(&from, &to)| (from, to))
            .collect();
        assert_eq!(
            map.len(),
            sorted.len(),
            "permutation must name each vertex exactly once"
        );

        let mut g = self.g.clone();
        for w in g.node_weights_mut() {
            w.label = *map
                .get(&w.label)
                .unwrap_or_else(|| panic!("permutation does not cover vertex {}", w.label));
        }
        Graph { g }
    }

    /// Relabel vertices positionally: the i-th stored vertex receives
    /// `labels[i]`. Structure and colors are unchanged.
    pub fn relabel(&self, labels: &[u32]) -> Graph {
        assert_eq!(
            labels.len(),
            self.g.node_count(),
            "relabeling must cover every vertex"
        );
        let mut g = self.g.clone();
        for (w, &label) in g.node_weights_mut().zip(labels.iter()) {
            w.label = label;
        }
        Graph { g }
    }

    /// The initial canonicalization partition derived from vertex colors:
    /// one part per color in sorted color order, vertices within a part in
    /// insertion order. An uncolored graph yields a single part.
    pub fn color_partition(&self) -> Vec<Vec<u32>> {
        if !self.is_vertex_colored() {
            return vec![self.vertices()];
        }
        let rows = self.vertex_rows();
        let mut colors: Vec<&str> = rows.iter().filter_map(|(_, c)| *c).collect();
        colors.sort_unstable();
        colors.dedup();
        colors
            .into_iter()
            .map(|color| {
                rows.iter()
                    .filter(|(_, c)| *c == Some(color))
                    .map(|(label, _)| *label)
                    .collect()
            })
            .collect()
    }
}

/// Labeled-multigraph equality: same vertex set, same sorted edge multiset,
/// same color assignments. Vertex and edge order are immaterial; labels are
/// not (isomorphism is a separate question).
impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        if self.sorted_vertices() != other.sorted_vertices() {
            return false;
        }
        if self.is_vertex_colored() != other.is_vertex_colored()
            || self.is_edge_colored() != other.is_edge_colored()
        {
            return false;
        }
        if self.vertex_color_map() != other.vertex_color_map() {
            return false;
        }
        if self.edge_color_multimap() != other.edge_color_multimap() {
            return false;
        }
        self.sorted_edge_list() == other.sorted_edge_list()
    }
}

impl Eq for Graph {}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vertices: {:?}", self.vertices())?;
        writeln!(f, "edges: {:?}", self.edges())?;
        let vertex_colors: Vec<_> = self.vertex_rows().iter().filter_map(|(_, c)| *c).collect();
        let edge_colors: Vec<_> = self.edge_rows().iter().filter_map(|(_, c)| *c).collect();
        writeln!(f, "vertex colors: {vertex_colors:?}")?;
        write!(f, "edge colors: {edge_colors:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::new(vec![0, 1, 2, 3], vec![(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    #[test]
    fn equality_ignores_order() {
        let a = Graph::new(vec![0, 1, 2], vec![(0, 1), (1, 2)]);
        let b = Graph::new(vec![2, 0, 1], vec![(2, 1), (1, 0)]);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_labels() {
        let a = Graph::new(vec![0, 1, 2], vec![(0, 1), (1, 2)]);
        let b = Graph::new(vec![0, 1, 3], vec![(0, 1), (1, 3)]);
        assert_ne!(a, b);
    }

    #[test]
    fn equality_respects_colors() {
        let a = Graph::with_colors(
            vec![0, 1],
            vec![(0, 1)],
            vec!["C".into(), "O".into()],
            vec![],
        );
        let b = Graph::with_colors(
            vec![0, 1],
            vec![(0, 1)],
            vec!["C".into(), "N".into()],
            vec![],
        );
        let uncolored = Graph::new(vec![0, 1], vec![(0, 1)]);
        assert_ne!(a, b);
        assert_ne!(a, uncolored);
    }

    #[test]
    fn equality_respects_edge_colors() {
        let a = Graph::with_colors(vec![0, 1], vec![(0, 1)], vec![], vec!["single".into()]);
        let b = Graph::with_colors(vec![0, 1], vec![(0, 1)], vec![], vec!["double".into()]);
        assert_ne!(a, b);
        // orientation of the stored pair does not matter
        let c = Graph::with_colors(vec![0, 1], vec![(1, 0)], vec![], vec!["single".into()]);
        assert_eq!(a, c);
    }

    #[test]
    fn edge_adjacencies_share_endpoints() {
        let g = square();
        let adj = g.edge_adjacencies();
        assert_eq!(adj[0], vec![1, 3]);
        assert_eq!(adj[1], vec![0, 2]);
        assert_eq!(adj[2], vec![1, 3]);
        assert_eq!(adj[3], vec![0, 2]);
    }

    #[test]
    fn permute_relabels_by_sorted_position() {
        // Sending [2, 0, 1] to sorted labels [0, 1, 2] maps 2->0, 0->1, 1->2.
        let g = Graph::new(vec![0, 1, 2], vec![(0, 1), (1, 2)]);
        let p = g.permute(&[2, 0, 1]);
        assert_eq!(p.sorted_edge_list(), vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn permute_keeps_colors_with_vertices() {
        let g = Graph::with_colors(
            vec![0, 1],
            vec![(0, 1)],
            vec!["C".into(), "O".into()],
            vec![],
        );
        // 1 -> 0 and 0 -> 1, so the oxygen ends up on label 0.
        let p = g.permute(&[1, 0]);
        assert_eq!(p.vertex_color(0), Some("O"));
        assert_eq!(p.vertex_color(1), Some("C"));
    }

    #[test]
    #[should_panic(expected = "permutation length")]
    fn permute_rejects_wrong_length() {
        square().permute(&[0, 1]);
    }

    #[test]
    fn edge_list_comparison_is_lexicographic() {
        let a = Graph::new(vec![0, 1, 2], vec![(1, 2), (0, 1)]);
        let b = Graph::new(vec![0, 1, 2], vec![(0, 1), (0, 2)]);
        assert!(a.edge_list_greater(&b));
        assert!(!b.edge_list_greater(&a));
        assert!(!a.edge_list_greater(&a));
    }

    #[test]
    fn color_partition_sorts_colors() {
        let g = Graph::with_colors(
            vec![0, 1, 2, 3],
            vec![(0, 1), (1, 2), (2, 3)],
            vec!["O".into(), "C".into(), "C".into(), "N".into()],
            vec![],
        );
        assert_eq!(g.color_partition(), vec![vec![1, 2], vec![3], vec![0]]);
    }

    #[test]
    fn color_partition_uncolored_is_single_part() {
        assert_eq!(square().color_partition(), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn multigraph_edges_keep_their_indices() {
        let g = Graph::with_colors(
            vec![0, 1],
            vec![(0, 1), (0, 1)],
            vec![],
            vec!["single".into(), "double".into()],
        );
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge_color(0), Some("single"));
        assert_eq!(g.edge_color(1), Some("double"));
        assert_eq!(g.edge_adjacencies(), vec![vec![1], vec![0]]);
    }
}
