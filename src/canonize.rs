//! Colored-graph canonicalization and isomorphism testing.
//!
//! The canonicalizer is an individualization-refinement search in the style
//! of McKay & Piperno (2014); see also Hartke & Radcliffe's exposition of
//! McKay's canonical labeling algorithm. Partitions of vertex labels are
//! refined to equitable partitions, non-singleton parts are split by
//! individualizing each member in turn, and every discrete leaf yields a
//! candidate relabeling. The canonical form is the lexicographically greatest
//! candidate; leaves that repeat an earlier candidate expose an automorphism
//! and prune the tree back to the common ancestor.
//!
//! Edge-colored graphs are lifted to a layered vertex-colored encoding first,
//! so the vertex-color machinery suffices.

use std::collections::{BTreeMap, HashMap};

use crate::graph::Graph;

/// An ordered partition of vertex labels. Part order and the order of
/// vertices within a part are both significant.
pub type Partition = Vec<Vec<u32>>;

/// The number of edges between `vertex` and members of `part`.
fn degree_in_part(edges: &[(u32, u32)], vertex: u32, part: &[u32]) -> usize {
    edges
        .iter()
        .filter(|&&(u, v)| {
            (vertex == u && part.contains(&v)) || (vertex == v && part.contains(&u))
        })
        .count()
}

/// Split `part_left` by each member's degree into `part_right`, ascending by
/// degree. Vertices keep their relative order inside the new sub-parts. A
/// result of length one means `part_right` does not split `part_left`.
fn shatter(edges: &[(u32, u32)], part_left: &[u32], part_right: &[u32]) -> Partition {
    let mut by_degree: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
    for &v in part_left {
        by_degree
            .entry(degree_in_part(edges, v, part_right))
            .or_default()
            .push(v);
    }
    by_degree.into_values().collect()
}

/// True iff no part is split by any part.
fn is_equitable(edges: &[(u32, u32)], partition: &[Vec<u32>]) -> bool {
    partition.iter().all(|left| {
        partition
            .iter()
            .all(|right| shatter(edges, left, right).len() == 1)
    })
}

/// Repeatedly replace the first part that shatters until the partition is
/// equitable. Each replacement keeps the shattered part's position.
fn equitable_refinement(edges: &[(u32, u32)], partition: &[Vec<u32>]) -> Partition {
    let mut refined: Partition = partition.to_vec();
    'refine: loop {
        for i in 0..refined.len() {
            for j in 0..refined.len() {
                let shattering = shatter(edges, &refined[i], &refined[j]);
                if shattering.len() > 1 {
                    refined.splice(i..=i, shattering);
                    continue 'refine;
                }
            }
        }
        return refined;
    }
}

/// Promote `vertex` into its own part, placed directly before the remainder
/// of its original part.
fn individualize(partition: &[Vec<u32>], vertex: u32) -> Partition {
    let mut individualized = Vec::with_capacity(partition.len() + 1);
    for part in partition {
        if part.contains(&vertex) {
            individualized.push(vec![vertex]);
            let remainder: Vec<u32> = part.iter().copied().filter(|&v| v != vertex).collect();
            if !remainder.is_empty() {
                individualized.push(remainder);
            }
        } else {
            individualized.push(part.clone());
        }
    }
    individualized
}

fn is_discrete(partition: &[Vec<u32>]) -> bool {
    partition.iter().all(|part| part.len() == 1)
}

/// Flatten a discrete partition into a permutation of the vertex labels.
fn discrete_to_permutation(partition: &[Vec<u32>]) -> Vec<u32> {
    partition
        .iter()
        .map(|part| {
            assert!(part.len() == 1, "partition is not discrete");
            part[0]
        })
        .collect()
}

/// The children of a search-tree node: if the partition is not yet equitable,
/// its single refinement; otherwise one refined partition per vertex of the
/// first non-singleton part, individualized in part order. Also returns the
/// individualized vertices (empty for a refinement step).
fn equitable_children(edges: &[(u32, u32)], partition: &[Vec<u32>]) -> (Vec<Partition>, Vec<u32>) {
    if !is_equitable(edges, partition) {
        return (vec![equitable_refinement(edges, partition)], Vec::new());
    }
    let part = partition
        .iter()
        .find(|part| part.len() > 1)
        .expect("discrete partitions are leaves");
    let children = part
        .iter()
        .map(|&v| equitable_refinement(edges, &individualize(partition, v)))
        .collect();
    (children, part.clone())
}

/// Length of the longest common prefix of two tree paths.
fn common_prefix_len(left: &[usize], right: &[usize]) -> usize {
    left.iter().zip(right.iter()).take_while(|(l, r)| l == r).count()
}

struct CanonSearch<'a> {
    graph: &'a Graph,
    edges: Vec<(u32, u32)>,
    best: Option<Graph>,
    // One candidate per distinct discrete leaf seen, with the tree path that
    // reached it. A repeat candidate is an automorphism.
    leaves: Vec<Graph>,
    leaf_paths: Vec<Vec<usize>>,
    // When set, unwind until the node at this path length resumes its loop.
    backtrack_to: Option<usize>,
}

impl CanonSearch<'_> {
    fn descend(&mut self, partition: &[Vec<u32>], path: &mut Vec<usize>) {
        if is_discrete(partition) {
            let candidate = self.graph.permute(&discrete_to_permutation(partition));
            if let Some(i) = self.leaves.iter().position(|leaf| *leaf == candidate) {
                // The subtree that produced the earlier equivalent leaf was
                // explored first, so everything below the divergence point is
                // redundant.
                self.backtrack_to = Some(common_prefix_len(&self.leaf_paths[i], path));
                return;
            }
            let better = match &self.best {
                Some(best) => candidate.edge_list_greater(best),
                None => true,
            };
            self.leaves.push(candidate.clone());
            self.leaf_paths.push(path.clone());
            if better {
                self.best = Some(candidate);
            }
            return;
        }

        let (children, _individualized) = equitable_children(&self.edges, partition);
        for (i, child) in children.iter().enumerate() {
            path.push(i);
            self.descend(child, path);
            path.pop();
            if let Some(target) = self.backtrack_to {
                if path.len() == target {
                    self.backtrack_to = None;
                } else {
                    return;
                }
            }
        }
    }
}

/// Produce the canonical relabeling of `g` under the initial partition
/// `partition`. Two inputs related by a label bijection that carries one
/// partition onto the other yield identical canonical graphs.
pub fn canonical_form(g: &Graph, partition: &[Vec<u32>]) -> Graph {
    if g.vertex_count() == 0 {
        return g.clone();
    }
    let covered: usize = partition.iter().map(|part| part.len()).sum();
    assert_eq!(
        covered,
        g.vertex_count(),
        "initial partition must cover every vertex exactly once"
    );

    let mut search = CanonSearch {
        graph: g,
        edges: g.edges(),
        best: None,
        leaves: Vec::new(),
        leaf_paths: Vec::new(),
        backtrack_to: None,
    };
    let mut path = Vec::new();
    search.descend(partition, &mut path);
    search.best.expect("canonical search produced no leaf")
}

/// Apply the label map of `permutation` (as in [`Graph::permute`]) to a
/// partition. Used to carry an initial coloring along with a relabeling.
pub fn permuted_partition(g: &Graph, partition: &[Vec<u32>], permutation: &[u32]) -> Partition {
    let sorted = g.sorted_vertices();
    let map: HashMap<u32, u32> = permutation
        .iter()
        .zip(sorted.iter())
        .map(|(&from, &to)| (from, to))
        .collect();
    partition
        .iter()
        .map(|part| part.iter().map(|v| map[v]).collect())
        .collect()
}

/// Lift an edge-colored graph to its layered vertex-colored encoding: one
/// distinctly colored copy of every vertex per edge color, copies of a vertex
/// linked in a chain, and each original edge placed in its color's layer.
/// Graphs with fewer than two distinct edge colors are returned unchanged.
pub fn layered_graph(g: &Graph) -> Graph {
    let mut colors: Vec<&str> = g.edge_rows().iter().filter_map(|(_, c)| *c).collect();
    colors.sort_unstable();
    colors.dedup();
    if colors.len() <= 1 {
        return g.clone();
    }
    let layer_of: HashMap<&str, usize> =
        colors.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let layers = colors.len();

    let mut vertices = Vec::new();
    let mut vertex_colors = Vec::new();
    let mut edges = Vec::new();
    let mut next = g.max_label() + 1;
    let mut copies: HashMap<u32, Vec<u32>> = HashMap::new();

    for (label, color) in g.vertex_rows() {
        let base = color.unwrap_or("");
        let mut ids: Vec<u32> = Vec::with_capacity(layers);
        for layer in 0..layers {
            let id = if layer == 0 {
                label
            } else {
                let fresh = next;
                next += 1;
                fresh
            };
            vertices.push(id);
            vertex_colors.push(format!("{base}{layer}"));
            if layer > 0 {
                edges.push((ids[layer - 1], id));
            }
            ids.push(id);
        }
        copies.insert(label, ids);
    }

    for ((u, v), color) in g.edge_rows() {
        let layer = layer_of[color.expect("layered encoding requires edge colors")];
        edges.push((copies[&u][layer], copies[&v][layer]));
    }

    Graph::with_colors(vertices, edges, vertex_colors, Vec::new())
}

/// Cheap structural screens before canonicalization: vertex and edge counts,
/// coloredness, and sorted color multisets must all agree.
fn screen(left: &Graph, right: &Graph) -> bool {
    if left.vertex_count() != right.vertex_count() || left.edge_count() != right.edge_count() {
        return false;
    }
    if left.is_vertex_colored() != right.is_vertex_colored()
        || left.is_edge_colored() != right.is_edge_colored()
    {
        return false;
    }
    let sorted_colors = |rows: Vec<(u32, Option<&str>)>| {
        let mut colors: Vec<String> = rows
            .into_iter()
            .filter_map(|(_, c)| c.map(str::to_owned))
            .collect();
        colors.sort_unstable();
        colors
    };
    if sorted_colors(left.vertex_rows()) != sorted_colors(right.vertex_rows()) {
        return false;
    }
    let sorted_edge_colors = |g: &Graph| {
        let mut colors: Vec<String> = g
            .edge_rows()
            .into_iter()
            .filter_map(|(_, c)| c.map(str::to_owned))
            .collect();
        colors.sort_unstable();
        colors
    };
    sorted_edge_colors(left) == sorted_edge_colors(right)
}

/// Relabel `right` onto `left`'s label set, i-th smallest to i-th smallest,
/// preserving structure and colors.
fn relabel_onto(left: &Graph, right: &Graph) -> Graph {
    let to = left.sorted_vertices();
    let from = right.sorted_vertices();
    let map: HashMap<u32, u32> = from.into_iter().zip(to).collect();
    let labels: Vec<u32> = right.vertices().iter().map(|v| map[v]).collect();
    right.relabel(&labels)
}

/// Decide isomorphism of two colored graphs by comparing canonical forms,
/// after screening, label alignment, and (for edge-colored inputs) the
/// layered encoding.
pub fn are_isomorphic(left: &Graph, right: &Graph) -> bool {
    if !screen(left, right) {
        return false;
    }
    let aligned = relabel_onto(left, right);
    let (l, r) = if left.is_edge_colored() {
        (layered_graph(left), layered_graph(&aligned))
    } else {
        (left.clone(), aligned)
    };
    canonical_form(&l, &l.color_partition()) == canonical_form(&r, &r.color_partition())
}
