//! Assembly pathways: the record of duplicated fragments discovered so far,
//! the remnant still to be explained, and the bookkeeping that ties them
//! back to the original graph.

use std::collections::BTreeMap;
use std::fmt;

use crate::graph::Graph;

/// The edge lists of one discovered duplicate pair, in the label space of the
/// remnant they were found in. `left` is the copy absorbed into the fragment
/// list; `right` stays in the remnant, broken off from the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicates {
    pub left: Vec<(u32, u32)>,
    pub right: Vec<(u32, u32)>,
}

/// One assembly pathway. Extensions always operate on deep copies, so a
/// pathway value is never shared between search branches; `Clone` performs
/// that deep copy (every contained graph and list is owned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pathway {
    pub(crate) fragments: Vec<Graph>,
    pub(crate) remnant: Graph,
    pub(crate) duplicates: Vec<Duplicates>,
    pub(crate) atom_equivalents: Vec<Vec<u32>>,
}

impl Pathway {
    pub fn new(
        fragments: Vec<Graph>,
        remnant: Graph,
        duplicates: Vec<Duplicates>,
        atom_equivalents: Vec<Vec<u32>>,
    ) -> Self {
        Self {
            fragments,
            remnant,
            duplicates,
            atom_equivalents,
        }
    }

    /// The pathway a search starts from: no fragments, the whole graph as
    /// remnant.
    pub fn seed(graph: &Graph) -> Self {
        Self::new(Vec::new(), graph.clone(), Vec::new(), Vec::new())
    }

    pub fn fragments(&self) -> &[Graph] {
        &self.fragments
    }

    pub fn remnant(&self) -> &Graph {
        &self.remnant
    }

    pub fn duplicates(&self) -> &[Duplicates] {
        &self.duplicates
    }

    pub fn atom_equivalents(&self) -> &[Vec<u32>] {
        &self.atom_equivalents
    }

    /// Joining steps saved by the duplicated fragments: each fragment of `m`
    /// edges would otherwise cost `m` single-edge joins but costs one join of
    /// the ready-made copy instead, saving `m - 1`.
    pub fn steps_saved(&self) -> usize {
        self.fragments
            .iter()
            .map(|g| g.edge_count().saturating_sub(1))
            .sum()
    }

    /// The assembly index this pathway certifies for `original`: the naive
    /// edge-by-edge cost minus the steps saved.
    pub fn assembly_index(&self, original: &Graph) -> usize {
        original.edge_count().saturating_sub(1) - self.steps_saved()
    }

    /// Fold a recombination vertex map into the atom-equivalence classes:
    /// every genuinely renumbered vertex joins the class of its old label, or
    /// founds a new two-member class. Classes are *not* closed transitively
    /// under chained merges; callers needing closure must compute it.
    pub fn update_atom_equivalents(&mut self, vertex_map: &BTreeMap<u32, u32>) {
        for (&old, &new) in vertex_map {
            if old == new {
                continue;
            }
            match self
                .atom_equivalents
                .iter_mut()
                .find(|class| class.contains(&old))
            {
                Some(class) => class.push(new),
                None => self.atom_equivalents.push(vec![old, new]),
            }
        }
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pathway graphs")?;
        for g in &self.fragments {
            writeln!(f, "======")?;
            writeln!(f, "{g}")?;
        }
        writeln!(f, "----------")?;
        writeln!(f, "remnant graph")?;
        writeln!(f, "{}", self.remnant)?;
        writeln!(f, "----------")?;
        writeln!(f, "duplicated edges")?;
        for d in &self.duplicates {
            writeln!(f, "{:?} | {:?}", d.left, d.right)?;
        }
        writeln!(f, "atom equivalents")?;
        for class in &self.atom_equivalents {
            writeln!(f, "{class:?}")?;
        }
        Ok(())
    }
}

/// Interpret an ordered graph list as a seeded search problem: the first
/// graph is the original, the last is the remnant, and any in between are
/// already-absorbed duplicate fragments. Used for SDF pathway input. There is
/// no check that the seed actually embeds in the original.
pub fn pathway_from_graphs(mut graphs: Vec<Graph>) -> (Graph, Pathway) {
    assert!(
        graphs.len() >= 2,
        "a seeded pathway needs at least an original graph and a remnant"
    );
    let remnant = graphs.pop().expect("length checked above");
    let original = graphs.remove(0);
    let pathway = Pathway::new(graphs, remnant, Vec::new(), Vec::new());
    (original, pathway)
}

/// Render the original graph and the resulting pathways, for verbose output
/// and logging.
pub fn assembly_string(pathways: &[Pathway], original: &Graph) -> String {
    let mut out = String::from("original graph\n");
    out.push_str(&format!("{original}\n"));
    for pathway in pathways {
        out.push_str(&format!("{pathway}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::new(vec![0, 1, 2, 3], vec![(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    fn triangle() -> Graph {
        Graph::new(vec![0, 1, 2], vec![(0, 1), (1, 2), (2, 0)])
    }

    fn nine_grid() -> Graph {
        Graph::new(
            (0..9).collect(),
            vec![
                (0, 1),
                (1, 2),
                (3, 4),
                (4, 5),
                (6, 7),
                (7, 8),
                (0, 3),
                (3, 6),
                (1, 4),
                (4, 7),
                (2, 5),
                (5, 8),
            ],
        )
    }

    #[test]
    fn steps_saved_sums_fragment_sizes() {
        // Fragments of four and three edges save (4-1) + (3-1) = 5 steps.
        let pathway = Pathway::new(
            vec![square(), triangle()],
            square(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(pathway.steps_saved(), 5);
    }

    #[test]
    fn assembly_index_subtracts_savings() {
        let original = nine_grid();
        let pathway = Pathway::new(
            vec![square(), triangle()],
            square(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(pathway.assembly_index(&original), 6);
    }

    #[test]
    fn seed_pathway_has_index_of_edge_count_minus_one() {
        let g = nine_grid();
        let seed = Pathway::seed(&g);
        assert_eq!(seed.steps_saved(), 0);
        assert_eq!(seed.assembly_index(&g), 11);
    }

    #[test]
    fn copy_is_deep_and_equal() {
        let mut pathway = Pathway::new(
            vec![triangle()],
            square(),
            vec![Duplicates {
                left: vec![(0, 1)],
                right: vec![(2, 3)],
            }],
            vec![vec![1, 5]],
        );
        let copy = pathway.clone();
        assert_eq!(copy, pathway);
        assert_eq!(copy.assembly_index(&nine_grid()), pathway.assembly_index(&nine_grid()));

        // Mutating the original leaves the copy untouched.
        pathway.atom_equivalents.push(vec![7, 8]);
        pathway.duplicates.push(Duplicates {
            left: vec![(1, 2)],
            right: vec![(3, 0)],
        });
        assert_eq!(copy.atom_equivalents().len(), 1);
        assert_eq!(copy.duplicates().len(), 1);
        assert_ne!(copy, pathway);
    }

    #[test]
    fn atom_equivalents_extend_existing_classes() {
        let mut pathway = Pathway::seed(&square());
        pathway.update_atom_equivalents(&BTreeMap::from([(1, 4), (2, 2)]));
        assert_eq!(pathway.atom_equivalents(), &[vec![1, 4]]);

        // 1 is renumbered again: its class grows rather than duplicating.
        pathway.update_atom_equivalents(&BTreeMap::from([(1, 5)]));
        assert_eq!(pathway.atom_equivalents(), &[vec![1, 4, 5]]);

        // An old label never seen before founds a fresh class even when its
        // new label already sits in another class; the relation is
        // deliberately not closed transitively.
        pathway.update_atom_equivalents(&BTreeMap::from([(7, 4)]));
        assert_eq!(pathway.atom_equivalents(), &[vec![1, 4, 5], vec![7, 4]]);
    }

    #[test]
    fn graph_list_becomes_seeded_pathway() {
        let (original, pathway) = pathway_from_graphs(vec![nine_grid(), triangle(), square()]);
        assert_eq!(original, nine_grid());
        assert_eq!(pathway.fragments(), &[triangle()]);
        assert_eq!(pathway.remnant(), &square());
    }
}
