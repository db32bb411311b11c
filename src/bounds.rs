//! Prune pathways that cannot improve on the incumbent assembly index.
//!
//! A remnant component of `m` edges costs `m - 1` joins built edge by edge,
//! but at best only `ceil(log2(m))` joins if a fragment can always be doubled
//! against itself. The difference, summed over components, caps the steps a
//! pathway can still save; a pathway whose optimistic floor is already worse
//! than the incumbent's achieved index is dead.

use crate::graph::Graph;
use crate::pathway::Pathway;
use crate::split::connected_component_edges;

/// The maximum further steps saved within the remnant, assuming every
/// connected component can be built by repeated doubling.
pub fn max_steps_saved(pathway: &Pathway) -> usize {
    connected_component_edges(pathway.remnant())
        .iter()
        .map(|component| {
            let m = component.len();
            (m - 1) - m.ilog2() as usize
        })
        .sum()
}

/// The best assembly index any extension of this pathway could reach: its
/// achieved index minus the optimistic remnant savings.
pub fn best_assembly_index(original: &Graph, pathway: &Pathway) -> usize {
    pathway.assembly_index(original) - max_steps_saved(pathway)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn nine_grid_bound() {
        // Twelve edges in one component: (12 - 1) - floor(log2(12)) = 8.
        let seed = Pathway::seed(&nine_grid());
        assert_eq!(max_steps_saved(&seed), 8);
    }

    #[test]
    fn bound_sums_over_components() {
        // Two components of 2 edges each: each saves (2-1) - 1 = 0.
        let g = Graph::new(
            vec![0, 1, 2, 3, 4, 5],
            vec![(0, 1), (1, 2), (3, 4), (4, 5)],
        );
        assert_eq!(max_steps_saved(&Pathway::seed(&g)), 0);

        // One component of 4 edges saves (4-1) - 2 = 1.
        let path = Graph::new(vec![0, 1, 2, 3, 4], vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
        assert_eq!(max_steps_saved(&Pathway::seed(&path)), 1);
    }

    #[test]
    fn single_edge_components_save_nothing() {
        let g = Graph::new(vec![0, 1, 2, 3], vec![(0, 1), (2, 3)]);
        assert_eq!(max_steps_saved(&Pathway::seed(&g)), 0);
    }

    #[test]
    fn floor_never_exceeds_index() {
        let g = nine_grid();
        let seed = Pathway::seed(&g);
        assert!(best_assembly_index(&g, &seed) <= seed.assembly_index(&g));
        assert_eq!(best_assembly_index(&g, &seed), 3);
    }
}
