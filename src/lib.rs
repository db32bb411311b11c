//! `assembly_index` computes *assembly indices* of colored graphs: the
//! minimum number of joining steps needed to build a graph from single edges
//! when any already-constructed fragment may be reused for free (see, e.g.,
//! [Sharma et al., 2023](https://doi.org/10.1038/s41586-023-06600-9)).
//!
//! Molecules are the motivating input: atoms become vertices colored by
//! element, bonds become edges colored by bond type. The search enumerates
//! candidate assembly pathways by repeatedly identifying isomorphic duplicate
//! subgraphs of the remaining structure, branch-and-bounding in parallel
//! across a worker pool.
//!
//! # Example
//!
//! Load a molecule from a `.mol` file and calculate its assembly index:
//! ```
//! # use std::{fs, path::PathBuf};
//! use assembly_index::{
//!     assembly::{index_search, SearchOptions},
//!     loader::parse_molfile_str,
//! };
//!
//! # fn main() -> Result<(), std::io::Error> {
//! let path = PathBuf::from("./data/checks/benzene.mol");
//! let molfile = fs::read_to_string(path)?;
//! let benzene = parse_molfile_str(&molfile).expect("parsing failure");
//!
//! let (pathways, index) = index_search(&benzene, &SearchOptions::default());
//! assert_eq!(index, 3);
//! assert!(!pathways.is_empty());
//! # Ok(())
//! # }
//! ```

// Labeled colored multigraphs
pub mod graph;

// Splitting and recombining graphs on edge sets
pub mod split;

// Connected-subgraph enumeration (Rücker path trace)
pub mod enumerate;

// Canonical labeling and isomorphism testing
pub mod canonize;

// Assembly pathway values and derived quantities
pub mod pathway;

// Pruning bound on the remnant
pub mod bounds;

// The hard bit: the parallel pathway search
pub mod assembly;

// Data IO
pub mod loader;
