//! The three pipeline phases, one module each. The engine drives them in
//! order and owns progress/cancellation; the phases hold the actual logic.

pub mod phase1_clustering;
pub mod phase2_merging;
pub mod phase3_linking;

pub use phase1_clustering::{cluster_candidates, ClusterResult};
pub use phase2_merging::build_parent;
pub use phase3_linking::link_parent;
