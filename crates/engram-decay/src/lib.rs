//! # engram-decay
//!
//! Time-based strength decay. A sweep walks memories whose last access is
//! older than the configured floor and applies the linear decay rule in
//! batched transactions, publishing progress after each batch.

pub mod engine;
pub mod formula;
pub mod reinforcement;

pub use engine::{DecayEngine, DecayRunReport};
