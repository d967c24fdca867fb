//! # engram-store
//!
//! The memory store facade. Validated requests come in; embeddings are
//! computed; the memory row, metadata, five vectors, and links land in one
//! transaction. Retrieval fans out through the composite ranker, and
//! qualifying hits earn the reinforcement reward.

pub mod engine;
pub mod graph;
pub mod requests;
pub mod validate;

pub use engine::MemoryStore;
pub use requests::{CreateMemoryRequest, CreatedMemory, DeleteOptions, LinkSpec, UpdatePatch};
