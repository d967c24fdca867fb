//! # engram-export
//!
//! Serializes a user's store into a versioned document and re-ingests it
//! with merge or replace semantics. Validation is strict and collects every
//! problem before anything touches the database; per-record failures during
//! import are captured without aborting the transaction.

pub mod document;
pub mod engine;
pub mod validation;

pub use document::{ExportDocument, ExportedLink, ExportedMemory, ImportMode, ImportOptions};
pub use engine::{ExportEngine, ImportSummary};
