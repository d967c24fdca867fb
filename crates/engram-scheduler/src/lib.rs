//! # engram-scheduler
//!
//! Single-flight cooperative scheduler for the three maintenance tasks.
//! Decay, consolidation, and forgetting each tick on their own interval;
//! batches from different task kinds never interleave, concurrent wakes of
//! one kind coalesce to a no-op, and every run observes a cancellation
//! token and a wall-clock budget between batches.

pub mod cancellation;
pub mod engine;
pub mod progress;

pub use cancellation::CancellationToken;
pub use engine::{Scheduler, TaskOutcome};
pub use progress::ProgressRegistry;
