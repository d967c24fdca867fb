//! Per-request forgetting context: the user's goals, protections, and
//! consent travel with the call instead of living in shared state.

use std::collections::BTreeSet;

/// What happens to memories that cross the archive threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForgettingPolicy {
    /// Tombstone the row, keep it recoverable.
    #[default]
    Archive,
    /// Additionally hard-delete archived rows once the retention window has
    /// passed.
    Purge,
}

/// Context for one forgetting run.
#[derive(Debug, Clone, Default)]
pub struct ForgettingContext {
    /// Active goal phrases; overlap with these protects a memory.
    pub active_goals: Vec<String>,
    /// Explicitly pinned memory ids, never touched.
    pub protected_ids: BTreeSet<String>,
    /// Caller accepted a high/very-high risk assessment.
    pub consent_to_high_risk: bool,
    pub policy: ForgettingPolicy,
}
