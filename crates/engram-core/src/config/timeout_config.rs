use serde::{Deserialize, Serialize};

use super::defaults;

/// Timeouts and budgets, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Retrieval deadline; the ranker returns best-effort-so-far on expiry.
    pub retrieval_ms: u64,
    /// Budget for goal/term pattern matching.
    pub pattern_match_ms: u64,
    /// Persistence driver round-trip timeout.
    pub driver_ms: u64,
    /// Wall-clock budget for one maintenance task run.
    pub task_budget_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            retrieval_ms: defaults::DEFAULT_RETRIEVAL_TIMEOUT_MS,
            pattern_match_ms: defaults::DEFAULT_PATTERN_MATCH_TIMEOUT_MS,
            driver_ms: defaults::DEFAULT_DRIVER_TIMEOUT_MS,
            task_budget_ms: defaults::DEFAULT_TASK_BUDGET_MS,
        }
    }
}
