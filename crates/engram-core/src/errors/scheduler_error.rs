/// Maintenance scheduler errors.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("{kind} task already in flight")]
    AlreadyRunning { kind: String },

    #[error("{kind} task exceeded its {budget_ms}ms budget")]
    BudgetExceeded { kind: String, budget_ms: u64 },

    #[error("{kind} task paused after fatal error: {reason}")]
    Paused { kind: String, reason: String },
}
