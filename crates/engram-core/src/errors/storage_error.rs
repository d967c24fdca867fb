/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error during {step}: {message}")]
    Sqlite { step: String, message: String },

    #[error("connection lost: {message}")]
    ConnectionLost { message: String },

    #[error("conflict during {step} after {attempts} attempts: {message}")]
    Conflict {
        step: String,
        attempts: u32,
        message: String,
    },

    #[error("constraint violated during {step}: {message}")]
    ConstraintViolation { step: String, message: String },

    #[error("operation timed out after {elapsed_ms}ms during {step}")]
    Timeout { step: String, elapsed_ms: u64 },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("connection pool exhausted: {active_connections} active connections")]
    PoolExhausted { active_connections: usize },
}

impl StorageError {
    /// Conflicts are retryable up to a bounded count; everything else is
    /// fatal to the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}
