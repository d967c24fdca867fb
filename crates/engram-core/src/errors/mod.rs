//! Error taxonomy. One enum per subsystem, aggregated into [`EngramError`].
//!
//! Kinds map onto the system-wide policy: validation and not-found are
//! returned to the caller, conflicts are retried a bounded number of times,
//! timeouts yield partial results where the algorithm is resumable, and
//! everything else is fatal to the operation that raised it.

pub mod consolidation_error;
pub mod embedding_error;
pub mod export_error;
pub mod forgetting_error;
pub mod retrieval_error;
pub mod scheduler_error;
pub mod storage_error;
pub mod validation_error;

pub use consolidation_error::ConsolidationError;
pub use embedding_error::EmbeddingError;
pub use export_error::ExportError;
pub use forgetting_error::ForgettingError;
pub use retrieval_error::RetrievalError;
pub use scheduler_error::SchedulerError;
pub use storage_error::StorageError;
pub use validation_error::{FieldViolation, ValidationCollector, ValidationError};

/// Result alias used across the workspace.
pub type EngramResult<T> = Result<T, EngramError>;

/// Umbrella error for the whole system.
#[derive(Debug, thiserror::Error)]
pub enum EngramError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Consolidation(#[from] ConsolidationError),

    #[error(transparent)]
    Forgetting(#[from] ForgettingError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl EngramError {
    /// Convenience constructor for a missing entity.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngramError::Storage(e) if e.is_retryable())
    }

    /// Whether this failure should pause maintenance tasks and surface a
    /// health recommendation (driver down, schema or dimension mismatch).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngramError::Storage(StorageError::ConnectionLost { .. })
                | EngramError::Storage(StorageError::MigrationFailed { .. })
                | EngramError::Embedding(EmbeddingError::DimensionMismatch { .. })
                | EngramError::Export(ExportError::DimensionMismatch { .. })
        )
    }
}
