/// Consolidation pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    #[error("consolidation already in progress")]
    AlreadyRunning,

    #[error("clustering failed: {reason}")]
    ClusteringFailed { reason: String },

    #[error("merge failed for cluster of {cluster_size}: {reason}")]
    MergeFailed { cluster_size: usize, reason: String },

    #[error("cancelled during {phase}")]
    Cancelled { phase: String },
}
