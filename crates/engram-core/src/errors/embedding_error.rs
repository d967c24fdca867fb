/// Embedding provider and cache errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding produced a non-normalized vector (norm {norm}) for non-empty input")]
    NotNormalized { norm: f32 },
}
