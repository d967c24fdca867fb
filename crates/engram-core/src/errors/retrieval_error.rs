/// Retrieval and ranking errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("query is empty: neither text nor embeddings were provided")]
    EmptyQuery,

    #[error("candidate fetch failed: {reason}")]
    CandidateFetchFailed { reason: String },

    #[error("retrieval deadline of {deadline_ms}ms exceeded before any candidate was ranked")]
    DeadlineExceeded { deadline_ms: u64 },
}
