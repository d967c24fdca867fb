/// Forgetting engine errors.
#[derive(Debug, thiserror::Error)]
pub enum ForgettingError {
    #[error("operation risk is {risk} and no consent was given")]
    ConsentRequired { risk: String },

    #[error("memory {id} is protected: {reason}")]
    Protected { id: String, reason: String },

    #[error("recovery failed for {id}: {reason}")]
    RecoveryFailed { id: String, reason: String },
}
