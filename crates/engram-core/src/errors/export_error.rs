/// Export/import errors. Per-record import failures are NOT errors — they
/// are captured into the import summary; these are document- or
/// connection-level failures that abort the operation.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("document is not importable: {reason}")]
    InvalidDocument { reason: String },

    #[error("unsupported format version {version}")]
    UnsupportedVersion { version: String },

    #[error("document user_id {document} does not match requested user {requested}")]
    UserMismatch { document: String, requested: String },

    #[error("embedding dimension mismatch on import: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
