/// Engram system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Export document format version.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Reserved parent id marking an archived (soft-forgotten) memory.
/// A memory whose `consolidated_into` equals this id is hidden from default
/// retrieval but its row is retained and recoverable until purge.
pub const TOMBSTONE_ID: &str = "00000000-0000-0000-0000-00000000dead";

/// Maximum content length accepted on create, in bytes.
pub const MAX_CONTENT_BYTES: usize = 65_536;

/// Maximum batch size for bulk operations.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;

/// Similarity at or above which a retrieval reinforces the memory.
pub const REINFORCEMENT_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Fixed strength reward applied on a reinforcing retrieval, capped at 1.0.
pub const REINFORCEMENT_REWARD: f64 = 0.05;

/// Candidate pool multiplier: search fetches up to `limit * POOL_FACTOR`
/// candidates per sector probe before ranking.
pub const CANDIDATE_POOL_FACTOR: usize = 5;

/// Bounded retry count for retryable storage conflicts.
pub const CONFLICT_RETRY_LIMIT: u32 = 3;
