//! Named default values for every tunable. Config structs pull from here so
//! the numbers live in one place.

/// Storage quota before optimization recommendations fire: 1 GiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 1024 * 1024 * 1024;

// --- Decay ---

/// Memories accessed within this many days are skipped by the decay sweep.
pub const DEFAULT_DECAY_FLOOR_DAYS: f64 = 1.0;
/// Rows updated per decay transaction.
pub const DEFAULT_DECAY_BATCH_SIZE: usize = 500;
/// Seconds between decay ticks (1 hour).
pub const DEFAULT_DECAY_INTERVAL_SECS: u64 = 3_600;

// --- Consolidation ---

/// Cosine similarity threshold for joining a cluster.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;
/// Minimum cluster size worth consolidating.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 3;
/// Seconds between consolidation ticks (6 hours).
pub const DEFAULT_CONSOLIDATION_INTERVAL_SECS: u64 = 21_600;
/// Number of nearest semantic neighbors linked to each new parent.
pub const DEFAULT_LINK_NEIGHBORS: usize = 3;
/// Minimum count of unconsolidated atomic episodic memories before a
/// scheduled tick bothers running the pipeline.
pub const DEFAULT_MIN_EPISODIC_BACKLOG: usize = 10;

// --- Forgetting ---

/// Minimum age before a memory may be auto-forgotten.
pub const DEFAULT_MIN_AGE_DAYS: i64 = 30;
/// Salience below this boosts the base-importance factor.
pub const DEFAULT_IMPORTANCE_THRESHOLD: f64 = 0.3;
/// Salience above this is never auto-forgotten.
pub const DEFAULT_MAX_AUTO_FORGET_IMPORTANCE: f64 = 0.8;
/// Days an archived memory is recoverable before purge may remove it.
pub const DEFAULT_RETENTION_WINDOW_DAYS: i64 = 30;
/// Seconds between forgetting ticks (24 hours).
pub const DEFAULT_FORGETTING_INTERVAL_SECS: u64 = 86_400;
/// Forgetting score at or above which archival is taken.
pub const DEFAULT_ARCHIVE_SCORE: f64 = 0.7;
/// Forgetting score at or above which salience/decay are down-weighted.
pub const DEFAULT_DOWNWEIGHT_SCORE: f64 = 0.4;

// --- Ranker ---

pub const DEFAULT_WEIGHT_SIMILARITY: f64 = 0.55;
pub const DEFAULT_WEIGHT_SALIENCE: f64 = 0.20;
pub const DEFAULT_WEIGHT_RECENCY: f64 = 0.15;
pub const DEFAULT_WEIGHT_LINK: f64 = 0.10;
/// Recency time constant in days.
pub const DEFAULT_RECENCY_TAU_DAYS: f64 = 14.0;
/// Default result limit when a query does not specify one.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

// --- Embeddings ---

/// Embedding dimension, fixed at provider construction.
pub const DEFAULT_EMBEDDING_DIM: usize = 768;
/// L1 embedding cache capacity (entries).
pub const DEFAULT_EMBEDDING_CACHE_ENTRIES: u64 = 10_000;

// --- Timeouts ---

/// Retrieval deadline (ms).
pub const DEFAULT_RETRIEVAL_TIMEOUT_MS: u64 = 10_000;
/// Term/pattern matching budget (ms).
pub const DEFAULT_PATTERN_MATCH_TIMEOUT_MS: u64 = 5_000;
/// Persistence driver round-trip timeout (ms).
pub const DEFAULT_DRIVER_TIMEOUT_MS: u64 = 5_000;
/// Wall-clock budget for one maintenance task run (ms).
pub const DEFAULT_TASK_BUDGET_MS: u64 = 300_000;

// --- Matcher caches ---

/// Bounded size of the compiled goal-term matcher cache.
pub const DEFAULT_MATCHER_CACHE_ENTRIES: u64 = 256;
