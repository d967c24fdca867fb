use serde::{Deserialize, Serialize};

use super::defaults;

/// Storage and embedding-cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Quota before optimization recommendations fire.
    pub quota_bytes: u64,
    /// Embedding dimension, fixed for the lifetime of the store.
    pub embedding_dim: usize,
    /// L1 embedding cache capacity (entries).
    pub embedding_cache_entries: u64,
    /// Read pool size for file-backed databases.
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: defaults::DEFAULT_QUOTA_BYTES,
            embedding_dim: defaults::DEFAULT_EMBEDDING_DIM,
            embedding_cache_entries: defaults::DEFAULT_EMBEDDING_CACHE_ENTRIES,
            read_pool_size: 4,
        }
    }
}
