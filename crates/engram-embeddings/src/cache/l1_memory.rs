//! L1 in-memory embedding cache using moka.
//!
//! TinyLFU admission, per-entry TTL. Keys are blake3 hashes over
//! (model_id, text) so a provider swap never serves stale vectors.

use std::time::Duration;

use moka::sync::Cache;

use engram_core::memory::SectorVectors;

/// L1 in-memory cache of full sector-vector sets.
pub struct L1MemoryCache {
    cache: Cache<String, SectorVectors>,
}

impl L1MemoryCache {
    /// Create a new L1 cache with the given max entry count.
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .time_to_live(Duration::from_secs(86400))
            .build();
        Self { cache }
    }

    /// Cache key for a (model, text) pair.
    pub fn key(model_id: &str, text: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(model_id.as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&self, key: &str) -> Option<SectorVectors> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, vectors: SectorVectors) {
        self.cache.insert(key, vectors);
    }

    /// Number of entries currently in the cache.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invalidate all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors() -> SectorVectors {
        let v = vec![1.0f32, 0.0];
        SectorVectors {
            episodic: v.clone(),
            semantic: v.clone(),
            procedural: v.clone(),
            emotional: v.clone(),
            reflective: v,
        }
    }

    #[test]
    fn insert_and_get() {
        let cache = L1MemoryCache::new(10);
        let key = L1MemoryCache::key("m", "text");
        cache.insert(key.clone(), vectors());
        assert_eq!(cache.get(&key), Some(vectors()));
    }

    #[test]
    fn distinct_models_get_distinct_keys() {
        assert_ne!(
            L1MemoryCache::key("model-a", "text"),
            L1MemoryCache::key("model-b", "text")
        );
    }
}
