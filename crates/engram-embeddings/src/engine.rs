//! EmbeddingEngine — owns the provider and the L1 cache, enforces the
//! dimension and normalization policy on everything it hands out.

use rayon::prelude::*;

use engram_core::errors::{EmbeddingError, EngramError, EngramResult};
use engram_core::memory::embedding::is_normalized_or_zero;
use engram_core::memory::SectorVectors;
use engram_core::traits::IEmbeddingProvider;

use crate::cache::L1MemoryCache;

/// The embedding engine. Dimension is fixed at construction.
pub struct EmbeddingEngine {
    provider: Box<dyn IEmbeddingProvider>,
    cache: L1MemoryCache,
}

impl EmbeddingEngine {
    pub fn new(provider: Box<dyn IEmbeddingProvider>, cache_entries: u64) -> Self {
        Self {
            provider,
            cache: L1MemoryCache::new(cache_entries),
        }
    }

    /// The fixed embedding dimension.
    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Identifier recorded on stored embedding rows.
    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    /// Embed one text, going through the cache.
    pub fn embed(&self, text: &str) -> EngramResult<SectorVectors> {
        let key = L1MemoryCache::key(self.provider.model_id(), text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let vectors = self.provider.embed(text)?;
        self.validate(&vectors)?;
        self.cache.insert(key, vectors.clone());
        Ok(vectors)
    }

    /// Embed a batch in parallel. Cache hits are served first; only misses
    /// reach the provider.
    pub fn embed_batch(&self, texts: &[String]) -> EngramResult<Vec<SectorVectors>> {
        texts
            .par_iter()
            .map(|t| self.embed(t))
            .collect::<EngramResult<Vec<_>>>()
    }

    /// Every handed-out vector set must match the fixed dimension and be
    /// unit-norm or all-zero per sector.
    fn validate(&self, vectors: &SectorVectors) -> EngramResult<()> {
        let expected = self.provider.dimensions();
        for (_, v) in vectors.iter() {
            if v.len() != expected {
                return Err(EngramError::Embedding(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: v.len(),
                }));
            }
            if !is_normalized_or_zero(v) {
                let norm = engram_core::memory::embedding::l2_norm(v);
                return Err(EngramError::Embedding(EmbeddingError::NotNormalized { norm }));
            }
        }
        Ok(())
    }
}
