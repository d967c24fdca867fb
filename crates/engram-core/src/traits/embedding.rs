use crate::errors::EngramResult;
use crate::memory::SectorVectors;

/// Embedding generation provider.
///
/// Produces one vector per sector for a single text. Vectors are
/// L2-normalized to unit length; an all-zero vector is permitted only when
/// the input had no extractable signal.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text into all five sector vectors.
    fn embed(&self, text: &str) -> EngramResult<SectorVectors>;

    /// Embed a batch of texts.
    fn embed_batch(&self, texts: &[String]) -> EngramResult<Vec<SectorVectors>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// The dimensionality of vectors produced by this provider. Fixed at
    /// construction; the store records it and refuses mismatched imports.
    fn dimensions(&self) -> usize;

    /// Identifier recorded on every stored embedding row.
    fn model_id(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
