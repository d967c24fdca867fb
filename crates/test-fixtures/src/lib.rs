//! Shared test builders for integration tests and benchmarks across crates.
//!
//! Everything here returns fully-formed records that satisfy the store's
//! invariants (five unit-norm embeddings, metadata row, clamped scores) so
//! tests only spell out what they actually care about.

use chrono::{DateTime, Duration, Utc};

use engram_core::memory::{
    DecayRate, Memory, MemoryMetadata, MemoryRecord, Salience, Sector, SectorVectors, Strength,
};

/// Default embedding dimension used by fixtures. Small on purpose — tests
/// exercise the math, not the model.
pub const FIXTURE_DIM: usize = 16;

/// A unit vector with all mass in one bucket.
pub fn unit_vector(dim: usize, hot: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dim];
    v[hot % dim] = 1.0;
    v
}

/// A unit vector split across two buckets, for controllable similarity.
/// `cos(a, blend(a, b, t))` falls smoothly from 1.0 at t=0 toward 0.
pub fn blended_vector(dim: usize, hot_a: usize, hot_b: usize, t: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; dim];
    v[hot_a % dim] = (1.0 - t * t).sqrt();
    v[hot_b % dim] = t;
    v
}

/// Identical vectors in all five sectors.
pub fn sector_vectors(vector: Vec<f32>) -> SectorVectors {
    SectorVectors {
        episodic: vector.clone(),
        semantic: vector.clone(),
        procedural: vector.clone(),
        emotional: vector.clone(),
        reflective: vector,
    }
}

/// A memory with the given user, content, and sector; everything else at
/// defaults.
pub fn memory(user_id: &str, content: &str, sector: Sector) -> Memory {
    Memory::new(user_id, content, sector)
}

/// A memory with explicit score state, last accessed `days_ago`.
pub fn memory_with_scores(
    user_id: &str,
    content: &str,
    sector: Sector,
    strength: f64,
    salience: f64,
    decay_rate: f64,
    days_ago: i64,
) -> Memory {
    let mut m = Memory::new(user_id, content, sector);
    m.strength = Strength::new(strength);
    m.salience = Salience::new(salience);
    m.decay_rate = DecayRate::new(decay_rate);
    m.created_at = m.created_at - Duration::days(days_ago);
    m.last_accessed = m.last_accessed - Duration::days(days_ago);
    m
}

/// Wrap a memory into a full record with default metadata and five copies of
/// the given vector as embeddings.
pub fn record(memory: Memory, vector: Vec<f32>) -> MemoryRecord {
    record_at(memory, vector, Utc::now())
}

/// Same as [`record`] with an explicit capture timestamp.
pub fn record_at(memory: Memory, vector: Vec<f32>, captured_at: DateTime<Utc>) -> MemoryRecord {
    let embeddings = sector_vectors(vector).into_rows(&memory.id, "fixture-model", captured_at);
    MemoryRecord {
        metadata: MemoryMetadata::default(),
        links: Vec::new(),
        embeddings,
        memory,
    }
}

/// A record with tagged metadata.
pub fn record_with_tags(memory: Memory, vector: Vec<f32>, tags: &[&str]) -> MemoryRecord {
    let mut rec = record(memory, vector);
    rec.metadata.tags = tags.iter().map(|t| t.to_string()).collect();
    rec
}

/// A record with a category (for protected-category tests).
pub fn record_with_category(memory: Memory, vector: Vec<f32>, category: &str) -> MemoryRecord {
    let mut rec = record(memory, vector);
    rec.metadata.category = Some(category.to_string());
    rec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_five_embeddings() {
        let m = memory("u1", "hello", Sector::Episodic);
        let rec = record(m, unit_vector(FIXTURE_DIM, 0));
        assert_eq!(rec.embeddings.len(), 5);
        assert!(rec
            .embeddings
            .iter()
            .all(|e| e.vector.len() == FIXTURE_DIM));
    }

    #[test]
    fn blended_vector_is_unit_norm() {
        let v = blended_vector(FIXTURE_DIM, 0, 1, 0.4);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
