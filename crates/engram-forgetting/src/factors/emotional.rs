//! Emotional significance factor. Memories carrying emotional tags resist
//! forgetting; the strong primary emotions resist hardest.

use engram_core::memory::MemoryMetadata;

/// Tags treated as strong emotions.
const STRONG_EMOTIONS: [&str; 5] = ["love", "fear", "anger", "joy", "sadness"];

/// Per-tag significance contribution.
const TAG_WEIGHT: f64 = 0.1;
/// Extra contribution for each strong emotion present.
const STRONG_BONUS: f64 = 0.3;

pub fn calculate(metadata: &MemoryMetadata) -> f64 {
    let count = metadata.emotional_tags.len() as f64;
    let strong = metadata
        .emotional_tags
        .iter()
        .filter(|t| STRONG_EMOTIONS.contains(&t.to_lowercase().as_str()))
        .count() as f64;
    let significance = (count * TAG_WEIGHT + strong * STRONG_BONUS).min(1.0);
    1.0 - significance
}
