//! Phase 2: merge each cluster into a parent memory.
//!
//! The parent is a non-atomic semantic memory whose content summarizes its
//! children; salience is the max over children (nothing important gets
//! diluted), strength the mean.

use chrono::{DateTime, Utc};

use engram_core::memory::{
    Memory, MemoryMetadata, MemoryRecord, Salience, SectorVectors, Strength,
};

/// Maximum characters of each child carried into the parent summary.
const SUMMARY_SNIPPET_CHARS: usize = 120;

/// Build the parent record for a cluster. Embeddings come from the caller
/// so the engine stays in charge of the provider.
pub fn build_parent(
    children: &[&Memory],
    child_metadata: &[MemoryMetadata],
    vectors: SectorVectors,
    model_id: &str,
    now: DateTime<Utc>,
) -> MemoryRecord {
    let content = summarize(children);

    let mut parent = Memory::new(
        &children[0].user_id,
        content,
        engram_core::memory::Sector::Semantic,
    );
    parent.is_atomic = false;
    parent.created_at = now;
    parent.last_accessed = now;
    parent.salience = Salience::new(
        children
            .iter()
            .map(|c| c.salience.value())
            .fold(0.0, f64::max),
    );
    parent.strength = Strength::new(
        children.iter().map(|c| c.strength.value()).sum::<f64>() / children.len() as f64,
    );

    // Union of child metadata, sets staying canonically sorted.
    let mut metadata = MemoryMetadata::default();
    for md in child_metadata {
        metadata.keywords.extend(md.keywords.iter().cloned());
        metadata.tags.extend(md.tags.iter().cloned());
        metadata
            .emotional_tags
            .extend(md.emotional_tags.iter().cloned());
    }
    metadata.importance = parent.salience;

    let embeddings = vectors.into_rows(&parent.id, model_id, now);

    MemoryRecord {
        memory: parent,
        metadata,
        links: Vec::new(),
        embeddings,
    }
}

/// Concatenated summary of the children, one clipped line each.
pub fn summarize(children: &[&Memory]) -> String {
    children
        .iter()
        .map(|c| snippet(&c.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn snippet(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= SUMMARY_SNIPPET_CHARS {
        return trimmed.to_string();
    }
    let clipped: String = trimmed.chars().take(SUMMARY_SNIPPET_CHARS).collect();
    format!("{clipped}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::Sector;
    use engram_core::memory::SectorVectors;

    fn child(salience: f64, strength: f64) -> Memory {
        let mut m = Memory::new("u1", "observed something noteworthy", Sector::Episodic);
        m.salience = Salience::new(salience);
        m.strength = Strength::new(strength);
        m
    }

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
    fn parent_takes_max_salience_and_mean_strength() {
        let a = child(0.2, 0.4);
        let b = child(0.8, 0.6);
        let parent = build_parent(
            &[&a, &b],
            &[MemoryMetadata::default(), MemoryMetadata::default()],
            vectors(),
            "test",
            Utc::now(),
        );
        assert_eq!(parent.memory.salience.value(), 0.8);
        assert!((parent.memory.strength.value() - 0.5).abs() < 1e-9);
        assert!(!parent.memory.is_atomic);
        assert_eq!(parent.memory.primary_sector, Sector::Semantic);
    }

    #[test]
    fn long_child_content_is_clipped() {
        let mut m = child(0.5, 0.5);
        m.content = "x".repeat(400);
        let summary = summarize(&[&m]);
        assert!(summary.chars().count() <= SUMMARY_SNIPPET_CHARS + 1);
    }
}
