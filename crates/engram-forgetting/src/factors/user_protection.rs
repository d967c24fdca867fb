//! User protection factor. Pinned or protected-category memories contribute
//! zero forgettability; everything else scales inversely with its stored
//! importance.
//!
//! Protection is also enforced as a hard gate before scoring — this factor
//! exists so near-protected memories still sink in the ranking even when a
//! gate does not apply.

use engram_core::config::ForgettingConfig;
use engram_core::memory::{Memory, MemoryMetadata};

use crate::context::ForgettingContext;

pub fn calculate(
    memory: &Memory,
    metadata: &MemoryMetadata,
    config: &ForgettingConfig,
    ctx: &ForgettingContext,
) -> f64 {
    if ctx.protected_ids.contains(&memory.id) {
        return 0.0;
    }
    if let Some(category) = &metadata.category {
        if config.protected_categories.contains(category) {
            return 0.0;
        }
    }
    1.0 - metadata.importance.value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::Sector;

    #[test]
    fn protected_category_contributes_zero() {
        let m = Memory::new("u1", "diary entry", Sector::Episodic);
        let mut metadata = MemoryMetadata::default();
        metadata.category = Some("diary".to_string());
        let mut config = ForgettingConfig::default();
        config.protected_categories.insert("diary".to_string());

        let factor = calculate(&m, &metadata, &config, &ForgettingContext::default());
        assert_eq!(factor, 0.0);
    }

    #[test]
    fn unprotected_scales_with_importance() {
        let m = Memory::new("u1", "note", Sector::Episodic);
        let mut metadata = MemoryMetadata::default();
        metadata.importance = 0.75.into();

        let factor = calculate(
            &m,
            &metadata,
            &ForgettingConfig::default(),
            &ForgettingContext::default(),
        );
        assert!((factor - 0.25).abs() < 1e-9);
    }
}
