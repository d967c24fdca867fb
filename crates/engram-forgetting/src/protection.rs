//! Hard protection gates. A memory failing any gate is excluded from
//! forgetting before scoring even happens — weights cannot override these.

use chrono::{DateTime, Duration, Utc};

use engram_core::config::ForgettingConfig;
use engram_core::memory::{Memory, MemoryMetadata};

use crate::context::ForgettingContext;

/// Why a memory is exempt from forgetting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exemption {
    SalienceAboveCeiling,
    ProtectedCategory(String),
    PinnedId,
    TooYoung,
}

/// Check the hard gates. `None` means the memory may be scored.
pub fn exemption(
    memory: &Memory,
    metadata: &MemoryMetadata,
    config: &ForgettingConfig,
    ctx: &ForgettingContext,
    now: DateTime<Utc>,
) -> Option<Exemption> {
    if memory.salience.value() > config.max_auto_forget_importance {
        return Some(Exemption::SalienceAboveCeiling);
    }
    if let Some(category) = &metadata.category {
        if config.protected_categories.contains(category) {
            return Some(Exemption::ProtectedCategory(category.clone()));
        }
    }
    if ctx.protected_ids.contains(&memory.id) {
        return Some(Exemption::PinnedId);
    }
    if now - memory.created_at < Duration::days(config.min_age_days) {
        return Some(Exemption::TooYoung);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::{Salience, Sector};

    fn old_memory() -> Memory {
        let mut m = Memory::new("u1", "old", Sector::Episodic);
        m.created_at = Utc::now() - Duration::days(90);
        m.salience = Salience::new(0.2);
        m
    }

    #[test]
    fn young_memories_are_exempt() {
        let m = Memory::new("u1", "fresh", Sector::Episodic);
        let exemption = exemption(
            &m,
            &MemoryMetadata::default(),
            &ForgettingConfig::default(),
            &ForgettingContext::default(),
            Utc::now(),
        );
        assert_eq!(exemption, Some(Exemption::TooYoung));
    }

    #[test]
    fn high_salience_is_exempt() {
        let mut m = old_memory();
        m.salience = Salience::new(0.95);
        let exemption = exemption(
            &m,
            &MemoryMetadata::default(),
            &ForgettingConfig::default(),
            &ForgettingContext::default(),
            Utc::now(),
        );
        assert_eq!(exemption, Some(Exemption::SalienceAboveCeiling));
    }

    #[test]
    fn protected_category_is_exempt() {
        let m = old_memory();
        let mut metadata = MemoryMetadata::default();
        metadata.category = Some("diary".to_string());
        let mut config = ForgettingConfig::default();
        config.protected_categories.insert("diary".to_string());

        let exemption = exemption(&m, &metadata, &config, &ForgettingContext::default(), Utc::now());
        assert_eq!(
            exemption,
            Some(Exemption::ProtectedCategory("diary".to_string()))
        );
    }

    #[test]
    fn old_unprotected_memory_is_scoreable() {
        let m = old_memory();
        let exemption = exemption(
            &m,
            &MemoryMetadata::default(),
            &ForgettingConfig::default(),
            &ForgettingContext::default(),
            Utc::now(),
        );
        assert_eq!(exemption, None);
    }
}
