//! Property tests: decay is monotone and clamped for any score state.

use chrono::{Duration, Utc};
use engram_core::memory::{DecayRate, Memory, Sector, Strength};
use engram_decay::engine::DecayEngine;
use proptest::prelude::*;

fn make_memory(strength: f64, rate: f64, days_ago: i64) -> Memory {
    let mut m = Memory::new("u1", "prop", Sector::Episodic);
    m.strength = Strength::new(strength);
    m.decay_rate = DecayRate::new(rate);
    m.last_accessed = Utc::now() - Duration::days(days_ago);
    m
}

proptest! {
    #[test]
    fn decayed_strength_never_increases(
        strength in 0.0f64..=1.0,
        rate in 0.0f64..=1.0,
        days_ago in 0i64..3650,
    ) {
        let m = make_memory(strength, rate, days_ago);
        let updates = DecayEngine::default().process_batch(&[m.clone()], Utc::now());
        if let Some((_, new_strength)) = updates.first() {
            prop_assert!(*new_strength <= m.strength.value());
            prop_assert!((0.0..=1.0).contains(new_strength));
        }
    }

    #[test]
    fn zero_rate_never_changes_strength(
        strength in 0.0f64..=1.0,
        days_ago in 0i64..3650,
    ) {
        let m = make_memory(strength, 0.0, days_ago);
        let updates = DecayEngine::default().process_batch(&[m], Utc::now());
        prop_assert!(updates.is_empty());
    }
}
