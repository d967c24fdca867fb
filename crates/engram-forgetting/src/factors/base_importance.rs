//! Base importance factor: the inverse of stored salience, boosted when
//! salience falls below the configured importance threshold.

use engram_core::memory::Memory;

/// Boost multiplier applied below the threshold.
const LOW_SALIENCE_BOOST: f64 = 1.5;

pub fn calculate(memory: &Memory, importance_threshold: f64) -> f64 {
    let base = 1.0 - memory.salience.value();
    if memory.salience.value() < importance_threshold {
        (base * LOW_SALIENCE_BOOST).min(1.0)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::{Salience, Sector};

    fn memory(salience: f64) -> Memory {
        let mut m = Memory::new("u1", "x", Sector::Episodic);
        m.salience = Salience::new(salience);
        m
    }

    #[test]
    fn low_salience_is_boosted() {
        let factor = calculate(&memory(0.1), 0.3);
        assert!((factor - 1.0).abs() < 1e-9); // 0.9 * 1.5 capped at 1.0
    }

    #[test]
    fn high_salience_is_not_boosted() {
        let factor = calculate(&memory(0.8), 0.3);
        assert!((factor - 0.2).abs() < 1e-9);
    }
}
