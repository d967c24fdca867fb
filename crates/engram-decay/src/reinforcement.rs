//! Reinforcement policy: the single sanctioned path by which strength rises.
//!
//! A retrieval whose similarity clears the threshold earns the memory a
//! fixed reward, capped at 1.0. The store applies it; the policy lives here
//! next to the decay rule it counteracts.

use engram_core::constants::{REINFORCEMENT_REWARD, REINFORCEMENT_SIMILARITY_THRESHOLD};

/// Whether a retrieval at this similarity reinforces the memory.
pub fn qualifies(similarity: f64) -> bool {
    similarity >= REINFORCEMENT_SIMILARITY_THRESHOLD
}

/// The fixed reward added to strength on a qualifying retrieval.
pub fn reward() -> f64 {
    REINFORCEMENT_REWARD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(qualifies(0.5));
        assert!(!qualifies(0.49));
    }
}
