//! Per-operation risk assessment. A proposed removal set is judged as a
//! whole: how big it is relative to the store, how important its members
//! are, whether any were touched recently, and how densely the graph points
//! at them. High-risk operations require explicit consent.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use engram_core::memory::Memory;

/// Risk level of a proposed forgetting operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very_low",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        }
    }

    /// Whether the caller must consent before the operation proceeds.
    pub fn requires_consent(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::VeryHigh)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A memory accessed within this window counts as recently used.
const RECENT_ACCESS_DAYS: i64 = 7;

/// Incoming links at or above this count as dense.
const DENSE_LINK_COUNT: usize = 3;

/// Assess the risk of removing `targets` out of `total_memories`.
pub fn assess(
    targets: &[&Memory],
    total_memories: usize,
    incoming_links: &BTreeMap<String, usize>,
    now: DateTime<Utc>,
) -> RiskLevel {
    if targets.is_empty() {
        return RiskLevel::VeryLow;
    }

    let mut points = 0u32;

    // Batch size relative to the whole store.
    let ratio = targets.len() as f64 / total_memories.max(1) as f64;
    points += match ratio {
        r if r >= 0.5 => 3,
        r if r >= 0.2 => 2,
        r if r >= 0.05 => 1,
        _ => 0,
    };

    // Average salience of the targets.
    let mean_salience =
        targets.iter().map(|m| m.salience.value()).sum::<f64>() / targets.len() as f64;
    points += match mean_salience {
        s if s >= 0.6 => 3,
        s if s >= 0.4 => 2,
        s if s >= 0.2 => 1,
        _ => 0,
    };

    // Recently accessed members.
    let recent_cutoff = now - Duration::days(RECENT_ACCESS_DAYS);
    if targets.iter().any(|m| m.last_accessed > recent_cutoff) {
        points += 2;
    }

    // Graph density: other memories leaning on the targets.
    let densely_linked = targets
        .iter()
        .filter(|m| incoming_links.get(&m.id).copied().unwrap_or(0) >= DENSE_LINK_COUNT)
        .count();
    if densely_linked * 2 >= targets.len() {
        points += 2;
    } else if densely_linked > 0 {
        points += 1;
    }

    match points {
        0 => RiskLevel::VeryLow,
        1..=2 => RiskLevel::Low,
        3..=4 => RiskLevel::Medium,
        5..=6 => RiskLevel::High,
        _ => RiskLevel::VeryHigh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::{Salience, Sector};

    fn target(salience: f64, days_since_access: i64) -> Memory {
        let mut m = Memory::new("u1", "t", Sector::Episodic);
        m.salience = Salience::new(salience);
        m.last_accessed = Utc::now() - Duration::days(days_since_access);
        m
    }

    #[test]
    fn empty_batch_is_very_low() {
        assert_eq!(
            assess(&[], 100, &BTreeMap::new(), Utc::now()),
            RiskLevel::VeryLow
        );
    }

    #[test]
    fn small_stale_unimportant_batch_is_low_risk() {
        let targets: Vec<Memory> = (0..2).map(|_| target(0.1, 60)).collect();
        let refs: Vec<&Memory> = targets.iter().collect();
        let level = assess(&refs, 1000, &BTreeMap::new(), Utc::now());
        assert!(level <= RiskLevel::Low);
    }

    #[test]
    fn wiping_half_the_salient_store_requires_consent() {
        let targets: Vec<Memory> = (0..50).map(|_| target(0.7, 1)).collect();
        let refs: Vec<&Memory> = targets.iter().collect();
        let level = assess(&refs, 100, &BTreeMap::new(), Utc::now());
        assert!(level.requires_consent());
    }

    #[test]
    fn ordering_reflects_severity() {
        assert!(RiskLevel::VeryLow < RiskLevel::Low);
        assert!(RiskLevel::High < RiskLevel::VeryHigh);
    }
}
