//! Actionable recommendations derived from a health snapshot.

use engram_core::memory::Sector;
use engram_core::models::{
    HealthSnapshot, Priority, Recommendation, RecommendationKind, RecommendedAction,
};

/// Storage usage at which optimization is suggested.
const USAGE_WARN: f64 = 0.8;
/// Storage usage at which optimization becomes high priority.
const USAGE_CRITICAL: f64 = 0.9;
/// Forgetting candidates beyond this suggest pruning.
const CANDIDATE_LIMIT: u64 = 100;
/// Old memories beyond this suggest archiving.
const OLD_LIMIT: u64 = 100;
/// Unconsolidated episodic memories beyond this suggest consolidation.
const EPISODIC_LIMIT: u64 = 50;

/// Generate recommendations for a snapshot.
pub fn generate(snapshot: &HealthSnapshot) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if snapshot.storage.usage_percent >= USAGE_WARN {
        let priority = if snapshot.storage.usage_percent >= USAGE_CRITICAL {
            Priority::High
        } else {
            Priority::Medium
        };
        recs.push(Recommendation {
            kind: RecommendationKind::Optimization,
            priority,
            action: RecommendedAction::Optimize,
            message: format!(
                "storage at {:.0}% of quota ({} of {} bytes)",
                snapshot.storage.usage_percent * 100.0,
                snapshot.storage.bytes_used,
                snapshot.storage.quota_bytes
            ),
        });
    }

    if snapshot.forgetting_candidates.total_unique > CANDIDATE_LIMIT {
        recs.push(Recommendation {
            kind: RecommendationKind::Pruning,
            priority: Priority::Medium,
            action: RecommendedAction::Prune,
            message: format!(
                "{} forgetting candidates accumulated",
                snapshot.forgetting_candidates.total_unique
            ),
        });
    }

    if snapshot.counts_by_age.older > OLD_LIMIT {
        recs.push(Recommendation {
            kind: RecommendationKind::Archiving,
            priority: Priority::Low,
            action: RecommendedAction::Archive,
            message: format!(
                "{} memories older than a month",
                snapshot.counts_by_age.older
            ),
        });
    }

    let episodic = snapshot
        .counts_by_sector
        .get(&Sector::Episodic)
        .copied()
        .unwrap_or(0);
    if episodic > EPISODIC_LIMIT {
        recs.push(Recommendation {
            kind: RecommendationKind::Consolidation,
            priority: Priority::Medium,
            action: RecommendedAction::Consolidate,
            message: format!("{episodic} episodic memories await consolidation"),
        });
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use engram_core::models::{
        ActiveConsolidation, AgeBuckets, ForgettingCandidateCounts, StorageHealth,
    };
    use std::collections::BTreeMap;

    fn snapshot(bytes_used: u64) -> HealthSnapshot {
        HealthSnapshot {
            user_id: "u1".to_string(),
            generated_at: Utc::now(),
            storage: StorageHealth::new(bytes_used, 1000),
            counts_by_sector: Sector::ALL.iter().map(|&s| (s, 0)).collect::<BTreeMap<_, _>>(),
            counts_by_age: AgeBuckets::default(),
            forgetting_candidates: ForgettingCandidateCounts::default(),
            consolidation_queue: 0,
            active_consolidation: ActiveConsolidation::default(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn quiet_store_has_no_recommendations() {
        assert!(generate(&snapshot(100)).is_empty());
    }

    #[test]
    fn ninety_percent_usage_is_high_priority_optimization() {
        let recs = generate(&snapshot(950));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Optimization);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].action, RecommendedAction::Optimize);
    }

    #[test]
    fn eighty_percent_usage_is_medium_priority() {
        let recs = generate(&snapshot(820));
        assert_eq!(recs[0].priority, Priority::Medium);
    }

    #[test]
    fn candidate_pileup_suggests_pruning() {
        let mut s = snapshot(0);
        s.forgetting_candidates.total_unique = 150;
        let recs = generate(&s);
        assert!(recs.iter().any(|r| r.kind == RecommendationKind::Pruning));
    }

    #[test]
    fn episodic_backlog_suggests_consolidation() {
        let mut s = snapshot(0);
        s.counts_by_sector.insert(Sector::Episodic, 60);
        let recs = generate(&s);
        assert!(recs
            .iter()
            .any(|r| r.action == RecommendedAction::Consolidate));
    }
}
