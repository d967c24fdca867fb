use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::progress::ConsolidationPhase;
use crate::memory::Sector;

/// Storage usage relative to quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageHealth {
    /// content bytes + embedding bytes.
    pub bytes_used: u64,
    pub quota_bytes: u64,
    pub usage_percent: f64,
}

impl StorageHealth {
    pub fn new(bytes_used: u64, quota_bytes: u64) -> Self {
        let usage_percent = if quota_bytes == 0 {
            0.0
        } else {
            bytes_used as f64 / quota_bytes as f64
        };
        Self {
            bytes_used,
            quota_bytes,
            usage_percent,
        }
    }
}

/// Memory counts bucketed by age since creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgeBuckets {
    pub last_day: u64,
    pub last_week: u64,
    pub last_month: u64,
    pub older: u64,
}

/// Forgetting candidate counts by criterion. `total_unique` deduplicates
/// memories matching more than one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForgettingCandidateCounts {
    pub low_strength: u64,
    pub old_age: u64,
    pub low_access: u64,
    pub total_unique: u64,
}

/// The last-published consolidation progress, as seen by the health monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveConsolidation {
    pub is_running: bool,
    pub phase: Option<ConsolidationPhase>,
    pub percent_complete: f64,
    pub clusters_identified: usize,
    pub clusters_consolidated: usize,
}

impl Default for ActiveConsolidation {
    fn default() -> Self {
        Self {
            is_running: false,
            phase: None,
            percent_complete: 0.0,
            clusters_identified: 0,
            clusters_consolidated: 0,
        }
    }
}

/// What a recommendation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Optimization,
    Pruning,
    Archiving,
    Consolidation,
}

/// The concrete action a recommendation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedAction {
    Optimize,
    Prune,
    Archive,
    Consolidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// An actionable recommendation surfaced through the health snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub action: RecommendedAction,
    pub message: String,
}

/// On-demand health snapshot for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub storage: StorageHealth,
    /// Zero-filled for all five sectors.
    pub counts_by_sector: BTreeMap<Sector, u64>,
    pub counts_by_age: AgeBuckets,
    pub forgetting_candidates: ForgettingCandidateCounts,
    /// Atomic episodic memories not yet consolidated.
    pub consolidation_queue: u64,
    pub active_consolidation: ActiveConsolidation,
    pub recommendations: Vec<Recommendation>,
}
