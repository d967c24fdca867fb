//! Aggregate health snapshot generation.

use chrono::Utc;

use engram_core::errors::{EngramResult, ValidationError};
use engram_core::models::{ActiveConsolidation, HealthSnapshot, StorageHealth};
use engram_core::traits::IMemoryStorage;

use super::recommendations;

/// Builds a [`HealthSnapshot`] from live aggregates and the last-published
/// maintenance progress.
pub struct HealthReporter {
    quota_bytes: u64,
}

impl HealthReporter {
    pub fn new(quota_bytes: u64) -> Self {
        Self { quota_bytes }
    }

    /// Generate a full snapshot for one user. `active_consolidation` is the
    /// scheduler's last-published view; pass `None` when no scheduler runs.
    pub fn build(
        &self,
        storage: &dyn IMemoryStorage,
        user_id: &str,
        active_consolidation: Option<ActiveConsolidation>,
    ) -> EngramResult<HealthSnapshot> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::single(
                "user_id",
                "empty",
                "user_id must be non-empty",
                "pass the id of the user whose health you want",
            )
            .into());
        }

        let now = Utc::now();
        let storage_health = StorageHealth::new(storage.bytes_used(user_id)?, self.quota_bytes);
        let counts_by_sector = storage.count_by_sector(user_id)?;
        let counts_by_age = storage.count_by_age(user_id, now)?;
        let forgetting_candidates = storage.forgetting_candidate_counts(user_id, now)?;
        let consolidation_queue = storage.consolidation_queue_depth(user_id)?;
        let active = active_consolidation.unwrap_or_default();

        let mut snapshot = HealthSnapshot {
            user_id: user_id.to_string(),
            generated_at: now,
            storage: storage_health,
            counts_by_sector,
            counts_by_age,
            forgetting_candidates,
            consolidation_queue,
            active_consolidation: active,
            recommendations: Vec::new(),
        };
        snapshot.recommendations = recommendations::generate(&snapshot);
        tracing::debug!(
            user_id,
            usage = snapshot.storage.usage_percent,
            recommendations = snapshot.recommendations.len(),
            "health snapshot generated"
        );
        Ok(snapshot)
    }
}
