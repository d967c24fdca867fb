//! DecayEngine — batched decay sweeps with progress publication.

use chrono::{DateTime, Duration, Utc};

use engram_core::config::DecayConfig;
use engram_core::errors::EngramResult;
use engram_core::memory::{Memory, Strength};
use engram_core::models::{TaskKind, TaskProgress};
use engram_core::traits::IMemoryStorage;

use crate::formula;

/// Outcome of one decay sweep.
#[derive(Debug, Clone, Default)]
pub struct DecayRunReport {
    pub scanned: usize,
    pub updated: usize,
    /// Memories whose new strength puts them below the forgetting floor.
    pub new_forgetting_candidates: usize,
    pub cancelled: bool,
}

/// The decay engine. Stateless besides its config.
pub struct DecayEngine {
    config: DecayConfig,
}

impl DecayEngine {
    pub fn new(config: DecayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    /// Compute strength updates for one already-fetched batch. Pure — no
    /// store access. Skips rows whose strength would not change.
    pub fn process_batch(&self, memories: &[Memory], now: DateTime<Utc>) -> Vec<(String, f64)> {
        memories
            .iter()
            .filter_map(|m| {
                let decayed = formula::decayed_strength(m, now);
                if decayed < m.strength.value() {
                    Some((m.id.clone(), decayed))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Run a full decay sweep for one user.
    ///
    /// Fetches stale memories page by page, each page one write
    /// transaction. `keep_going` is consulted between batches only; a
    /// cancelled sweep keeps everything already committed.
    pub fn run(
        &self,
        storage: &dyn IMemoryStorage,
        user_id: &str,
        now: DateTime<Utc>,
        keep_going: &dyn Fn() -> bool,
        mut publish: impl FnMut(&TaskProgress),
    ) -> EngramResult<DecayRunReport> {
        let cutoff = now - days_to_duration(self.config.rate_floor_days);
        let total = storage.stale_count(user_id, cutoff)? as usize;
        let mut progress = TaskProgress::started(TaskKind::Decay, user_id, total, now);
        publish(&progress);

        let mut report = DecayRunReport::default();
        let mut offset = 0usize;

        loop {
            if !keep_going() {
                report.cancelled = true;
                progress.cancelled = true;
                break;
            }

            let page =
                storage.stale_memories(user_id, cutoff, self.config.batch_size, offset)?;
            if page.is_empty() {
                break;
            }

            let updates = self.process_batch(&page, now);
            report.scanned += page.len();
            report.new_forgetting_candidates += updates
                .iter()
                .filter(|(_, s)| *s <= Strength::FORGETTING_FLOOR)
                .count();

            if !updates.is_empty() {
                report.updated += storage.update_strengths(&updates)?;
            }

            offset += page.len();
            progress.advance(page.len(), Utc::now());
            publish(&progress);

            tracing::debug!(
                user_id,
                batch = page.len(),
                updated = updates.len(),
                "decay batch committed"
            );

            if page.len() < self.config.batch_size {
                break;
            }
        }

        progress.finish();
        publish(&progress);
        Ok(report)
    }
}

impl Default for DecayEngine {
    fn default() -> Self {
        Self::new(DecayConfig::default())
    }
}

/// Fractional days to a chrono duration.
fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * 24.0 * 3600.0 * 1000.0) as i64)
}
