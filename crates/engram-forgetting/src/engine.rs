//! ForgettingEngine — gates, scores, risk-checks, and acts.
//!
//! Action selection: archive at or above the archive threshold when the
//! batch risk allows it, down-weight the middle band, leave the rest alone.
//! Hard deletes happen only under the purge policy and only for rows
//! already archived longer than the retention window.

use chrono::{DateTime, Duration, Utc};

use engram_core::config::ForgettingConfig;
use engram_core::constants::TOMBSTONE_ID;
use engram_core::errors::EngramResult;
use engram_core::memory::Memory;
use engram_core::models::{SearchFilters, TaskKind, TaskProgress};
use engram_core::traits::IMemoryStorage;
use tracing::{info, warn};

use crate::context::{ForgettingContext, ForgettingPolicy};
use crate::factors::terms::GoalMatcher;
use crate::protection;
use crate::risk::{self, RiskLevel};
use crate::score;

/// Salience multiplier applied when down-weighting.
const DOWNWEIGHT_SALIENCE: f64 = 0.8;
/// Decay-rate multiplier applied when down-weighting.
const DOWNWEIGHT_DECAY: f64 = 1.25;

/// Outcome of one forgetting run.
#[derive(Debug, Clone, Default)]
pub struct ForgettingReport {
    pub scored: usize,
    pub exempt: usize,
    pub archived: usize,
    pub downweighted: usize,
    pub purged: usize,
    /// Set when the engine refused to act without consent.
    pub refused_at_risk: Option<RiskLevel>,
    pub risk: Option<RiskLevel>,
    pub cancelled: bool,
}

/// The forgetting engine. Holds config and the bounded goal matcher cache.
pub struct ForgettingEngine {
    config: ForgettingConfig,
    matcher: GoalMatcher,
}

impl ForgettingEngine {
    pub fn new(config: ForgettingConfig) -> Self {
        Self {
            config,
            matcher: GoalMatcher::new(),
        }
    }

    pub fn config(&self) -> &ForgettingConfig {
        &self.config
    }

    /// Run a forgetting pass for one user.
    pub fn run(
        &self,
        storage: &dyn IMemoryStorage,
        user_id: &str,
        ctx: &ForgettingContext,
        now: DateTime<Utc>,
        keep_going: &dyn Fn() -> bool,
        mut publish: impl FnMut(&TaskProgress),
    ) -> EngramResult<ForgettingReport> {
        let mut report = ForgettingReport::default();

        let visible = storage.query_filtered(user_id, &SearchFilters::default(), false)?;
        let total_memories = visible.len();
        let mut progress = TaskProgress::started(TaskKind::Forgetting, user_id, total_memories, now);
        publish(&progress);

        // Gate, then score survivors.
        let mut archive_set: Vec<Memory> = Vec::new();
        let mut downweight_set: Vec<(String, f64, f64)> = Vec::new();

        for memory in &visible {
            if !keep_going() {
                report.cancelled = true;
                progress.cancelled = true;
                progress.is_running = false;
                publish(&progress);
                return Ok(report);
            }

            let metadata = storage.get_metadata(&memory.id)?;
            if let Some(_exemption) =
                protection::exemption(memory, &metadata, &self.config, ctx, now)
            {
                report.exempt += 1;
                progress.advance(1, Utc::now());
                continue;
            }

            let breakdown =
                score::forgetting_score(memory, &metadata, &self.config, ctx, &self.matcher);
            report.scored += 1;

            if breakdown.score >= self.config.archive_score {
                archive_set.push(memory.clone());
            } else if breakdown.score >= self.config.downweight_score {
                downweight_set.push((
                    memory.id.clone(),
                    memory.salience.value() * DOWNWEIGHT_SALIENCE,
                    memory.decay_rate.value() * DOWNWEIGHT_DECAY,
                ));
            }
            progress.advance(1, Utc::now());
        }
        publish(&progress);

        // Risk-gate the archive batch as a whole.
        let archive_refs: Vec<&Memory> = archive_set.iter().collect();
        let archive_ids: Vec<String> = archive_set.iter().map(|m| m.id.clone()).collect();
        let incoming = storage.incoming_link_counts(user_id, &archive_ids)?;
        let level = risk::assess(&archive_refs, total_memories, &incoming, now);
        report.risk = Some(level);

        if level.requires_consent() && !ctx.consent_to_high_risk {
            warn!(user_id, risk = %level, batch = archive_ids.len(), "forgetting refused without consent");
            report.refused_at_risk = Some(level);
            progress.finish();
            publish(&progress);
            return Ok(report);
        }

        // Archive only when the batch risk is low; a medium assessment
        // demotes the batch to down-weighting.
        if level <= RiskLevel::Low {
            report.archived = storage.set_archived(user_id, &archive_ids, true)?;
        } else {
            for m in &archive_set {
                downweight_set.push((
                    m.id.clone(),
                    m.salience.value() * DOWNWEIGHT_SALIENCE,
                    m.decay_rate.value() * DOWNWEIGHT_DECAY,
                ));
            }
        }

        if !downweight_set.is_empty() {
            report.downweighted = storage.downweight(&downweight_set)?;
        }

        // Purge: hard-delete archived rows past the retention window.
        if ctx.policy == ForgettingPolicy::Purge {
            report.purged = self.purge_expired(storage, user_id, now)?;
        }

        progress.finish();
        publish(&progress);
        info!(
            user_id,
            scored = report.scored,
            archived = report.archived,
            downweighted = report.downweighted,
            purged = report.purged,
            "forgetting pass complete"
        );
        Ok(report)
    }

    /// Restore archived memories. Possible until they are purged.
    pub fn recover(
        &self,
        storage: &dyn IMemoryStorage,
        user_id: &str,
        ids: &[String],
    ) -> EngramResult<usize> {
        storage.set_archived(user_id, ids, false)
    }

    /// Delete archived rows whose last access predates the retention
    /// window. Archived rows are invisible, so `last_accessed` stops moving
    /// at archival time and serves as the retention clock.
    fn purge_expired(
        &self,
        storage: &dyn IMemoryStorage,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> EngramResult<usize> {
        let everything = storage.query_filtered(user_id, &SearchFilters::default(), true)?;
        let cutoff = now - Duration::days(self.config.retention_window_days);

        let mut purged = 0usize;
        for memory in everything {
            let archived = memory.consolidated_into.as_deref() == Some(TOMBSTONE_ID);
            if archived && memory.last_accessed < cutoff && storage.delete_memory(user_id, &memory.id)? {
                purged += 1;
            }
        }
        Ok(purged)
    }
}
