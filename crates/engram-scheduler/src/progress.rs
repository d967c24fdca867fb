//! Progress registry: the latest published progress per (user, task kind).
//! Writers replace entries after every batch; the health monitor reads
//! non-destructively.

use dashmap::DashMap;

use engram_core::models::{ActiveConsolidation, TaskKind, TaskProgress};

/// Shared progress store.
#[derive(Default)]
pub struct ProgressRegistry {
    latest: DashMap<(String, TaskKind), TaskProgress>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest progress for this (user, kind).
    pub fn publish(&self, progress: TaskProgress) {
        self.latest
            .insert((progress.user_id.clone(), progress.kind), progress);
    }

    /// Latest progress for a (user, kind), if any run has published.
    pub fn latest(&self, user_id: &str, kind: TaskKind) -> Option<TaskProgress> {
        self.latest
            .get(&(user_id.to_string(), kind))
            .map(|entry| entry.value().clone())
    }

    /// The health monitor's view of consolidation for one user.
    pub fn active_consolidation(&self, user_id: &str) -> ActiveConsolidation {
        match self.latest(user_id, TaskKind::Consolidation) {
            Some(p) if p.is_running => ActiveConsolidation {
                is_running: true,
                phase: p.phase,
                percent_complete: p.percent_complete,
                clusters_identified: p.clusters_identified,
                clusters_consolidated: p.clusters_consolidated,
            },
            // Idle: no phase, but the last run's counters remain readable.
            Some(p) => ActiveConsolidation {
                is_running: false,
                phase: None,
                percent_complete: p.percent_complete,
                clusters_identified: p.clusters_identified,
                clusters_consolidated: p.clusters_consolidated,
            },
            None => ActiveConsolidation::default(),
        }
    }
}
