use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three maintenance task kinds the scheduler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Decay,
    Consolidation,
    Forgetting,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [Self::Decay, Self::Consolidation, Self::Forgetting];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Decay => "decay",
            TaskKind::Consolidation => "consolidation",
            TaskKind::Forgetting => "forgetting",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Consolidation pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsolidationPhase {
    #[default]
    Idle,
    Clustering,
    Consolidating,
    Linking,
    Finished,
}

impl ConsolidationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsolidationPhase::Idle => "idle",
            ConsolidationPhase::Clustering => "clustering",
            ConsolidationPhase::Consolidating => "consolidating",
            ConsolidationPhase::Linking => "linking",
            ConsolidationPhase::Finished => "finished",
        }
    }
}

impl std::fmt::Display for ConsolidationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress snapshot published by a maintenance task after every batch.
/// The health monitor reads these non-destructively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgress {
    pub kind: TaskKind,
    pub user_id: String,
    pub is_running: bool,
    pub processed: usize,
    pub total: usize,
    pub percent_complete: f64,
    /// Consolidation-only: the pipeline phase.
    pub phase: Option<ConsolidationPhase>,
    pub clusters_identified: usize,
    pub clusters_consolidated: usize,
    pub memories_processed: usize,
    pub memories_total: usize,
    pub started_at: DateTime<Utc>,
    pub estimated_remaining_ms: Option<u64>,
    /// Per-batch errors recorded without aborting the run.
    pub errors: Vec<String>,
    /// True when the task gave up because its wall-clock budget elapsed.
    pub timed_out: bool,
    /// True when a cancellation request stopped the task early.
    pub cancelled: bool,
}

impl TaskProgress {
    /// Fresh progress for a task that is about to start.
    pub fn started(kind: TaskKind, user_id: impl Into<String>, total: usize, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            user_id: user_id.into(),
            is_running: true,
            processed: 0,
            total,
            percent_complete: 0.0,
            phase: None,
            clusters_identified: 0,
            clusters_consolidated: 0,
            memories_processed: 0,
            memories_total: total,
            started_at: now,
            estimated_remaining_ms: None,
            errors: Vec::new(),
            timed_out: false,
            cancelled: false,
        }
    }

    /// Record a processed batch and refresh the derived fields.
    pub fn advance(&mut self, batch: usize, now: DateTime<Utc>) {
        self.processed += batch;
        self.memories_processed = self.processed;
        self.percent_complete = if self.total == 0 {
            100.0
        } else {
            (self.processed as f64 / self.total as f64 * 100.0).min(100.0)
        };
        // Linear estimate from throughput so far.
        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0) as f64;
        if self.processed > 0 && self.processed < self.total {
            let per_item = elapsed_ms / self.processed as f64;
            let remaining = (self.total - self.processed) as f64 * per_item;
            self.estimated_remaining_ms = Some(remaining as u64);
        } else if self.processed >= self.total {
            self.estimated_remaining_ms = Some(0);
        }
    }

    /// Mark the run finished.
    pub fn finish(&mut self) {
        self.is_running = false;
        self.estimated_remaining_ms = Some(0);
        if self.phase.is_some() {
            self.phase = Some(ConsolidationPhase::Finished);
        }
    }
}
