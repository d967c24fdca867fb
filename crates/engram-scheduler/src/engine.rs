//! The scheduler itself. One cooperative loop, three task kinds, three
//! single-flight flags, one maintenance mutex serializing actual batch work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::interval;
use tracing::{info, warn};

use engram_core::config::EngramConfig;
use engram_core::errors::EngramResult;
use engram_core::models::{TaskKind, TaskProgress};
use engram_core::traits::IMemoryStorage;
use engram_consolidation::{ConsolidationEngine, ConsolidationReport};
use engram_decay::{DecayEngine, DecayRunReport};
use engram_forgetting::{ForgettingContext, ForgettingEngine, ForgettingReport};
use engram_storage::StorageEngine;

use crate::cancellation::CancellationToken;
use crate::progress::ProgressRegistry;

/// What a manual trigger observed.
#[derive(Debug)]
pub enum TaskOutcome<R> {
    /// The task ran (possibly partially) and produced a report.
    Ran(R),
    /// Another instance of this task kind was already in flight.
    AlreadyRunning,
}

impl<R> TaskOutcome<R> {
    pub fn ran(self) -> Option<R> {
        match self {
            TaskOutcome::Ran(r) => Some(r),
            TaskOutcome::AlreadyRunning => None,
        }
    }
}

/// The maintenance scheduler.
pub struct Scheduler {
    storage: Arc<StorageEngine>,
    decay: DecayEngine,
    consolidation: ConsolidationEngine,
    forgetting: ForgettingEngine,
    config: EngramConfig,
    registry: Arc<ProgressRegistry>,
    token: CancellationToken,
    /// Serializes batch work across all task kinds.
    maintenance: Mutex<()>,
    /// Per-kind single-flight flags; concurrent wakes coalesce to a no-op.
    decay_in_flight: AtomicBool,
    consolidation_in_flight: AtomicBool,
    forgetting_in_flight: AtomicBool,
}

impl Scheduler {
    pub fn new(
        storage: Arc<StorageEngine>,
        consolidation: ConsolidationEngine,
        config: EngramConfig,
    ) -> Self {
        Self {
            decay: DecayEngine::new(config.decay.clone()),
            forgetting: ForgettingEngine::new(config.forgetting.clone()),
            consolidation,
            storage,
            config,
            registry: Arc::new(ProgressRegistry::new()),
            token: CancellationToken::new(),
            maintenance: Mutex::new(()),
            decay_in_flight: AtomicBool::new(false),
            consolidation_in_flight: AtomicBool::new(false),
            forgetting_in_flight: AtomicBool::new(false),
        }
    }

    /// Shared progress registry, read by the health monitor.
    pub fn registry(&self) -> Arc<ProgressRegistry> {
        Arc::clone(&self.registry)
    }

    /// Token that stops the loop and any in-flight task at its next batch
    /// boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Run the timer loop until cancelled. Intervals come from config;
    /// every tick fans out over all users present in the store.
    pub async fn run_loop(&self) {
        let mut decay_timer = interval(Duration::from_secs(self.config.decay.interval_secs));
        let mut consolidation_timer =
            interval(Duration::from_secs(self.config.consolidation.interval_secs));
        let mut forgetting_timer =
            interval(Duration::from_secs(self.config.forgetting.interval_secs));

        // The first tick of a tokio interval fires immediately; skip it so
        // startup does not imply a maintenance storm.
        decay_timer.tick().await;
        consolidation_timer.tick().await;
        forgetting_timer.tick().await;

        info!("maintenance scheduler started");
        loop {
            tokio::select! {
                _ = self.token.cancelled() => {
                    info!("maintenance scheduler stopped");
                    return;
                }
                _ = decay_timer.tick() => self.tick(TaskKind::Decay).await,
                _ = consolidation_timer.tick() => self.tick(TaskKind::Consolidation).await,
                _ = forgetting_timer.tick() => self.tick(TaskKind::Forgetting).await,
            }
        }
    }

    /// One scheduled tick: run the task for every user in the store.
    async fn tick(&self, kind: TaskKind) {
        let users = match self.storage.list_user_ids() {
            Ok(users) => users,
            Err(e) => {
                warn!(kind = %kind, error = %e, "tick could not enumerate users");
                return;
            }
        };
        for user_id in users {
            let outcome = tokio::task::block_in_place(|| match kind {
                TaskKind::Decay => self.run_decay(&user_id).map(|_| ()),
                TaskKind::Consolidation => self.run_consolidation(&user_id).map(|_| ()),
                TaskKind::Forgetting => {
                    self.run_forgetting(&user_id, &ForgettingContext::default())
                        .map(|_| ())
                }
            });
            if let Err(e) = outcome {
                warn!(kind = %kind, user_id, error = %e, "maintenance task failed");
                if e.is_fatal() {
                    warn!(kind = %kind, "fatal maintenance error, pausing scheduler");
                    self.token.cancel();
                    return;
                }
            }
            // Yield between users so cancellation and progress polls get in.
            tokio::task::yield_now().await;
            if self.token.is_cancelled() {
                return;
            }
        }
    }

    /// Manually trigger a decay sweep for one user.
    pub fn run_decay(&self, user_id: &str) -> EngramResult<TaskOutcome<DecayRunReport>> {
        let Some(_flight) = Flight::acquire(&self.decay_in_flight) else {
            return Ok(TaskOutcome::AlreadyRunning);
        };
        let _serial = self.maintenance.lock().unwrap_or_else(|e| e.into_inner());

        let budget = self.budget();
        let token = self.token.clone();
        let keep_going = move || !token.is_cancelled() && Instant::now() < budget;

        let registry = Arc::clone(&self.registry);
        let report = self.decay.run(
            self.storage.as_ref(),
            user_id,
            Utc::now(),
            &keep_going,
            |p| registry.publish(p.clone()),
        )?;
        self.stamp_timed_out(user_id, TaskKind::Decay, budget, report.cancelled);
        Ok(TaskOutcome::Ran(report))
    }

    /// Manually trigger consolidation for one user.
    pub fn run_consolidation(
        &self,
        user_id: &str,
    ) -> EngramResult<TaskOutcome<ConsolidationReport>> {
        let Some(_flight) = Flight::acquire(&self.consolidation_in_flight) else {
            return Ok(TaskOutcome::AlreadyRunning);
        };
        let _serial = self.maintenance.lock().unwrap_or_else(|e| e.into_inner());

        // A scheduled run only fires above the episodic backlog floor; a
        // manual trigger always runs.
        let budget = self.budget();
        let token = self.token.clone();
        let keep_going = move || !token.is_cancelled() && Instant::now() < budget;

        let registry = Arc::clone(&self.registry);
        let report = self.consolidation.run(
            self.storage.as_ref(),
            user_id,
            Utc::now(),
            &keep_going,
            |p| registry.publish(p.clone()),
        )?;
        self.stamp_timed_out(user_id, TaskKind::Consolidation, budget, report.cancelled);
        Ok(TaskOutcome::Ran(report))
    }

    /// Manually trigger a forgetting pass for one user. Decay runs first so
    /// forgetting never sees stale strengths.
    pub fn run_forgetting(
        &self,
        user_id: &str,
        ctx: &ForgettingContext,
    ) -> EngramResult<TaskOutcome<ForgettingReport>> {
        let Some(_flight) = Flight::acquire(&self.forgetting_in_flight) else {
            return Ok(TaskOutcome::AlreadyRunning);
        };
        let _serial = self.maintenance.lock().unwrap_or_else(|e| e.into_inner());

        let budget = self.budget();
        let token = self.token.clone();
        let keep_going = move || !token.is_cancelled() && Instant::now() < budget;

        let registry = Arc::clone(&self.registry);

        // Ordering guarantee: decay for a memory precedes forgetting for it
        // within the same tick.
        self.decay.run(
            self.storage.as_ref(),
            user_id,
            Utc::now(),
            &keep_going,
            |p| registry.publish(p.clone()),
        )?;

        let report = self.forgetting.run(
            self.storage.as_ref(),
            user_id,
            ctx,
            Utc::now(),
            &keep_going,
            |p| registry.publish(p.clone()),
        )?;
        self.stamp_timed_out(user_id, TaskKind::Forgetting, budget, report.cancelled);
        Ok(TaskOutcome::Ran(report))
    }

    fn budget(&self) -> Instant {
        Instant::now() + Duration::from_millis(self.config.timeouts.task_budget_ms)
    }

    /// A run that stopped because the budget elapsed (not a user cancel) is
    /// stamped `timed_out` in the registry; remaining work waits for the
    /// next tick.
    fn stamp_timed_out(&self, user_id: &str, kind: TaskKind, budget: Instant, cancelled: bool) {
        if cancelled && Instant::now() >= budget && !self.token.is_cancelled() {
            if let Some(mut p) = self.registry.latest(user_id, kind) {
                p.timed_out = true;
                p.cancelled = false;
                self.registry.publish(p);
            }
        }
    }
}

/// RAII guard for a per-kind single-flight flag.
struct Flight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> Flight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Progress snapshot helper for callers without a registry reference.
pub fn latest_progress(
    registry: &ProgressRegistry,
    user_id: &str,
    kind: TaskKind,
) -> Option<TaskProgress> {
    registry.latest(user_id, kind)
}
