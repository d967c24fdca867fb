//! ConsolidationEngine — drives the pipeline as a cancellable state
//! machine. A single-execution guard keeps concurrent runs out; progress is
//! published after every phase transition and every committed cluster.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use engram_core::config::ConsolidationConfig;
use engram_core::errors::{ConsolidationError, EngramError, EngramResult};
use engram_core::memory::Memory;
use engram_core::models::{ConsolidationPhase, TaskKind, TaskProgress};
use engram_core::traits::{IEmbeddingProvider, IMemoryStorage};
use engram_storage::StorageEngine;
use tracing::info;

use crate::algorithms::similarity;
use crate::pipeline;

/// Outcome of one consolidation run.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationReport {
    pub clusters_identified: usize,
    pub clusters_consolidated: usize,
    pub memories_consolidated: usize,
    pub links_created: usize,
    pub cancelled: bool,
    pub phase_reached: ConsolidationPhase,
}

/// The main consolidation engine.
pub struct ConsolidationEngine {
    /// Guard: only one consolidation can run at a time.
    is_running: Arc<AtomicBool>,
    /// Embedding provider for parent summaries.
    provider: Box<dyn IEmbeddingProvider>,
    config: ConsolidationConfig,
}

impl ConsolidationEngine {
    pub fn new(provider: Box<dyn IEmbeddingProvider>, config: ConsolidationConfig) -> Self {
        Self {
            is_running: Arc::new(AtomicBool::new(false)),
            provider,
            config,
        }
    }

    /// Check if a consolidation is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Run the full pipeline for one user.
    ///
    /// The candidate snapshot is taken once at entry; memories created
    /// during the run are not touched. `keep_going` is consulted at phase
    /// boundaries and between clusters — a cancelled run leaves every
    /// committed cluster in place and nothing half-written.
    pub fn run(
        &self,
        storage: &StorageEngine,
        user_id: &str,
        now: DateTime<Utc>,
        keep_going: &dyn Fn() -> bool,
        mut publish: impl FnMut(&TaskProgress),
    ) -> EngramResult<ConsolidationReport> {
        // Single-execution guard.
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngramError::Consolidation(ConsolidationError::AlreadyRunning));
        }

        let result = self.run_inner(storage, user_id, now, keep_going, &mut publish);

        self.is_running.store(false, Ordering::SeqCst);
        result
    }

    fn run_inner(
        &self,
        storage: &StorageEngine,
        user_id: &str,
        now: DateTime<Utc>,
        keep_going: &dyn Fn() -> bool,
        publish: &mut impl FnMut(&TaskProgress),
    ) -> EngramResult<ConsolidationReport> {
        let mut report = ConsolidationReport::default();

        // Snapshot the candidate set at run start.
        let candidates = storage.unconsolidated_episodic(user_id)?;
        let mut progress = TaskProgress::started(TaskKind::Consolidation, user_id, candidates.len(), now);
        progress.phase = Some(ConsolidationPhase::Idle);
        publish(&progress);

        // --- clustering ---
        progress.phase = Some(ConsolidationPhase::Clustering);
        report.phase_reached = ConsolidationPhase::Clustering;
        publish(&progress);

        if !keep_going() {
            return Ok(self.cancel(report, &mut progress, publish));
        }

        let ids: Vec<String> = candidates.iter().map(|m| m.id.clone()).collect();
        let vector_rows =
            storage.sector_vectors(user_id, engram_core::memory::Sector::Semantic, &ids)?;

        // Align memories with their semantic vectors; rows without one are
        // skipped (they cannot be clustered).
        let mut aligned: Vec<(&Memory, Vec<f32>)> = Vec::with_capacity(vector_rows.len());
        for (id, vector) in vector_rows {
            if let Some(m) = candidates.iter().find(|m| m.id == id) {
                aligned.push((m, vector));
            }
        }
        let memories: Vec<Memory> = aligned.iter().map(|(m, _)| (*m).clone()).collect();
        let vectors: Vec<Vec<f32>> = aligned.iter().map(|(_, v)| v.clone()).collect();

        let clusters = pipeline::cluster_candidates(
            &memories,
            &vectors,
            self.config.similarity_threshold,
            self.config.min_cluster_size,
        );
        report.clusters_identified = clusters.clusters.len();
        progress.clusters_identified = clusters.clusters.len();
        publish(&progress);

        info!(
            user_id,
            candidates = memories.len(),
            clusters = clusters.clusters.len(),
            "clustering complete"
        );

        // --- consolidating ---
        progress.phase = Some(ConsolidationPhase::Consolidating);
        report.phase_reached = ConsolidationPhase::Consolidating;
        publish(&progress);

        // (parent_id, member_ids, link weight, parent semantic vector)
        let mut committed: Vec<(String, Vec<String>, f64, Vec<f32>)> = Vec::new();

        for cluster in &clusters.clusters {
            if !keep_going() {
                return Ok(self.cancel(report, &mut progress, publish));
            }

            let children: Vec<&Memory> = cluster.iter().map(|&i| &memories[i]).collect();
            let child_vectors: Vec<&Vec<f32>> = cluster.iter().map(|&i| &vectors[i]).collect();
            let child_ids: Vec<String> = children.iter().map(|c| c.id.clone()).collect();

            let mut child_metadata = Vec::with_capacity(children.len());
            for id in &child_ids {
                child_metadata.push(storage.get_metadata(id)?);
            }

            let summary = pipeline::phase2_merging::summarize(&children);
            let parent_vectors = self.provider.embed(&summary)?;
            let parent = pipeline::build_parent(
                &children,
                &child_metadata,
                parent_vectors,
                self.provider.model_id(),
                now,
            );
            let parent_semantic = parent
                .embeddings
                .iter()
                .find(|e| e.sector == engram_core::memory::Sector::Semantic)
                .map(|e| e.vector.clone())
                .unwrap_or_default();

            let weight = similarity::mean_pairwise(&child_vectors);
            let parent_id = parent.memory.id.clone();

            // Parent insert + child pointers, one transaction.
            storage.commit_cluster(&parent, &child_ids)?;

            report.clusters_consolidated += 1;
            report.memories_consolidated += child_ids.len();
            progress.clusters_consolidated += 1;
            progress.advance(child_ids.len(), Utc::now());
            publish(&progress);

            committed.push((parent_id, child_ids, weight, parent_semantic));
        }

        // --- linking ---
        progress.phase = Some(ConsolidationPhase::Linking);
        report.phase_reached = ConsolidationPhase::Linking;
        publish(&progress);

        for (parent_id, member_ids, weight, parent_semantic) in &committed {
            if !keep_going() {
                return Ok(self.cancel(report, &mut progress, publish));
            }
            report.links_created += pipeline::link_parent(
                storage,
                user_id,
                parent_id,
                parent_semantic,
                member_ids,
                *weight,
                self.config.link_neighbors,
            )?;
        }

        // --- finished ---
        report.phase_reached = ConsolidationPhase::Finished;
        progress.finish();
        publish(&progress);

        info!(
            user_id,
            consolidated = report.clusters_consolidated,
            links = report.links_created,
            "consolidation finished"
        );
        Ok(report)
    }

    fn cancel(
        &self,
        mut report: ConsolidationReport,
        progress: &mut TaskProgress,
        publish: &mut impl FnMut(&TaskProgress),
    ) -> ConsolidationReport {
        report.cancelled = true;
        progress.cancelled = true;
        progress.is_running = false;
        publish(progress);
        report
    }
}
