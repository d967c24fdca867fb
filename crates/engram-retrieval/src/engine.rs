//! RetrievalEngine — fans out per-sector probes, combines similarities,
//! and hands the pool to the ranker.

use std::time::{Duration, Instant};

use chrono::Utc;

use engram_core::config::RankerConfig;
use engram_core::constants::CANDIDATE_POOL_FACTOR;
use engram_core::memory::{Sector, SectorVectors};
use engram_core::models::{SearchQuery, SearchResponse};
use engram_core::errors::EngramResult;
use engram_core::traits::IMemoryStorage;

use crate::ranking::{self, Candidate};
use crate::similarity::combine_sector_sims;

/// The retrieval engine. Stateless besides its config; all data flows
/// through the storage driver per call.
pub struct RetrievalEngine {
    config: RankerConfig,
}

impl RetrievalEngine {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Run a search with already-resolved query embeddings.
    ///
    /// The pool is capped at `5 · limit` per sector probe; the ranker yields
    /// best-effort results if the query deadline expires.
    pub fn search(
        &self,
        storage: &dyn IMemoryStorage,
        user_id: &str,
        query: &SearchQuery,
        vectors: &SectorVectors,
    ) -> EngramResult<SearchResponse> {
        let started = Instant::now();
        let deadline = query
            .deadline_ms
            .map(|ms| started + Duration::from_millis(ms));

        let pool_limit = query.limit.saturating_mul(CANDIDATE_POOL_FACTOR).max(1);

        // Fan out one probe per sector over the filtered rows.
        let mut per_sector = Vec::with_capacity(Sector::COUNT);
        for &sector in &Sector::ALL {
            let hits = storage.sector_probe(
                user_id,
                sector,
                vectors.get(sector),
                &query.filters,
                pool_limit,
                query.include_consolidated,
            )?;
            per_sector.push((sector, hits));
        }

        // Deduplicate and join per-sector similarities.
        let combined = combine_sector_sims(&per_sector, self.config.sector_combine);
        let total_candidates = combined.len();

        let ids: Vec<String> = combined.keys().cloned().collect();
        let memories = storage.get_bulk(user_id, &ids)?;
        let links = storage.links_among(user_id, &ids)?;

        let candidates: Vec<Candidate> = memories
            .into_iter()
            .map(|m| {
                let similarity = combined.get(&m.id).copied().unwrap_or(0.0);
                Candidate {
                    memory: m,
                    similarity,
                }
            })
            .collect();

        let outcome = ranking::rank(
            candidates,
            &links,
            &self.config,
            query.ranking_method,
            Utc::now(),
            query.limit,
            deadline,
        );

        if outcome.timed_out {
            tracing::warn!(
                user_id,
                ranked = outcome.hits.len(),
                "search deadline elapsed, returning partial ranking"
            );
        }

        Ok(SearchResponse {
            processing_time_ms: processing_time_ms(started),
            ranking_method: query.ranking_method,
            total_candidates,
            timed_out: outcome.timed_out,
            hits: outcome.hits,
        })
    }
}

/// Elapsed wall-clock in whole milliseconds, at least 1 so callers can rely
/// on a positive duration.
fn processing_time_ms(started: Instant) -> u64 {
    (started.elapsed().as_millis() as u64).max(1)
}
