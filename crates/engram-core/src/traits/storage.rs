use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::errors::EngramResult;
use crate::memory::{Memory, MemoryLink, MemoryMetadata, MemoryRecord, Sector, SectorEmbedding};
use crate::models::{AgeBuckets, ForgettingCandidateCounts, SearchFilters};

/// The persistence driver contract: CRUD + filtered query + vector probe +
/// links + lifecycle batches + aggregation + maintenance.
///
/// Every multi-row mutation is atomic: the implementation opens a
/// transaction, rolls back on any step's failure, and surfaces a typed error
/// naming the failing step. Conflicts are retried internally up to a bounded
/// count; all other failures are fatal to the operation.
pub trait IMemoryStorage: Send + Sync {
    // --- CRUD ---
    /// Write the memory row, its metadata, all five embeddings, and any
    /// links in one transaction.
    fn insert_record(&self, record: &MemoryRecord) -> EngramResult<()>;
    fn get_memory(&self, user_id: &str, id: &str) -> EngramResult<Option<Memory>>;
    /// Full view: memory + metadata + links + embeddings.
    fn get_record(&self, user_id: &str, id: &str) -> EngramResult<Option<MemoryRecord>>;
    fn get_bulk(&self, user_id: &str, ids: &[String]) -> EngramResult<Vec<Memory>>;
    fn update_memory(&self, memory: &Memory) -> EngramResult<()>;
    /// Metadata companion row; defaults when the row is absent.
    fn get_metadata(&self, memory_id: &str) -> EngramResult<MemoryMetadata>;
    fn update_metadata(&self, memory_id: &str, metadata: &MemoryMetadata) -> EngramResult<()>;
    /// Cascades to metadata, embeddings, and links. Returns whether a row
    /// was removed.
    fn delete_memory(&self, user_id: &str, id: &str) -> EngramResult<bool>;
    /// Bump `last_accessed` and `access_count` in its own transaction.
    fn touch_memory(&self, user_id: &str, id: &str, now: DateTime<Utc>) -> EngramResult<()>;
    /// Add `reward` to strength, capped at 1.0 — the only strength increase.
    fn reinforce_memory(&self, user_id: &str, id: &str, reward: f64) -> EngramResult<()>;

    // --- Query ---
    fn query_filtered(
        &self,
        user_id: &str,
        filters: &SearchFilters,
        include_consolidated: bool,
    ) -> EngramResult<Vec<Memory>>;
    /// Visible memories whose `last_accessed` is strictly before the cutoff,
    /// ordered by id for stable batch pagination.
    fn stale_memories(
        &self,
        user_id: &str,
        accessed_before: DateTime<Utc>,
        limit: usize,
        offset: usize,
    ) -> EngramResult<Vec<Memory>>;
    /// Atomic episodic memories not yet folded into any parent.
    fn unconsolidated_episodic(&self, user_id: &str) -> EngramResult<Vec<Memory>>;

    // --- Vector probe ---
    /// Nearest-neighbor probe over one sector's embeddings, restricted by
    /// the metadata filters. Returns (memory_id, cosine similarity) ordered
    /// descending, at most `limit` rows.
    fn sector_probe(
        &self,
        user_id: &str,
        sector: Sector,
        query: &[f32],
        filters: &SearchFilters,
        limit: usize,
        include_consolidated: bool,
    ) -> EngramResult<Vec<(String, f64)>>;

    // --- Embeddings ---
    fn embeddings_for(&self, memory_id: &str) -> EngramResult<Vec<SectorEmbedding>>;
    fn upsert_embeddings(&self, rows: &[SectorEmbedding]) -> EngramResult<()>;
    /// One sector's vectors for a set of memories.
    fn sector_vectors(
        &self,
        user_id: &str,
        sector: Sector,
        ids: &[String],
    ) -> EngramResult<Vec<(String, Vec<f32>)>>;

    // --- Links ---
    fn links_from(&self, memory_id: &str) -> EngramResult<Vec<MemoryLink>>;
    /// All links whose source AND target are both in `ids`.
    fn links_among(&self, user_id: &str, ids: &[String]) -> EngramResult<Vec<MemoryLink>>;
    /// Insert or update on the (source, target, type) key. Rejects
    /// self-loops and cross-user endpoints.
    fn upsert_link(&self, user_id: &str, link: &MemoryLink) -> EngramResult<()>;
    fn incoming_link_counts(
        &self,
        user_id: &str,
        ids: &[String],
    ) -> EngramResult<BTreeMap<String, usize>>;

    // --- Lifecycle ---
    /// Set every child's `parent_id` and `consolidated_into` to the parent,
    /// atomically.
    fn mark_consolidated(
        &self,
        user_id: &str,
        child_ids: &[String],
        parent_id: &str,
    ) -> EngramResult<()>;
    /// Archive (tombstone) or restore a batch. Returns rows affected.
    fn set_archived(&self, user_id: &str, ids: &[String], archived: bool) -> EngramResult<usize>;
    /// Batch strength overwrite, one transaction. Returns rows affected.
    fn update_strengths(&self, updates: &[(String, f64)]) -> EngramResult<usize>;
    /// Batch (salience, decay_rate) overwrite, one transaction.
    fn downweight(&self, updates: &[(String, f64, f64)]) -> EngramResult<usize>;

    // --- Aggregation ---
    fn list_user_ids(&self) -> EngramResult<Vec<String>>;
    /// Zero-filled for all five sectors.
    fn count_by_sector(&self, user_id: &str) -> EngramResult<BTreeMap<Sector, u64>>;
    fn count_by_age(&self, user_id: &str, now: DateTime<Utc>) -> EngramResult<AgeBuckets>;
    /// content bytes + embedding bytes for one user.
    fn bytes_used(&self, user_id: &str) -> EngramResult<u64>;
    fn forgetting_candidate_counts(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> EngramResult<ForgettingCandidateCounts>;
    /// Atomic episodic memories not yet consolidated.
    fn consolidation_queue_depth(&self, user_id: &str) -> EngramResult<u64>;
    /// Visible memories whose `last_accessed` is before the cutoff.
    fn stale_count(&self, user_id: &str, accessed_before: DateTime<Utc>) -> EngramResult<u64>;

    // --- Maintenance ---
    fn vacuum(&self) -> EngramResult<()>;
}
