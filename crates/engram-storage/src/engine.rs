//! StorageEngine — owns the ConnectionPool, implements IMemoryStorage,
//! runs migrations on startup.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use engram_core::errors::EngramResult;
use engram_core::memory::{Memory, MemoryLink, MemoryMetadata, MemoryRecord, Sector, SectorEmbedding};
use engram_core::models::{AgeBuckets, ForgettingCandidateCounts, SearchFilters};
use engram_core::traits::IMemoryStorage;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::retry::with_retry;

/// The main storage engine. Owns the connection pool and provides the full
/// IMemoryStorage interface.
pub struct StorageEngine {
    pool: ConnectionPool,
    /// When true, use the read pool for read operations (file-backed mode).
    /// When false, route all reads through the writer (in-memory mode,
    /// because in-memory read pool connections are isolated databases).
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> EngramResult<Self> {
        Self::open_with_pool_size(path, ConnectionPool::DEFAULT_READERS)
    }

    /// Open with an explicit read pool size.
    pub fn open_with_pool_size(path: &Path, read_pool_size: usize) -> EngramResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let engine = Self {
            pool,
            use_read_pool: true,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing). Routes all reads
    /// through the writer since in-memory read pool connections cannot see
    /// the writer's changes.
    pub fn open_in_memory() -> EngramResult<Self> {
        let pool = ConnectionPool::open_in_memory(1)?;
        let engine = Self {
            pool,
            use_read_pool: false,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Run migrations.
    fn initialize(&self) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| migrations::run_migrations(conn))
    }

    /// Get a reference to the connection pool (for advanced operations such
    /// as multi-step import transactions).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the best available connection.
    pub fn with_reader<F, T>(&self, f: F) -> EngramResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> EngramResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn_sync(f)
        }
    }

    /// Execute a write on the single writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> EngramResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> EngramResult<T>,
    {
        self.pool.writer.with_conn_sync(f)
    }

    /// Commit one consolidation cluster atomically: parent record insert
    /// plus child pointer updates in a single transaction.
    pub fn commit_cluster(
        &self,
        parent: &MemoryRecord,
        child_ids: &[String],
    ) -> EngramResult<()> {
        with_retry("commit_cluster", || {
            self.pool.writer.with_conn_sync(|conn| {
                crate::queries::lifecycle::commit_cluster(conn, parent, child_ids)
            })
        })
    }
}

impl IMemoryStorage for StorageEngine {
    // --- CRUD ---

    fn insert_record(&self, record: &MemoryRecord) -> EngramResult<()> {
        with_retry("insert_record", || {
            self.pool
                .writer
                .with_conn_sync(|conn| crate::queries::memory_crud::insert_record(conn, record))
        })
    }

    fn get_memory(&self, user_id: &str, id: &str) -> EngramResult<Option<Memory>> {
        self.with_reader(|conn| crate::queries::memory_crud::get_memory(conn, user_id, id))
    }

    fn get_record(&self, user_id: &str, id: &str) -> EngramResult<Option<MemoryRecord>> {
        self.with_reader(|conn| crate::queries::memory_crud::get_record(conn, user_id, id))
    }

    fn get_bulk(&self, user_id: &str, ids: &[String]) -> EngramResult<Vec<Memory>> {
        self.with_reader(|conn| crate::queries::memory_crud::get_bulk(conn, user_id, ids))
    }

    fn update_memory(&self, memory: &Memory) -> EngramResult<()> {
        with_retry("update_memory", || {
            self.pool
                .writer
                .with_conn_sync(|conn| crate::queries::memory_crud::update_memory(conn, memory))
        })
    }

    fn get_metadata(&self, memory_id: &str) -> EngramResult<MemoryMetadata> {
        self.with_reader(|conn| crate::queries::memory_crud::get_metadata(conn, memory_id))
    }

    fn update_metadata(&self, memory_id: &str, metadata: &MemoryMetadata) -> EngramResult<()> {
        with_retry("update_metadata", || {
            self.pool.writer.with_conn_sync(|conn| {
                crate::queries::memory_crud::update_metadata(conn, memory_id, metadata)
            })
        })
    }

    fn delete_memory(&self, user_id: &str, id: &str) -> EngramResult<bool> {
        with_retry("delete_memory", || {
            self.pool
                .writer
                .with_conn_sync(|conn| crate::queries::memory_crud::delete_memory(conn, user_id, id))
        })
    }

    fn touch_memory(&self, user_id: &str, id: &str, now: DateTime<Utc>) -> EngramResult<()> {
        with_retry("touch_memory", || {
            self.pool.writer.with_conn_sync(|conn| {
                crate::queries::memory_crud::touch_memory(conn, user_id, id, now)
            })
        })
    }

    fn reinforce_memory(&self, user_id: &str, id: &str, reward: f64) -> EngramResult<()> {
        with_retry("reinforce_memory", || {
            self.pool.writer.with_conn_sync(|conn| {
                crate::queries::memory_crud::reinforce_memory(conn, user_id, id, reward)
            })
        })
    }

    // --- Query ---

    fn query_filtered(
        &self,
        user_id: &str,
        filters: &SearchFilters,
        include_consolidated: bool,
    ) -> EngramResult<Vec<Memory>> {
        self.with_reader(|conn| {
            crate::queries::memory_query::query_filtered(conn, user_id, filters, include_consolidated)
        })
    }

    fn stale_memories(
        &self,
        user_id: &str,
        accessed_before: DateTime<Utc>,
        limit: usize,
        offset: usize,
    ) -> EngramResult<Vec<Memory>> {
        self.with_reader(|conn| {
            crate::queries::memory_query::stale_memories(conn, user_id, accessed_before, limit, offset)
        })
    }

    fn unconsolidated_episodic(&self, user_id: &str) -> EngramResult<Vec<Memory>> {
        self.with_reader(|conn| {
            crate::queries::memory_query::unconsolidated_episodic(conn, user_id)
        })
    }

    // --- Vector probe ---

    fn sector_probe(
        &self,
        user_id: &str,
        sector: Sector,
        query: &[f32],
        filters: &SearchFilters,
        limit: usize,
        include_consolidated: bool,
    ) -> EngramResult<Vec<(String, f64)>> {
        self.with_reader(|conn| {
            crate::queries::vector_search::sector_probe(
                conn,
                user_id,
                sector,
                query,
                filters,
                limit,
                include_consolidated,
            )
        })
    }

    // --- Embeddings ---

    fn embeddings_for(&self, memory_id: &str) -> EngramResult<Vec<SectorEmbedding>> {
        self.with_reader(|conn| crate::queries::embedding_ops::embeddings_for(conn, memory_id))
    }

    fn upsert_embeddings(&self, rows: &[SectorEmbedding]) -> EngramResult<()> {
        with_retry("upsert_embeddings", || {
            self.pool
                .writer
                .with_conn_sync(|conn| crate::queries::embedding_ops::upsert_embeddings(conn, rows))
        })
    }

    fn sector_vectors(
        &self,
        user_id: &str,
        sector: Sector,
        ids: &[String],
    ) -> EngramResult<Vec<(String, Vec<f32>)>> {
        self.with_reader(|conn| {
            crate::queries::embedding_ops::sector_vectors(conn, user_id, sector, ids)
        })
    }

    // --- Links ---

    fn links_from(&self, memory_id: &str) -> EngramResult<Vec<MemoryLink>> {
        self.with_reader(|conn| crate::queries::link_ops::links_from(conn, memory_id))
    }

    fn links_among(&self, user_id: &str, ids: &[String]) -> EngramResult<Vec<MemoryLink>> {
        self.with_reader(|conn| crate::queries::link_ops::links_among(conn, user_id, ids))
    }

    fn upsert_link(&self, user_id: &str, link: &MemoryLink) -> EngramResult<()> {
        with_retry("upsert_link", || {
            self.pool.writer.with_conn_sync(|conn| {
                crate::queries::link_ops::upsert_link_checked(conn, user_id, link)
            })
        })
    }

    fn incoming_link_counts(
        &self,
        user_id: &str,
        ids: &[String],
    ) -> EngramResult<BTreeMap<String, usize>> {
        self.with_reader(|conn| {
            crate::queries::link_ops::incoming_link_counts(conn, user_id, ids)
        })
    }

    // --- Lifecycle ---

    fn mark_consolidated(
        &self,
        user_id: &str,
        child_ids: &[String],
        parent_id: &str,
    ) -> EngramResult<()> {
        with_retry("mark_consolidated", || {
            self.pool.writer.with_conn_sync(|conn| {
                crate::queries::lifecycle::mark_consolidated(conn, user_id, child_ids, parent_id)
            })
        })
    }

    fn set_archived(&self, user_id: &str, ids: &[String], archived: bool) -> EngramResult<usize> {
        with_retry("set_archived", || {
            self.pool.writer.with_conn_sync(|conn| {
                crate::queries::lifecycle::set_archived(conn, user_id, ids, archived)
            })
        })
    }

    fn update_strengths(&self, updates: &[(String, f64)]) -> EngramResult<usize> {
        with_retry("update_strengths", || {
            self.pool
                .writer
                .with_conn_sync(|conn| crate::queries::lifecycle::update_strengths(conn, updates))
        })
    }

    fn downweight(&self, updates: &[(String, f64, f64)]) -> EngramResult<usize> {
        with_retry("downweight", || {
            self.pool
                .writer
                .with_conn_sync(|conn| crate::queries::lifecycle::downweight(conn, updates))
        })
    }

    // --- Aggregation ---

    fn list_user_ids(&self) -> EngramResult<Vec<String>> {
        self.with_reader(crate::queries::memory_query::list_user_ids)
    }

    fn count_by_sector(&self, user_id: &str) -> EngramResult<BTreeMap<Sector, u64>> {
        self.with_reader(|conn| crate::queries::aggregation::count_by_sector(conn, user_id))
    }

    fn count_by_age(&self, user_id: &str, now: DateTime<Utc>) -> EngramResult<AgeBuckets> {
        self.with_reader(|conn| crate::queries::aggregation::count_by_age(conn, user_id, now))
    }

    fn bytes_used(&self, user_id: &str) -> EngramResult<u64> {
        self.with_reader(|conn| crate::queries::aggregation::bytes_used(conn, user_id))
    }

    fn forgetting_candidate_counts(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> EngramResult<ForgettingCandidateCounts> {
        self.with_reader(|conn| {
            crate::queries::aggregation::forgetting_candidate_counts(conn, user_id, now)
        })
    }

    fn consolidation_queue_depth(&self, user_id: &str) -> EngramResult<u64> {
        self.with_reader(|conn| {
            crate::queries::aggregation::consolidation_queue_depth(conn, user_id)
        })
    }

    fn stale_count(&self, user_id: &str, accessed_before: DateTime<Utc>) -> EngramResult<u64> {
        self.with_reader(|conn| {
            crate::queries::aggregation::stale_count(conn, user_id, accessed_before)
        })
    }

    // --- Maintenance ---

    fn vacuum(&self) -> EngramResult<()> {
        self.pool
            .writer
            .with_conn_sync(crate::queries::maintenance::full_vacuum)
    }
}
