//! MemoryStore — the facade composing storage, embeddings, retrieval, and
//! export/import behind the public operation surface.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use engram_core::config::EngramConfig;
use engram_core::errors::{EngramError, EngramResult, RetrievalError};
use engram_core::memory::{
    DecayRate, Memory, MemoryLink, MemoryRecord, Salience, SectorVectors, Strength,
};
use engram_core::models::{SearchQuery, SearchResponse};
use engram_core::traits::{IEmbeddingProvider, IMemoryStorage};
use engram_embeddings::{EmbeddingEngine, LexicalProvider};
use engram_export::{ExportDocument, ExportEngine, ImportOptions, ImportSummary};
use engram_retrieval::RetrievalEngine;
use engram_storage::StorageEngine;
use tracing::debug;

use crate::graph;
use crate::requests::{CreateMemoryRequest, CreatedMemory, DeleteOptions, UpdatePatch};
use crate::validate;

/// The memory store.
pub struct MemoryStore {
    storage: Arc<StorageEngine>,
    embeddings: EmbeddingEngine,
    retrieval: RetrievalEngine,
    export: ExportEngine,
    config: EngramConfig,
}

impl MemoryStore {
    /// Open a file-backed store with the default lexical provider.
    pub fn open(path: &Path, config: EngramConfig) -> EngramResult<Self> {
        let storage = Arc::new(StorageEngine::open_with_pool_size(
            path,
            config.storage.read_pool_size,
        )?);
        let provider = Box::new(LexicalProvider::new(config.storage.embedding_dim));
        Ok(Self::with_parts(storage, provider, config))
    }

    /// In-memory store for tests and ephemeral sessions.
    pub fn open_in_memory(config: EngramConfig) -> EngramResult<Self> {
        let storage = Arc::new(StorageEngine::open_in_memory()?);
        let provider = Box::new(LexicalProvider::new(config.storage.embedding_dim));
        Ok(Self::with_parts(storage, provider, config))
    }

    /// Assemble from parts — the seam for swapping in a neural provider.
    pub fn with_parts(
        storage: Arc<StorageEngine>,
        provider: Box<dyn IEmbeddingProvider>,
        config: EngramConfig,
    ) -> Self {
        let embedding_dim = provider.dimensions();
        Self {
            embeddings: EmbeddingEngine::new(provider, config.storage.embedding_cache_entries),
            retrieval: RetrievalEngine::new(config.ranker.clone()),
            export: ExportEngine::new(embedding_dim),
            storage,
            config,
        }
    }

    /// The underlying storage engine, shared with the scheduler.
    pub fn storage(&self) -> Arc<StorageEngine> {
        Arc::clone(&self.storage)
    }

    pub fn config(&self) -> &EngramConfig {
        &self.config
    }

    // --- Operations ---

    /// Create a memory: row + metadata + five embeddings + links, one
    /// transaction.
    pub fn create_memory(&self, request: CreateMemoryRequest) -> EngramResult<CreatedMemory> {
        validate::validate_create(&request)?;

        let mut memory = Memory::new(&request.user_id, request.content, request.sector);
        memory.session_id = request.session_id;
        let id = memory.id.clone();

        let vectors = self.embeddings.embed(&memory.content)?;
        let embeddings = vectors.into_rows(&id, self.embeddings.model_id(), memory.created_at);

        let links = request
            .links
            .into_iter()
            .map(|spec| MemoryLink::new(id.clone(), spec.target_id, spec.link_type, spec.weight))
            .collect();

        let record = MemoryRecord {
            metadata: request.metadata.unwrap_or_default(),
            links,
            embeddings,
            memory,
        };
        self.storage.insert_record(&record)?;

        debug!(user_id = %record.memory.user_id, id = %id, "memory created");
        Ok(CreatedMemory { id })
    }

    /// Fetch a memory with everything attached. Bumps the access counter in
    /// its own transaction and lazily backfills embeddings dropped by an
    /// import with `regenerate_embeddings`.
    pub fn get_memory(&self, user_id: &str, id: &str) -> EngramResult<MemoryRecord> {
        validate::validate_user_id(user_id)?;
        let mut record = self
            .storage
            .get_record(user_id, id)?
            .ok_or_else(|| EngramError::not_found("memory", id))?;

        if record.embeddings.len() < engram_core::memory::Sector::COUNT {
            let vectors = self.embeddings.embed(&record.memory.content)?;
            let rows = vectors.into_rows(id, self.embeddings.model_id(), Utc::now());
            self.storage.upsert_embeddings(&rows)?;
            record.embeddings = rows;
        }

        let now = Utc::now();
        self.storage.touch_memory(user_id, id, now)?;
        record.memory.touch(now);
        Ok(record)
    }

    /// Search. Embeds the query text once unless pre-computed embeddings
    /// were supplied; reinforces hits whose similarity clears the
    /// reinforcement threshold.
    pub fn search_memories(
        &self,
        user_id: &str,
        query: SearchQuery,
    ) -> EngramResult<SearchResponse> {
        validate::validate_user_id(user_id)?;

        let vectors: SectorVectors = match (&query.query_embeddings, &query.query_text) {
            (Some(vectors), _) => vectors.clone(),
            (None, Some(text)) => self.embeddings.embed(text)?,
            (None, None) => return Err(EngramError::Retrieval(RetrievalError::EmptyQuery)),
        };

        let response = self
            .retrieval
            .search(self.storage.as_ref(), user_id, &query, &vectors)?;

        // Reinforcement: the single sanctioned strength increase.
        for hit in &response.hits {
            if engram_decay::reinforcement::qualifies(hit.similarity) {
                self.storage.reinforce_memory(
                    user_id,
                    &hit.memory.id,
                    engram_decay::reinforcement::reward(),
                )?;
            }
        }

        Ok(response)
    }

    /// Partial update. Re-embeds when the content changes; parent changes
    /// go through the forest cycle guard.
    pub fn update_memory(
        &self,
        user_id: &str,
        id: &str,
        patch: UpdatePatch,
    ) -> EngramResult<MemoryRecord> {
        validate::validate_user_id(user_id)?;
        validate::validate_patch(&patch)?;

        let mut memory = self
            .storage
            .get_memory(user_id, id)?
            .ok_or_else(|| EngramError::not_found("memory", id))?;

        let mut re_embed = false;
        if let Some(content) = patch.content {
            memory.content_hash = Memory::compute_content_hash(&content);
            memory.content = content;
            re_embed = true;
        }
        if let Some(session_id) = patch.session_id {
            memory.session_id = session_id;
        }
        if let Some(strength) = patch.strength {
            memory.strength = Strength::new(strength);
        }
        if let Some(salience) = patch.salience {
            memory.salience = Salience::new(salience);
        }
        if let Some(decay_rate) = patch.decay_rate {
            memory.decay_rate = DecayRate::new(decay_rate);
        }
        if let Some(parent_id) = patch.parent_id {
            if let Some(parent) = &parent_id {
                graph::check_parent_assignment(self.storage.as_ref(), user_id, id, parent)?;
            }
            memory.parent_id = parent_id;
        }

        self.storage.update_memory(&memory)?;
        if let Some(metadata) = patch.metadata {
            self.storage.update_metadata(id, &metadata)?;
        }
        if re_embed {
            let vectors = self.embeddings.embed(&memory.content)?;
            let rows = vectors.into_rows(id, self.embeddings.model_id(), Utc::now());
            self.storage.upsert_embeddings(&rows)?;
        }

        self.storage
            .get_record(user_id, id)?
            .ok_or_else(|| EngramError::not_found("memory", id))
    }

    /// Delete. Archives (tombstone) by default; `hard` removes the row and
    /// cascades.
    pub fn delete_memory(
        &self,
        user_id: &str,
        id: &str,
        options: DeleteOptions,
    ) -> EngramResult<bool> {
        validate::validate_user_id(user_id)?;
        if options.hard {
            self.storage.delete_memory(user_id, id)
        } else {
            Ok(self.storage.set_archived(user_id, &[id.to_string()], true)? > 0)
        }
    }

    /// Export under a filter. Archived and consolidated memories are
    /// included so a round-trip loses nothing.
    pub fn export_memories(
        &self,
        user_id: &str,
        filter: &engram_core::models::SearchFilters,
    ) -> EngramResult<ExportDocument> {
        validate::validate_user_id(user_id)?;
        self.export.export(&self.storage, user_id, filter)
    }

    /// Import a document, merge or replace, in one transaction.
    pub fn import_memories(
        &self,
        user_id: &str,
        document: &serde_json::Value,
        options: &ImportOptions,
    ) -> EngramResult<ImportSummary> {
        validate::validate_user_id(user_id)?;
        self.export.import(&self.storage, user_id, document, options)
    }

    /// Restore archived memories (possible until purge).
    pub fn recover_memories(&self, user_id: &str, ids: &[String]) -> EngramResult<usize> {
        validate::validate_user_id(user_id)?;
        self.storage.set_archived(user_id, ids, false)
    }
}
