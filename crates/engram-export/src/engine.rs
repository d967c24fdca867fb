//! ExportEngine — filtered export and transactional merge/replace import.

use serde_json::Value;

use engram_core::errors::{EngramError, EngramResult, ExportError};
use engram_core::models::SearchFilters;
use engram_storage::queries::{embedding_ops, link_ops, memory_crud};
use engram_storage::StorageEngine;
use tracing::{info, warn};

use crate::document::{ExportDocument, ExportedMemory, ImportMode, ImportOptions};
use crate::validation;

/// One captured per-record failure.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImportRecordError {
    pub id: String,
    pub message: String,
}

/// Final import summary.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ImportSummary {
    pub imported_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub errors: Vec<ImportRecordError>,
}

/// Export/import engine. The embedding dimension is fixed so mismatched
/// documents are refused outright.
pub struct ExportEngine {
    embedding_dim: usize,
}

impl ExportEngine {
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Export a user's memories (archived and consolidated included) under
    /// the given filter, in canonical id order.
    pub fn export(
        &self,
        storage: &StorageEngine,
        user_id: &str,
        filter: &SearchFilters,
    ) -> EngramResult<ExportDocument> {
        use engram_core::traits::IMemoryStorage;

        let mut memories = storage.query_filtered(user_id, filter, true)?;
        memories.sort_by(|a, b| a.id.cmp(&b.id));

        let mut exported = Vec::with_capacity(memories.len());
        for memory in &memories {
            if let Some(record) = storage.get_record(user_id, &memory.id)? {
                exported.push(ExportedMemory::from_record(&record));
            }
        }

        info!(user_id, count = exported.len(), "export complete");
        Ok(ExportDocument::new(user_id, filter.clone(), exported))
    }

    /// Import a document for one user in a single transaction.
    ///
    /// Per-memory failures are captured into the summary and do not abort;
    /// connection-level and dimension failures abort and roll everything
    /// back. Original timestamps are preserved verbatim.
    pub fn import(
        &self,
        storage: &StorageEngine,
        user_id: &str,
        document: &Value,
        options: &ImportOptions,
    ) -> EngramResult<ImportSummary> {
        validation::validate_document(document)?;
        self.check_version(document)?;
        self.check_dimensions(document)?;

        let raw_memories: Vec<Value> = document
            .get("memories")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut summary = ImportSummary::default();

        storage.with_writer(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| storage_err("import begin", e))?;

            // Pass 1: memories (and their metadata/embeddings).
            let mut parsed: Vec<ExportedMemory> = Vec::with_capacity(raw_memories.len());
            for raw in &raw_memories {
                let id = raw
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("<missing id>")
                    .to_string();
                match serde_json::from_value::<ExportedMemory>(raw.clone()) {
                    Ok(memory) => parsed.push(memory),
                    Err(e) => {
                        summary.record_failure(&id, format!("unparseable memory: {e}"));
                        continue;
                    }
                }
            }

            for memory in &parsed {
                let result = savepointed(&tx, "import_mem", || {
                    self.import_one(&tx, user_id, memory, options)
                });
                match result {
                    Ok(()) => summary.imported_count += 1,
                    Err(e) if is_abort(&e) => return Err(e),
                    Err(e) => summary.record_failure(&memory.id, e.to_string()),
                }
            }

            // Pass 2: links, once every member of the document exists.
            for memory in &parsed {
                for link in &memory.links {
                    let result = savepointed(&tx, "import_link", || {
                        link_ops::upsert_link(
                            &tx,
                            &engram_core::memory::MemoryLink::new(
                                memory.id.clone(),
                                link.target_id.clone(),
                                engram_core::memory::LinkType::parse_name(&link.link_type),
                                link.weight,
                            ),
                        )
                    });
                    match result {
                        Ok(()) => {}
                        Err(e) if is_abort(&e) => return Err(e),
                        Err(e) => summary.record_failure(
                            &memory.id,
                            format!("link to {}: {e}", link.target_id),
                        ),
                    }
                }
            }

            tx.commit().map_err(|e| storage_err("import commit", e))?;
            Ok(())
        })?;

        if summary.error_count > 0 {
            warn!(
                user_id,
                imported = summary.imported_count,
                errors = summary.error_count,
                "import finished with per-record errors"
            );
        } else {
            info!(user_id, imported = summary.imported_count, "import complete");
        }
        Ok(summary)
    }

    /// Insert or update one memory according to the import mode.
    fn import_one(
        &self,
        conn: &rusqlite::Connection,
        user_id: &str,
        exported: &ExportedMemory,
        options: &ImportOptions,
    ) -> EngramResult<()> {
        let mut record = exported.into_record(user_id);
        if options.regenerate_embeddings {
            // Dropped here; the store regenerates lazily on next retrieval.
            record.embeddings.clear();
        }

        let exists = memory_crud::get_memory(conn, user_id, &record.memory.id)?.is_some();
        match (options.mode, exists) {
            (ImportMode::Replace, true) => {
                memory_crud::delete_memory(conn, user_id, &record.memory.id)?;
                memory_crud::insert_memory_row(conn, &record.memory)?;
                memory_crud::insert_metadata_row(conn, &record.memory.id, &record.metadata)?;
            }
            (ImportMode::Merge, true) => {
                memory_crud::update_memory(conn, &record.memory)?;
                memory_crud::update_metadata(conn, &record.memory.id, &record.metadata)?;
            }
            (_, false) => {
                memory_crud::insert_memory_row(conn, &record.memory)?;
                memory_crud::insert_metadata_row(conn, &record.memory.id, &record.metadata)?;
            }
        }

        if !record.embeddings.is_empty() {
            embedding_ops::upsert_embeddings(conn, &record.embeddings)?;
        }
        Ok(())
    }

    fn check_version(&self, document: &Value) -> EngramResult<()> {
        let version = document
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !version.starts_with("1.") {
            return Err(EngramError::Export(ExportError::UnsupportedVersion {
                version: version.to_string(),
            }));
        }
        Ok(())
    }

    /// Any embedded vector of the wrong dimension makes the whole document
    /// unimportable.
    fn check_dimensions(&self, document: &Value) -> EngramResult<()> {
        let memories = document
            .get("memories")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for memory in &memories {
            let embeddings = memory
                .get("embeddings")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for embedding in &embeddings {
                if let Some(vector) = embedding.get("vector").and_then(Value::as_array) {
                    if vector.len() != self.embedding_dim {
                        return Err(EngramError::Export(ExportError::DimensionMismatch {
                            expected: self.embedding_dim,
                            actual: vector.len(),
                        }));
                    }
                }
            }
        }
        Ok(())
    }
}

impl ImportSummary {
    fn record_failure(&mut self, id: &str, message: String) {
        self.skipped_count += 1;
        self.error_count += 1;
        self.errors.push(ImportRecordError {
            id: id.to_string(),
            message,
        });
    }
}

/// Run `f` inside a savepoint so a failing record leaves the outer
/// transaction clean.
fn savepointed<T>(
    conn: &rusqlite::Connection,
    name: &str,
    f: impl FnOnce() -> EngramResult<T>,
) -> EngramResult<T> {
    conn.execute_batch(&format!("SAVEPOINT {name}"))
        .map_err(|e| storage_err("savepoint", e))?;
    match f() {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {name}"))
                .map_err(|e| storage_err("savepoint release", e))?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"));
            Err(e)
        }
    }
}

/// Failures that must abort the whole import instead of being captured.
fn is_abort(e: &EngramError) -> bool {
    e.is_fatal()
}

fn storage_err(step: &str, e: impl std::fmt::Display) -> EngramError {
    EngramError::Storage(engram_core::errors::StorageError::Sqlite {
        step: step.to_string(),
        message: e.to_string(),
    })
}
