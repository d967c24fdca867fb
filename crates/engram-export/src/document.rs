//! The export document model. Field order and collection ordering are
//! canonical so identical stores serialize to identical documents.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engram_core::constants::EXPORT_FORMAT_VERSION;
use engram_core::memory::{
    LinkType, Memory, MemoryMetadata, MemoryRecord, Salience, Sector, SectorEmbedding,
};
use engram_core::models::SearchFilters;

/// How an import treats ids that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Existing ids are updated in place; new ids are inserted.
    #[default]
    Merge,
    /// Existing ids are deleted (cascade) and re-inserted.
    Replace,
}

/// Options governing one import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    /// Drop embedded vectors and let the store regenerate them lazily.
    pub regenerate_embeddings: bool,
}

/// A link as exported: the source is the enclosing memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedLink {
    pub target_id: String,
    pub weight: f64,
    pub link_type: String,
}

/// One embedding row as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedEmbedding {
    pub sector: Sector,
    pub vector: Vec<f32>,
    pub model_id: String,
    pub captured_at: DateTime<Utc>,
}

/// One memory with everything attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedMemory {
    pub id: String,
    pub content: String,
    pub primary_sector: Sector,
    pub metadata: MemoryMetadata,
    #[serde(default)]
    pub embeddings: Vec<ExportedEmbedding>,
    /// Top-level echo of the metadata tags, canonically sorted.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Absent timestamps fall back to the import time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default = "default_salience")]
    pub salience: f64,
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default = "default_atomic")]
    pub is_atomic: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub consolidated_into: Option<String>,
    #[serde(default)]
    pub links: Vec<ExportedLink>,
}

fn default_atomic() -> bool {
    true
}

fn default_strength() -> f64 {
    1.0
}

fn default_salience() -> f64 {
    0.5
}

fn default_decay_rate() -> f64 {
    0.01
}

/// The top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub user_id: String,
    /// Echo of the filter the export ran with.
    #[serde(default)]
    pub filter: SearchFilters,
    pub count: usize,
    pub memories: Vec<ExportedMemory>,
}

impl ExportDocument {
    pub fn new(user_id: impl Into<String>, filter: SearchFilters, memories: Vec<ExportedMemory>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            user_id: user_id.into(),
            filter,
            count: memories.len(),
            memories,
        }
    }
}

impl ExportedMemory {
    /// Build from a full store record. Links keep only their (target, type,
    /// weight) — the source is implied.
    pub fn from_record(record: &MemoryRecord) -> Self {
        let mut links: Vec<ExportedLink> = record
            .links
            .iter()
            .map(|l| ExportedLink {
                target_id: l.target_id.clone(),
                weight: l.weight.value(),
                link_type: l.link_type.as_str().to_string(),
            })
            .collect();
        links.sort_by(|a, b| {
            a.target_id
                .cmp(&b.target_id)
                .then_with(|| a.link_type.cmp(&b.link_type))
        });

        Self {
            id: record.memory.id.clone(),
            content: record.memory.content.clone(),
            primary_sector: record.memory.primary_sector,
            metadata: record.metadata.clone(),
            embeddings: record
                .embeddings
                .iter()
                .map(|e| ExportedEmbedding {
                    sector: e.sector,
                    vector: e.vector.clone(),
                    model_id: e.model_id.clone(),
                    captured_at: e.captured_at,
                })
                .collect(),
            tags: record.metadata.tags.clone(),
            created_at: Some(record.memory.created_at),
            last_accessed: Some(record.memory.last_accessed),
            strength: record.memory.strength.value(),
            salience: record.memory.salience.value(),
            decay_rate: record.memory.decay_rate.value(),
            access_count: record.memory.access_count,
            session_id: record.memory.session_id.clone(),
            is_atomic: record.memory.is_atomic,
            parent_id: record.memory.parent_id.clone(),
            consolidated_into: record.memory.consolidated_into.clone(),
            links,
        }
    }

    /// Rebuild the store-side record. Timestamps are carried over verbatim
    /// when present, else stamped with the import time.
    pub fn into_record(&self, user_id: &str) -> MemoryRecord {
        let now = Utc::now();
        let memory = Memory {
            id: self.id.clone(),
            user_id: user_id.to_string(),
            session_id: self.session_id.clone(),
            content_hash: Memory::compute_content_hash(&self.content),
            content: self.content.clone(),
            primary_sector: self.primary_sector,
            created_at: self.created_at.unwrap_or(now),
            last_accessed: self.last_accessed.unwrap_or(now),
            access_count: self.access_count,
            strength: self.strength.into(),
            salience: Salience::new(self.salience),
            decay_rate: self.decay_rate.into(),
            is_atomic: self.is_atomic,
            parent_id: self.parent_id.clone(),
            consolidated_into: self.consolidated_into.clone(),
        };

        let mut metadata: MemoryMetadata = self.metadata.clone();
        // The top-level tag echo wins if the nested metadata lacks tags.
        if metadata.tags.is_empty() && !self.tags.is_empty() {
            metadata.tags = self.tags.clone();
        }

        let embeddings = self
            .embeddings
            .iter()
            .map(|e| SectorEmbedding {
                memory_id: self.id.clone(),
                sector: e.sector,
                vector: e.vector.clone(),
                model_id: e.model_id.clone(),
                captured_at: e.captured_at,
            })
            .collect();

        let links = self
            .links
            .iter()
            .map(|l| {
                engram_core::memory::MemoryLink::new(
                    self.id.clone(),
                    l.target_id.clone(),
                    LinkType::parse_name(&l.link_type),
                    l.weight,
                )
            })
            .collect();

        MemoryRecord {
            memory,
            metadata,
            links,
            embeddings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::Sector;

    #[test]
    fn record_round_trips_through_document_form() {
        let mut memory = Memory::new("u1", "round trip", Sector::Procedural);
        memory.access_count = 7;
        memory.session_id = Some("s1".to_string());
        let record = MemoryRecord {
            memory,
            metadata: MemoryMetadata::default(),
            links: Vec::new(),
            embeddings: Vec::new(),
        };

        let exported = ExportedMemory::from_record(&record);
        let rebuilt = exported.into_record("u1");

        assert_eq!(rebuilt.memory.id, record.memory.id);
        assert_eq!(rebuilt.memory.created_at, record.memory.created_at);
        assert_eq!(rebuilt.memory.last_accessed, record.memory.last_accessed);
        assert_eq!(rebuilt.memory.access_count, 7);
        assert_eq!(rebuilt.memory.session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn document_serializes_with_version() {
        let doc = ExportDocument::new("u1", SearchFilters::default(), Vec::new());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["count"], 0);
    }
}
