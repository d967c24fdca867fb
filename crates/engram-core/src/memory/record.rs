use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::embedding::SectorEmbedding;
use super::links::MemoryLink;
use super::scores::{DecayRate, Salience, Strength};
use super::sector::Sector;
use crate::constants::TOMBSTONE_ID;

/// The primary entity. Every memory in the system is one of these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// UUID v4 identifier, assigned on creation.
    pub id: String,
    /// Tenant scope — every query is user-scoped.
    pub user_id: String,
    /// Optional session grouping.
    pub session_id: Option<String>,
    /// Free text, non-empty, bounded length.
    pub content: String,
    pub primary_sector: Sector,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Incremented on retrieval.
    pub access_count: u64,
    /// Activation level; decays over time, raised only by reinforcement.
    pub strength: Strength,
    /// Stored importance, adjusted by consolidation and feedback.
    pub salience: Salience,
    /// Per-day strength loss.
    pub decay_rate: DecayRate,
    /// False when this memory is a consolidation summarizing children.
    pub is_atomic: bool,
    /// Consolidated ancestor; parent edges form a forest, never cycles.
    pub parent_id: Option<String>,
    /// Set when this memory has been folded into another (or archived via
    /// the tombstone id). When set, the memory is invisible to default
    /// retrieval.
    pub consolidated_into: Option<String>,
    /// blake3 hash of content for dedup and embedding cache keys.
    pub content_hash: String,
}

impl Memory {
    /// Build a fresh atomic memory with default scores.
    pub fn new(user_id: impl Into<String>, content: impl Into<String>, sector: Sector) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            session_id: None,
            content_hash: Self::compute_content_hash(&content),
            content,
            primary_sector: sector,
            created_at: now,
            last_accessed: now,
            access_count: 0,
            strength: Strength::default(),
            salience: Salience::default(),
            decay_rate: DecayRate::default(),
            is_atomic: true,
            parent_id: None,
            consolidated_into: None,
        }
    }

    /// Compute the blake3 content hash.
    pub fn compute_content_hash(content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    /// Record an access: bump the counter and the access timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    /// Whether this memory is visible to default retrieval.
    pub fn is_visible(&self) -> bool {
        self.consolidated_into.is_none()
    }

    /// Whether this memory has been archived via the tombstone sentinel.
    pub fn is_archived(&self) -> bool {
        self.consolidated_into.as_deref() == Some(TOMBSTONE_ID)
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// One-to-one companion row carrying descriptive metadata.
///
/// Sets are BTreeSets so serialization order is canonical — export documents
/// must round-trip bit-exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MemoryMetadata {
    pub keywords: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub category: Option<String>,
    pub context: Option<String>,
    /// Importance score in [0, 1].
    pub importance: Salience,
    pub emotional_tags: BTreeSet<String>,
}

/// Full view of a memory: the row plus its metadata, links, and embeddings.
/// This is what `get_memory` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub memory: Memory,
    pub metadata: MemoryMetadata,
    pub links: Vec<MemoryLink>,
    pub embeddings: Vec<SectorEmbedding>,
}
