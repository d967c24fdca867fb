//! Request and response types for the store's invocation surface.

use serde::{Deserialize, Serialize};

use engram_core::memory::{LinkType, MemoryMetadata, Sector};

/// A link requested at creation time. The new memory is the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub target_id: String,
    pub link_type: LinkType,
    pub weight: f64,
}

/// Create a new memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemoryRequest {
    pub user_id: String,
    pub content: String,
    pub sector: Sector,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<MemoryMetadata>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

impl CreateMemoryRequest {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>, sector: Sector) -> Self {
        Self {
            user_id: user_id.into(),
            content: content.into(),
            sector,
            session_id: None,
            metadata: None,
            links: Vec::new(),
        }
    }
}

/// The id of a freshly created memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedMemory {
    pub id: String,
}

/// Partial update. `None` fields are left untouched; `parent_id` uses a
/// double Option so "clear the parent" and "leave it alone" stay distinct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatch {
    pub content: Option<String>,
    pub session_id: Option<Option<String>>,
    pub strength: Option<f64>,
    pub salience: Option<f64>,
    pub decay_rate: Option<f64>,
    pub parent_id: Option<Option<String>>,
    pub metadata: Option<MemoryMetadata>,
}

/// Delete behavior.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeleteOptions {
    /// Remove the row and its cascade instead of tombstoning it.
    #[serde(default)]
    pub hard: bool,
}
