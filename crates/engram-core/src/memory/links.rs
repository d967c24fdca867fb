use serde::{Deserialize, Serialize};

use super::scores::LinkWeight;

/// Typed directed edges between memories of the same user.
/// The named variants cover the built-in semantics; `Custom` keeps the set
/// open for callers that define their own edge kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Semantic,
    Causal,
    Temporal,
    Analogical,
    Related,
    Similar,
    #[serde(untagged)]
    Custom(String),
}

impl LinkType {
    /// The built-in variants, for iteration.
    pub const BUILTIN: [LinkType; 6] = [
        Self::Semantic,
        Self::Causal,
        Self::Temporal,
        Self::Analogical,
        Self::Related,
        Self::Similar,
    ];

    /// Stable string name used in the database and export format.
    pub fn as_str(&self) -> &str {
        match self {
            LinkType::Semantic => "semantic",
            LinkType::Causal => "causal",
            LinkType::Temporal => "temporal",
            LinkType::Analogical => "analogical",
            LinkType::Related => "related",
            LinkType::Similar => "similar",
            LinkType::Custom(name) => name.as_str(),
        }
    }

    /// Parse from string name. Unknown names become `Custom`.
    pub fn parse_name(s: &str) -> Self {
        match s {
            "semantic" => LinkType::Semantic,
            "causal" => LinkType::Causal,
            "temporal" => LinkType::Temporal,
            "analogical" => LinkType::Analogical,
            "related" => LinkType::Related,
            "similar" => LinkType::Similar,
            other => LinkType::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A weighted directed edge between two memories.
///
/// Uniqueness key is (source_id, target_id, link_type). Self-loops are
/// rejected at the store layer; endpoints must share a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryLink {
    pub source_id: String,
    pub target_id: String,
    pub link_type: LinkType,
    pub weight: LinkWeight,
}

impl MemoryLink {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, link_type: LinkType, weight: f64) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            link_type,
            weight: LinkWeight::new(weight),
        }
    }

    /// Whether this link points back at its own source.
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}
