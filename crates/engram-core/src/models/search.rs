use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::memory::{Memory, Sector, SectorVectors};

/// How search results are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankingMethod {
    /// Pure vector similarity.
    Similarity,
    /// Weighted blend of similarity, salience, recency, and link weight.
    #[default]
    Composite,
}

impl RankingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMethod::Similarity => "similarity",
            RankingMethod::Composite => "composite",
        }
    }
}

/// Metadata filters applied at the SQL layer before ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Allowed sectors; `None` means all five.
    pub sectors: Option<Vec<Sector>>,
    /// Tag set, matched as OR.
    pub tags: Option<BTreeSet<String>>,
    /// Inclusive creation-date range.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub min_salience: Option<f64>,
    pub min_strength: Option<f64>,
}

/// A search request. Either `query_text` or `query_embeddings` must be set;
/// pre-computed embeddings bypass the embedding step.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query_text: Option<String>,
    pub query_embeddings: Option<SectorVectors>,
    pub filters: SearchFilters,
    pub limit: usize,
    pub ranking_method: RankingMethod,
    /// Include memories hidden by `consolidated_into`.
    pub include_consolidated: bool,
    /// Optional deadline; on expiry the ranker returns best-effort-so-far.
    pub deadline_ms: Option<u64>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query_text: None,
            query_embeddings: None,
            filters: SearchFilters::default(),
            limit: defaults::DEFAULT_SEARCH_LIMIT,
            ranking_method: RankingMethod::default(),
            include_consolidated: false,
            deadline_ms: None,
        }
    }
}

impl SearchQuery {
    /// Text query with default filters and limits.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query_text: Some(query.into()),
            ..Self::default()
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub memory: Memory,
    /// Final score under the requested ranking method.
    pub score: f64,
    /// Combined vector similarity component, for reinforcement decisions.
    pub similarity: f64,
}

/// The full response to a search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub processing_time_ms: u64,
    pub ranking_method: RankingMethod,
    /// Size of the candidate pool before ranking.
    pub total_candidates: usize,
    /// True when the deadline elapsed and the ranking is best-effort.
    pub timed_out: bool,
}
