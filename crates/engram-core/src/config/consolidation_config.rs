use serde::{Deserialize, Serialize};

use super::defaults;

/// Consolidation subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Cosine similarity threshold for joining a cluster.
    pub similarity_threshold: f64,
    /// Minimum cluster size worth consolidating.
    pub min_cluster_size: usize,
    /// Interval between consolidation runs (seconds).
    pub interval_secs: u64,
    /// Nearest semantic neighbors linked to each consolidated parent.
    pub link_neighbors: usize,
    /// Minimum unconsolidated episodic backlog before a scheduled run fires.
    pub min_episodic_backlog: usize,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            min_cluster_size: defaults::DEFAULT_MIN_CLUSTER_SIZE,
            interval_secs: defaults::DEFAULT_CONSOLIDATION_INTERVAL_SECS,
            link_neighbors: defaults::DEFAULT_LINK_NEIGHBORS,
            min_episodic_backlog: defaults::DEFAULT_MIN_EPISODIC_BACKLOG,
        }
    }
}
