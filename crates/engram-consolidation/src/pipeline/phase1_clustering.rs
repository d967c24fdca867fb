//! Phase 1: greedy agglomerative clustering over semantic-sector embeddings.
//!
//! Seeds walk the candidates in id order; each seed absorbs every
//! still-unassigned candidate whose similarity to the seed clears the
//! threshold. Clusters below the minimum size dissolve back into noise.
//! Deterministic for a fixed candidate set.

use engram_core::memory::Memory;

use crate::algorithms::similarity;

/// Result of clustering: clusters of candidate indices, plus noise.
#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// Each inner Vec contains indices into the original candidate slice.
    pub clusters: Vec<Vec<usize>>,
    /// Indices not assigned to any cluster.
    pub noise: Vec<usize>,
}

/// Cluster candidates by semantic similarity.
///
/// `vectors` must be parallel to `candidates` — one semantic vector per
/// memory.
pub fn cluster_candidates(
    candidates: &[Memory],
    vectors: &[Vec<f32>],
    similarity_threshold: f64,
    min_cluster_size: usize,
) -> ClusterResult {
    let n = candidates.len();
    if n < min_cluster_size {
        return ClusterResult {
            clusters: vec![],
            noise: (0..n).collect(),
        };
    }

    // Stable seed order: ascending id.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| candidates[a].id.cmp(&candidates[b].id));

    let mut assigned = vec![false; n];
    let mut clusters: Vec<Vec<usize>> = Vec::new();

    for &seed in &order {
        if assigned[seed] {
            continue;
        }
        let sims = similarity::against_seed(&vectors[seed], vectors);
        let mut cluster: Vec<usize> = vec![seed];
        for &other in &order {
            if other == seed || assigned[other] {
                continue;
            }
            if sims[other] >= similarity_threshold {
                cluster.push(other);
            }
        }
        if cluster.len() >= min_cluster_size {
            for &idx in &cluster {
                assigned[idx] = true;
            }
            clusters.push(cluster);
        }
    }

    let noise = (0..n).filter(|&i| !assigned[i]).collect();
    ClusterResult { clusters, noise }
}
