//! Phase 3: link each new parent to its nearest semantic neighbors.
//!
//! Neighbors are pre-existing memories — cluster members and the parent
//! itself are excluded. Link weight is the mean pairwise similarity of the
//! cluster's children, so tighter clusters assert stronger relatedness.

use engram_core::errors::EngramResult;
use engram_core::memory::{LinkType, MemoryLink, Sector};
use engram_core::models::SearchFilters;
use engram_core::traits::IMemoryStorage;

/// Create `related` links from the parent to its `neighbor_count` nearest
/// semantic neighbors. Returns the number of links written.
pub fn link_parent(
    storage: &dyn IMemoryStorage,
    user_id: &str,
    parent_id: &str,
    parent_semantic: &[f32],
    exclude: &[String],
    weight: f64,
    neighbor_count: usize,
) -> EngramResult<usize> {
    // Over-fetch so exclusions still leave enough neighbors.
    let probe_limit = neighbor_count + exclude.len() + 1;
    let hits = storage.sector_probe(
        user_id,
        Sector::Semantic,
        parent_semantic,
        &SearchFilters::default(),
        probe_limit,
        false,
    )?;

    let mut written = 0usize;
    for (neighbor_id, _) in hits {
        if written >= neighbor_count {
            break;
        }
        if neighbor_id == parent_id || exclude.contains(&neighbor_id) {
            continue;
        }
        storage.upsert_link(
            user_id,
            &MemoryLink::new(parent_id, neighbor_id, LinkType::Related, weight),
        )?;
        written += 1;
    }
    Ok(written)
}
