//! Parent-forest guard. `parent_id` edges must stay acyclic; assignment is
//! checked against the user's whole parent graph before it commits.

use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;

use engram_core::errors::{EngramError, EngramResult, StorageError};
use engram_core::models::SearchFilters;
use engram_core::traits::IMemoryStorage;

/// Verify that pointing `child` at `parent` keeps the forest acyclic.
pub fn check_parent_assignment(
    storage: &dyn IMemoryStorage,
    user_id: &str,
    child: &str,
    parent: &str,
) -> EngramResult<()> {
    if child == parent {
        return Err(cycle_error(child, parent));
    }

    // All existing parent edges for this user, plus the proposed one.
    let memories = storage.query_filtered(user_id, &SearchFilters::default(), true)?;
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for memory in &memories {
        if let Some(p) = &memory.parent_id {
            graph.add_edge(memory.id.as_str(), p.as_str(), ());
        }
    }
    graph.add_edge(child, parent, ());

    if is_cyclic_directed(&graph) {
        return Err(cycle_error(child, parent));
    }
    Ok(())
}

fn cycle_error(child: &str, parent: &str) -> EngramError {
    EngramError::Storage(StorageError::ConstraintViolation {
        step: "parent_assignment".to_string(),
        message: format!("setting parent of {child} to {parent} would create a cycle"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::memory::{Memory, MemoryMetadata, MemoryRecord, Sector};
    use engram_storage::StorageEngine;

    fn seed(store: &StorageEngine, id: &str, parent: Option<&str>) {
        let mut memory = Memory::new("u1", format!("memory {id}"), Sector::Episodic);
        memory.id = id.to_string();
        memory.parent_id = parent.map(str::to_string);
        store
            .insert_record(&MemoryRecord {
                memory,
                metadata: MemoryMetadata::default(),
                links: Vec::new(),
                embeddings: Vec::new(),
            })
            .unwrap();
    }

    #[test]
    fn self_parent_is_rejected() {
        let store = StorageEngine::open_in_memory().unwrap();
        assert!(check_parent_assignment(&store, "u1", "a", "a").is_err());
    }

    #[test]
    fn chain_cycle_is_rejected() {
        let store = StorageEngine::open_in_memory().unwrap();
        seed(&store, "a", None);
        seed(&store, "b", Some("a"));
        seed(&store, "c", Some("b"));
        // a → c would close the loop a ← b ← c.
        assert!(check_parent_assignment(&store, "u1", "a", "c").is_err());
    }

    #[test]
    fn fresh_parent_is_accepted() {
        let store = StorageEngine::open_in_memory().unwrap();
        seed(&store, "a", None);
        seed(&store, "b", None);
        assert!(check_parent_assignment(&store, "u1", "b", "a").is_ok());
    }
}
