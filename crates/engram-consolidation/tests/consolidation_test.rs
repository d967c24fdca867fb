//! Pipeline integration: a tight episodic cluster folds into one semantic
//! parent, children become invisible, phases progress in order, and
//! cancellation leaves a consistent store.

use chrono::Utc;
use engram_core::config::ConsolidationConfig;
use engram_core::memory::{MemoryRecord, Sector};
use engram_core::models::{ConsolidationPhase, SearchFilters};
use engram_core::traits::{IEmbeddingProvider, IMemoryStorage};
use engram_consolidation::ConsolidationEngine;
use engram_embeddings::LexicalProvider;
use engram_storage::StorageEngine;
use test_fixtures::memory;

const DIM: usize = 128;

/// Seed near-identical episodic observations so they cluster.
fn seed_cluster(store: &StorageEngine, provider: &LexicalProvider, n: usize) -> Vec<String> {
    let mut ids = Vec::new();
    for i in 0..n {
        let content = format!("deployment pipeline failed during image push attempt {i}");
        let m = memory("u1", &content, Sector::Episodic);
        let id = m.id.clone();
        let embeddings = provider
            .embed(&content)
            .unwrap()
            .into_rows(&id, provider.model_id(), m.created_at);
        store
            .insert_record(&MemoryRecord {
                memory: m,
                metadata: Default::default(),
                links: Vec::new(),
                embeddings,
            })
            .unwrap();
        ids.push(id);
    }
    ids
}

fn engine() -> ConsolidationEngine {
    ConsolidationEngine::new(
        Box::new(LexicalProvider::new(DIM)),
        ConsolidationConfig {
            // Lexical vectors of near-identical sentences sit well above this.
            similarity_threshold: 0.7,
            min_cluster_size: 3,
            ..Default::default()
        },
    )
}

#[test]
fn cluster_folds_into_single_parent() {
    let store = StorageEngine::open_in_memory().unwrap();
    let provider = LexicalProvider::new(DIM);
    let child_ids = seed_cluster(&store, &provider, 10);

    let mut phases = Vec::new();
    let report = engine()
        .run(&store, "u1", Utc::now(), &|| true, |p| {
            if phases.last() != p.phase.as_ref() {
                phases.extend(p.phase);
            }
        })
        .unwrap();

    assert_eq!(report.clusters_consolidated, 1);
    assert_eq!(report.memories_consolidated, 10);

    // Every child points at the same parent, twice over.
    let mut parents = std::collections::BTreeSet::new();
    for id in &child_ids {
        let m = store.get_memory("u1", id).unwrap().unwrap();
        assert_eq!(m.parent_id, m.consolidated_into);
        parents.extend(m.parent_id.clone());
    }
    assert_eq!(parents.len(), 1);

    // The parent is a visible non-atomic memory.
    let parent_id = parents.into_iter().next().unwrap();
    let parent = store.get_memory("u1", &parent_id).unwrap().unwrap();
    assert!(!parent.is_atomic);
    assert!(parent.is_visible());

    // Default queries no longer see the children.
    let visible = store
        .query_filtered("u1", &SearchFilters::default(), false)
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, parent_id);

    // Phase order: clustering → consolidating → linking → finished.
    let expected = [
        ConsolidationPhase::Idle,
        ConsolidationPhase::Clustering,
        ConsolidationPhase::Consolidating,
        ConsolidationPhase::Linking,
        ConsolidationPhase::Finished,
    ];
    assert_eq!(phases, expected);
}

#[test]
fn parent_salience_is_max_strength_is_mean() {
    let store = StorageEngine::open_in_memory().unwrap();
    let provider = LexicalProvider::new(DIM);
    let ids = seed_cluster(&store, &provider, 4);

    // Give one child standout salience.
    let mut standout = store.get_memory("u1", &ids[0]).unwrap().unwrap();
    standout.salience = 0.9.into();
    store.update_memory(&standout).unwrap();

    engine()
        .run(&store, "u1", Utc::now(), &|| true, |_| {})
        .unwrap();

    let child = store.get_memory("u1", &ids[0]).unwrap().unwrap();
    let parent = store
        .get_memory("u1", child.parent_id.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(parent.salience.value(), 0.9);
}

#[test]
fn unrelated_memories_stay_atomic() {
    let store = StorageEngine::open_in_memory().unwrap();
    let provider = LexicalProvider::new(DIM);
    seed_cluster(&store, &provider, 3);

    let loner_content = "weekly grocery list includes oranges and coffee beans";
    let m = memory("u1", loner_content, Sector::Episodic);
    let loner_id = m.id.clone();
    let embeddings = provider
        .embed(loner_content)
        .unwrap()
        .into_rows(&loner_id, provider.model_id(), m.created_at);
    store
        .insert_record(&MemoryRecord {
            memory: m,
            metadata: Default::default(),
            links: Vec::new(),
            embeddings,
        })
        .unwrap();

    engine()
        .run(&store, "u1", Utc::now(), &|| true, |_| {})
        .unwrap();

    let loner = store.get_memory("u1", &loner_id).unwrap().unwrap();
    assert!(loner.consolidated_into.is_none());
    assert!(loner.is_atomic);
}

#[test]
fn cancellation_before_consolidating_commits_nothing() {
    let store = StorageEngine::open_in_memory().unwrap();
    let provider = LexicalProvider::new(DIM);
    let ids = seed_cluster(&store, &provider, 5);

    // Allow the clustering check, cancel at the first cluster boundary.
    let calls = std::cell::Cell::new(0);
    let keep_going = || {
        let n = calls.get();
        calls.set(n + 1);
        n == 0
    };

    let report = engine()
        .run(&store, "u1", Utc::now(), &keep_going, |_| {})
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.clusters_consolidated, 0);
    for id in &ids {
        let m = store.get_memory("u1", id).unwrap().unwrap();
        assert!(m.consolidated_into.is_none());
    }

    // A re-run completes the remainder.
    let report = engine()
        .run(&store, "u1", Utc::now(), &|| true, |_| {})
        .unwrap();
    assert_eq!(report.clusters_consolidated, 1);
}

#[test]
fn empty_store_finishes_with_no_clusters() {
    let store = StorageEngine::open_in_memory().unwrap();
    let engine = engine();

    let report = engine
        .run(&store, "u1", Utc::now(), &|| true, |_| {})
        .unwrap();

    assert_eq!(report.clusters_identified, 0);
    assert_eq!(report.phase_reached, ConsolidationPhase::Finished);
    assert!(!engine.is_running());
}
