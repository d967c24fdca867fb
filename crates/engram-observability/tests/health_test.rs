//! Health snapshot over a real storage engine.

use engram_core::memory::Sector;
use engram_core::traits::IMemoryStorage;
use engram_observability::HealthReporter;
use engram_storage::StorageEngine;
use test_fixtures::{memory, memory_with_scores, record, unit_vector, FIXTURE_DIM};

#[test]
fn snapshot_reflects_store_contents() {
    let store = StorageEngine::open_in_memory().unwrap();
    store
        .insert_record(&record(memory("u1", "one", Sector::Episodic), unit_vector(FIXTURE_DIM, 0)))
        .unwrap();
    store
        .insert_record(&record(memory("u1", "two", Sector::Semantic), unit_vector(FIXTURE_DIM, 1)))
        .unwrap();

    let reporter = HealthReporter::new(1024 * 1024);
    let snapshot = reporter.build(&store, "u1", None).unwrap();

    assert_eq!(snapshot.counts_by_sector.len(), 5);
    assert_eq!(snapshot.counts_by_sector[&Sector::Episodic], 1);
    assert_eq!(snapshot.counts_by_sector[&Sector::Semantic], 1);
    assert_eq!(snapshot.counts_by_age.last_day, 2);
    assert_eq!(snapshot.consolidation_queue, 1);
    assert!(snapshot.storage.bytes_used > 0);
    assert!(!snapshot.active_consolidation.is_running);
    assert_eq!(snapshot.active_consolidation.phase, None);
}

#[test]
fn empty_user_id_is_rejected() {
    let store = StorageEngine::open_in_memory().unwrap();
    let reporter = HealthReporter::new(1024);
    assert!(reporter.build(&store, "", None).is_err());
    assert!(reporter.build(&store, "   ", None).is_err());
}

#[test]
fn tight_quota_triggers_high_priority_optimization() {
    let store = StorageEngine::open_in_memory().unwrap();
    store
        .insert_record(&record(
            memory("u1", "content that uses quota bytes", Sector::Episodic),
            unit_vector(FIXTURE_DIM, 0),
        ))
        .unwrap();

    // Quota barely above current usage: usage_percent well past 0.9.
    let used = store.bytes_used("u1").unwrap();
    let reporter = HealthReporter::new(used + 1);
    let snapshot = reporter.build(&store, "u1", None).unwrap();

    let opt = snapshot
        .recommendations
        .iter()
        .find(|r| r.kind == engram_core::models::RecommendationKind::Optimization)
        .expect("optimization recommendation");
    assert_eq!(opt.priority, engram_core::models::Priority::High);
}

#[test]
fn low_strength_memories_show_as_candidates() {
    let store = StorageEngine::open_in_memory().unwrap();
    store
        .insert_record(&record(
            memory_with_scores("u1", "weak", Sector::Episodic, 0.05, 0.5, 0.01, 0),
            unit_vector(FIXTURE_DIM, 0),
        ))
        .unwrap();

    let reporter = HealthReporter::new(1024 * 1024);
    let snapshot = reporter.build(&store, "u1", None).unwrap();
    assert_eq!(snapshot.forgetting_candidates.low_strength, 1);
    assert!(snapshot.forgetting_candidates.total_unique >= 1);
}
