//! Persistence reliability tests: transaction atomicity, cascade deletes,
//! user scoping, and the filtered query path.

use chrono::{Duration, Utc};
use engram_core::constants::TOMBSTONE_ID;
use engram_core::memory::{LinkType, MemoryLink, Sector};
use engram_core::models::SearchFilters;
use engram_core::traits::IMemoryStorage;
use engram_storage::StorageEngine;
use test_fixtures::{memory, memory_with_scores, record, record_with_tags, unit_vector, FIXTURE_DIM};

fn engine() -> StorageEngine {
    StorageEngine::open_in_memory().expect("in-memory engine")
}

#[test]
fn insert_and_get_record_round_trips() {
    let store = engine();
    let rec = record_with_tags(
        memory("u1", "observed the deploy fail", Sector::Episodic),
        unit_vector(FIXTURE_DIM, 3),
        &["deploy", "incident"],
    );
    let id = rec.memory.id.clone();
    store.insert_record(&rec).unwrap();

    let loaded = store.get_record("u1", &id).unwrap().expect("record");
    assert_eq!(loaded.memory.content, "observed the deploy fail");
    assert_eq!(loaded.embeddings.len(), 5);
    assert_eq!(loaded.metadata.tags.len(), 2);
    assert_eq!(loaded.memory.created_at, rec.memory.created_at);
}

#[test]
fn get_is_user_scoped() {
    let store = engine();
    let rec = record(memory("u1", "private", Sector::Semantic), unit_vector(FIXTURE_DIM, 0));
    let id = rec.memory.id.clone();
    store.insert_record(&rec).unwrap();

    assert!(store.get_memory("u2", &id).unwrap().is_none());
    assert!(store.get_memory("u1", &id).unwrap().is_some());
}

#[test]
fn insert_with_dangling_link_rolls_back_everything() {
    let store = engine();
    let mut rec = record(memory("u1", "has bad link", Sector::Episodic), unit_vector(FIXTURE_DIM, 1));
    rec.links.push(MemoryLink::new(
        rec.memory.id.clone(),
        "no-such-target",
        LinkType::Related,
        0.5,
    ));
    let id = rec.memory.id.clone();

    assert!(store.insert_record(&rec).is_err());
    // The memory row must not exist either: the write is all-or-nothing.
    assert!(store.get_memory("u1", &id).unwrap().is_none());
}

#[test]
fn delete_cascades_to_metadata_embeddings_links() {
    let store = engine();
    let a = record(memory("u1", "a", Sector::Episodic), unit_vector(FIXTURE_DIM, 0));
    let b = record(memory("u1", "b", Sector::Episodic), unit_vector(FIXTURE_DIM, 1));
    let (a_id, b_id) = (a.memory.id.clone(), b.memory.id.clone());
    store.insert_record(&a).unwrap();
    store.insert_record(&b).unwrap();
    store
        .upsert_link("u1", &MemoryLink::new(a_id.clone(), b_id.clone(), LinkType::Related, 0.7))
        .unwrap();

    assert!(store.delete_memory("u1", &a_id).unwrap());
    assert!(store.get_memory("u1", &a_id).unwrap().is_none());
    assert!(store.embeddings_for(&a_id).unwrap().is_empty());
    assert!(store.links_from(&a_id).unwrap().is_empty());
}

#[test]
fn touch_bumps_access_count() {
    let store = engine();
    let rec = record(memory("u1", "touched", Sector::Procedural), unit_vector(FIXTURE_DIM, 2));
    let id = rec.memory.id.clone();
    store.insert_record(&rec).unwrap();

    let later = Utc::now() + Duration::seconds(10);
    store.touch_memory("u1", &id, later).unwrap();
    store.touch_memory("u1", &id, later).unwrap();

    let m = store.get_memory("u1", &id).unwrap().unwrap();
    assert_eq!(m.access_count, 2);
}

#[test]
fn reinforce_caps_at_one() {
    let store = engine();
    let rec = record(
        memory_with_scores("u1", "strong", Sector::Semantic, 0.98, 0.5, 0.01, 0),
        unit_vector(FIXTURE_DIM, 4),
    );
    let id = rec.memory.id.clone();
    store.insert_record(&rec).unwrap();

    store.reinforce_memory("u1", &id, 0.05).unwrap();
    let m = store.get_memory("u1", &id).unwrap().unwrap();
    assert_eq!(m.strength.value(), 1.0);
}

#[test]
fn self_loop_link_is_rejected() {
    let store = engine();
    let rec = record(memory("u1", "loop", Sector::Episodic), unit_vector(FIXTURE_DIM, 0));
    let id = rec.memory.id.clone();
    store.insert_record(&rec).unwrap();

    let err = store.upsert_link("u1", &MemoryLink::new(id.clone(), id, LinkType::Similar, 0.5));
    assert!(err.is_err());
}

#[test]
fn cross_user_link_is_rejected() {
    let store = engine();
    let a = record(memory("u1", "mine", Sector::Episodic), unit_vector(FIXTURE_DIM, 0));
    let b = record(memory("u2", "theirs", Sector::Episodic), unit_vector(FIXTURE_DIM, 1));
    let (a_id, b_id) = (a.memory.id.clone(), b.memory.id.clone());
    store.insert_record(&a).unwrap();
    store.insert_record(&b).unwrap();

    let err = store.upsert_link("u1", &MemoryLink::new(a_id, b_id, LinkType::Causal, 0.9));
    assert!(err.is_err());
}

#[test]
fn filtered_query_applies_sector_and_strength() {
    let store = engine();
    store
        .insert_record(&record(
            memory_with_scores("u1", "weak episodic", Sector::Episodic, 0.1, 0.5, 0.01, 0),
            unit_vector(FIXTURE_DIM, 0),
        ))
        .unwrap();
    store
        .insert_record(&record(
            memory_with_scores("u1", "strong semantic", Sector::Semantic, 0.9, 0.5, 0.01, 0),
            unit_vector(FIXTURE_DIM, 1),
        ))
        .unwrap();

    let filters = SearchFilters {
        sectors: Some(vec![Sector::Semantic]),
        min_strength: Some(0.5),
        ..Default::default()
    };
    let hits = store.query_filtered("u1", &filters, false).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "strong semantic");
}

#[test]
fn tag_filter_is_an_or() {
    let store = engine();
    store
        .insert_record(&record_with_tags(
            memory("u1", "tagged db", Sector::Episodic),
            unit_vector(FIXTURE_DIM, 0),
            &["db"],
        ))
        .unwrap();
    store
        .insert_record(&record_with_tags(
            memory("u1", "tagged net", Sector::Episodic),
            unit_vector(FIXTURE_DIM, 1),
            &["net"],
        ))
        .unwrap();
    store
        .insert_record(&record_with_tags(
            memory("u1", "untagged", Sector::Episodic),
            unit_vector(FIXTURE_DIM, 2),
            &[],
        ))
        .unwrap();

    let filters = SearchFilters {
        tags: Some(["db", "net"].iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    };
    let hits = store.query_filtered("u1", &filters, false).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn sector_probe_orders_by_similarity() {
    let store = engine();
    let near = record(memory("u1", "near", Sector::Episodic), unit_vector(FIXTURE_DIM, 0));
    let far = record(memory("u1", "far", Sector::Episodic), unit_vector(FIXTURE_DIM, 1));
    let near_id = near.memory.id.clone();
    store.insert_record(&near).unwrap();
    store.insert_record(&far).unwrap();

    let hits = store
        .sector_probe(
            "u1",
            Sector::Semantic,
            &unit_vector(FIXTURE_DIM, 0),
            &SearchFilters::default(),
            10,
            false,
        )
        .unwrap();
    assert_eq!(hits.len(), 1, "orthogonal vector scores zero and is dropped");
    assert_eq!(hits[0].0, near_id);
    assert!((hits[0].1 - 1.0).abs() < 1e-6);
}

#[test]
fn archive_hides_and_restore_reveals() {
    let store = engine();
    let rec = record(memory("u1", "to archive", Sector::Episodic), unit_vector(FIXTURE_DIM, 0));
    let id = rec.memory.id.clone();
    store.insert_record(&rec).unwrap();

    let archived = store.set_archived("u1", &[id.clone()], true).unwrap();
    assert_eq!(archived, 1);
    let m = store.get_memory("u1", &id).unwrap().unwrap();
    assert_eq!(m.consolidated_into.as_deref(), Some(TOMBSTONE_ID));
    assert!(store
        .query_filtered("u1", &SearchFilters::default(), false)
        .unwrap()
        .is_empty());

    let restored = store.set_archived("u1", &[id.clone()], false).unwrap();
    assert_eq!(restored, 1);
    let m = store.get_memory("u1", &id).unwrap().unwrap();
    assert!(m.consolidated_into.is_none());
}

#[test]
fn mark_consolidated_sets_both_pointers() {
    let store = engine();
    let child = record(memory("u1", "child", Sector::Episodic), unit_vector(FIXTURE_DIM, 0));
    let parent = record(memory("u1", "parent", Sector::Episodic), unit_vector(FIXTURE_DIM, 1));
    let (child_id, parent_id) = (child.memory.id.clone(), parent.memory.id.clone());
    store.insert_record(&child).unwrap();
    store.insert_record(&parent).unwrap();

    store
        .mark_consolidated("u1", &[child_id.clone()], &parent_id)
        .unwrap();
    let m = store.get_memory("u1", &child_id).unwrap().unwrap();
    assert_eq!(m.parent_id.as_deref(), Some(parent_id.as_str()));
    assert_eq!(m.consolidated_into.as_deref(), Some(parent_id.as_str()));
}

#[test]
fn aggregation_counts_are_zero_filled() {
    let store = engine();
    store
        .insert_record(&record(memory("u1", "one", Sector::Episodic), unit_vector(FIXTURE_DIM, 0)))
        .unwrap();

    let counts = store.count_by_sector("u1").unwrap();
    assert_eq!(counts.len(), 5);
    assert_eq!(counts[&Sector::Episodic], 1);
    assert_eq!(counts[&Sector::Reflective], 0);
}

#[test]
fn bytes_used_counts_content_and_embeddings() {
    let store = engine();
    store
        .insert_record(&record(memory("u1", "12345678", Sector::Episodic), unit_vector(FIXTURE_DIM, 0)))
        .unwrap();

    let bytes = store.bytes_used("u1").unwrap();
    // 8 content bytes + 5 sectors * FIXTURE_DIM * 4 bytes.
    assert_eq!(bytes, 8 + (5 * FIXTURE_DIM as u64 * 4));
}
