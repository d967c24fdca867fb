//! Export/import round-trips, modes, validation, and timestamp fidelity.

use engram_core::memory::{LinkType, MemoryLink, Sector};
use engram_core::models::SearchFilters;
use engram_core::traits::IMemoryStorage;
use engram_export::{ExportEngine, ImportMode, ImportOptions};
use engram_storage::StorageEngine;
use test_fixtures::{memory, memory_with_scores, record, record_with_tags, unit_vector, FIXTURE_DIM};

fn engine() -> ExportEngine {
    ExportEngine::new(FIXTURE_DIM)
}

fn seeded_store() -> (StorageEngine, Vec<String>) {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut ids = Vec::new();
    for i in 0..6 {
        let rec = record_with_tags(
            memory_with_scores(
                "u1",
                &format!("memory number {i}"),
                Sector::ALL[i % 5],
                0.4 + (i as f64) * 0.1,
                0.5,
                0.02,
                i as i64,
            ),
            unit_vector(FIXTURE_DIM, i),
            &["export", "test"],
        );
        ids.push(rec.memory.id.clone());
        store.insert_record(&rec).unwrap();
    }
    ids.sort();
    store
        .upsert_link(
            "u1",
            &MemoryLink::new(ids[0].clone(), ids[1].clone(), LinkType::Related, 0.7),
        )
        .unwrap();
    (store, ids)
}

#[test]
fn export_then_replace_import_round_trips_exactly() {
    let (store, ids) = seeded_store();
    let engine = engine();

    let exported = engine.export(&store, "u1", &SearchFilters::default()).unwrap();
    assert_eq!(exported.count, ids.len());

    // Wipe and re-import.
    for id in &ids {
        store.delete_memory("u1", id).unwrap();
    }
    let doc = serde_json::to_value(&exported).unwrap();
    let summary = engine
        .import(
            &store,
            "u1",
            &doc,
            &ImportOptions {
                mode: ImportMode::Replace,
                regenerate_embeddings: false,
            },
        )
        .unwrap();

    assert_eq!(summary.imported_count, exported.count);
    assert_eq!(summary.error_count, 0);

    // A second export is byte-identical under canonical ordering,
    // exported_at aside.
    let re_exported = engine.export(&store, "u1", &SearchFilters::default()).unwrap();
    assert_eq!(re_exported.count, exported.count);
    assert_eq!(re_exported.memories, exported.memories);
}

#[test]
fn timestamps_survive_import_verbatim() {
    let (store, ids) = seeded_store();
    let engine = engine();
    let exported = engine.export(&store, "u1", &SearchFilters::default()).unwrap();
    let original_created: Vec<_> = exported.memories.iter().map(|m| m.created_at).collect();

    for id in &ids {
        store.delete_memory("u1", id).unwrap();
    }
    let doc = serde_json::to_value(&exported).unwrap();
    engine
        .import(&store, "u1", &doc, &ImportOptions::default())
        .unwrap();

    for (exported_memory, created) in exported.memories.iter().zip(original_created) {
        let m = store.get_memory("u1", &exported_memory.id).unwrap().unwrap();
        assert_eq!(Some(m.created_at), created);
        assert_eq!(Some(m.last_accessed), exported_memory.last_accessed);
        assert_eq!(m.access_count, exported_memory.access_count);
    }
}

#[test]
fn min_strength_filter_limits_export() {
    let (store, _) = seeded_store();
    let engine = engine();

    let filter = SearchFilters {
        min_strength: Some(0.65),
        ..Default::default()
    };
    let exported = engine.export(&store, "u1", &filter).unwrap();
    assert!(exported.count < 6);
    assert!(exported.memories.iter().all(|m| m.strength >= 0.65));
}

#[test]
fn merge_updates_existing_and_inserts_new() {
    let (store, ids) = seeded_store();
    let engine = engine();
    let mut exported = engine.export(&store, "u1", &SearchFilters::default()).unwrap();

    // Mutate one memory and add a brand-new one.
    exported.memories[0].content = "rewritten during merge".to_string();
    let fresh = record(memory("u1", "temp", Sector::Episodic), unit_vector(FIXTURE_DIM, 9));
    let mut fresh_export = engram_export::ExportedMemory::from_record(&fresh);
    fresh_export.id = "brand-new-id".to_string();
    exported.memories.push(fresh_export);

    let doc = serde_json::to_value(&exported).unwrap();
    let summary = engine
        .import(
            &store,
            "u1",
            &doc,
            &ImportOptions {
                mode: ImportMode::Merge,
                regenerate_embeddings: false,
            },
        )
        .unwrap();

    assert_eq!(summary.imported_count, 7);
    assert_eq!(summary.error_count, 0);
    let updated = store.get_memory("u1", &exported.memories[0].id).unwrap().unwrap();
    assert_eq!(updated.content, "rewritten during merge");
    assert!(store.get_memory("u1", "brand-new-id").unwrap().is_some());
    let _ = ids;
}

#[test]
fn bad_records_are_captured_not_fatal() {
    let store = StorageEngine::open_in_memory().unwrap();
    let engine = engine();

    let doc = serde_json::json!({
        "version": "1.0.0",
        "user_id": "u1",
        "memories": [
            {
                "id": "ok-1",
                "content": "importable",
                "primary_sector": "episodic",
                "created_at": "2024-01-01T00:00:00Z",
                "last_accessed": "2024-01-02T00:00:00Z",
                "strength": 0.8,
                "salience": 0.5,
                "access_count": 0,
                "metadata": {}
            },
            {
                "id": "bad-1",
                "content": "broken timestamp",
                "primary_sector": "episodic",
                "created_at": "not-a-timestamp",
                "strength": 0.8,
                "salience": 0.5
            }
        ]
    });

    let summary = engine
        .import(&store, "u1", &doc, &ImportOptions::default())
        .unwrap();

    assert_eq!(summary.imported_count, 1);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.errors[0].id, "bad-1");
    assert!(store.get_memory("u1", "ok-1").unwrap().is_some());
}

#[test]
fn invalid_document_shape_is_rejected_with_all_errors() {
    let store = StorageEngine::open_in_memory().unwrap();
    let engine = engine();
    let doc = serde_json::json!({"memories": "nope"});
    let err = engine
        .import(&store, "u1", &doc, &ImportOptions::default())
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("version"));
    assert!(text.contains("user_id"));
    assert!(text.contains("memories"));
}

#[test]
fn wrong_dimension_embeddings_abort_the_import() {
    let store = StorageEngine::open_in_memory().unwrap();
    let engine = engine();
    let doc = serde_json::json!({
        "version": "1.0.0",
        "user_id": "u1",
        "memories": [
            {
                "id": "m1",
                "content": "x",
                "primary_sector": "episodic",
                "created_at": "2024-01-01T00:00:00Z",
                "last_accessed": "2024-01-01T00:00:00Z",
                "strength": 1.0,
                "salience": 0.5,
                "access_count": 0,
                "metadata": {},
                "embeddings": [
                    {"sector": "episodic", "vector": [1.0, 0.0, 0.0],
                     "model_id": "other", "captured_at": "2024-01-01T00:00:00Z"}
                ]
            }
        ]
    });

    assert!(engine
        .import(&store, "u1", &doc, &ImportOptions::default())
        .is_err());
    assert!(store.get_memory("u1", "m1").unwrap().is_none());
}

#[test]
fn regenerate_embeddings_skips_vector_storage() {
    let (store, ids) = seeded_store();
    let engine = engine();
    let exported = engine.export(&store, "u1", &SearchFilters::default()).unwrap();

    for id in &ids {
        store.delete_memory("u1", id).unwrap();
    }
    let doc = serde_json::to_value(&exported).unwrap();
    engine
        .import(
            &store,
            "u1",
            &doc,
            &ImportOptions {
                mode: ImportMode::Replace,
                regenerate_embeddings: true,
            },
        )
        .unwrap();

    for id in &ids {
        assert!(store.embeddings_for(id).unwrap().is_empty());
    }
}
