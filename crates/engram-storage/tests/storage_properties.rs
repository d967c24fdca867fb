//! Property tests for the storage invariants: score clamping, the
//! five-embedding rule, and link endpoint constraints.

use engram_core::memory::Sector;
use engram_core::traits::IMemoryStorage;
use engram_storage::StorageEngine;
use proptest::prelude::*;
use test_fixtures::{memory_with_scores, record, unit_vector, FIXTURE_DIM};

fn arb_sector() -> impl Strategy<Value = Sector> {
    prop_oneof![
        Just(Sector::Episodic),
        Just(Sector::Semantic),
        Just(Sector::Procedural),
        Just(Sector::Emotional),
        Just(Sector::Reflective),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Invariant: committed scores are always inside [0, 1], whatever the
    // caller handed in.
    #[test]
    fn committed_scores_stay_in_range(
        strength in -1.0f64..2.0,
        salience in -1.0f64..2.0,
        decay in -1.0f64..2.0,
        sector in arb_sector(),
    ) {
        let store = StorageEngine::open_in_memory().unwrap();
        let rec = record(
            memory_with_scores("u1", "prop", sector, strength, salience, decay, 0),
            unit_vector(FIXTURE_DIM, 0),
        );
        let id = rec.memory.id.clone();
        store.insert_record(&rec).unwrap();

        let m = store.get_memory("u1", &id).unwrap().unwrap();
        prop_assert!((0.0..=1.0).contains(&m.strength.value()));
        prop_assert!((0.0..=1.0).contains(&m.salience.value()));
        prop_assert!((0.0..=1.0).contains(&m.decay_rate.value()));
    }

    // Invariant: every committed memory has exactly five embedding rows,
    // each unit-norm or all-zero.
    #[test]
    fn committed_memory_has_five_normalized_embeddings(
        hot in 0usize..FIXTURE_DIM,
        sector in arb_sector(),
    ) {
        let store = StorageEngine::open_in_memory().unwrap();
        let rec = record(
            memory_with_scores("u1", "prop", sector, 0.5, 0.5, 0.01, 0),
            unit_vector(FIXTURE_DIM, hot),
        );
        let id = rec.memory.id.clone();
        store.insert_record(&rec).unwrap();

        let rows = store.embeddings_for(&id).unwrap();
        prop_assert_eq!(rows.len(), 5);
        for row in rows {
            prop_assert!(engram_core::memory::embedding::is_normalized_or_zero(&row.vector));
        }
    }

    // Invariant: batch strength updates clamp into range too.
    #[test]
    fn update_strengths_clamps(new_strength in -1.0f64..2.0) {
        let store = StorageEngine::open_in_memory().unwrap();
        let rec = record(
            memory_with_scores("u1", "prop", Sector::Episodic, 0.5, 0.5, 0.01, 0),
            unit_vector(FIXTURE_DIM, 0),
        );
        let id = rec.memory.id.clone();
        store.insert_record(&rec).unwrap();

        store.update_strengths(&[(id.clone(), new_strength)]).unwrap();
        let m = store.get_memory("u1", &id).unwrap().unwrap();
        prop_assert!((0.0..=1.0).contains(&m.strength.value()));
    }
}
