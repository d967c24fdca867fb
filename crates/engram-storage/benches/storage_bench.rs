//! Storage benchmarks: record insert and sector probe over a seeded store.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use engram_core::memory::Sector;
use engram_core::models::SearchFilters;
use engram_core::traits::IMemoryStorage;
use engram_storage::StorageEngine;
use test_fixtures::{memory, record, unit_vector, FIXTURE_DIM};

fn seeded_engine(n: usize) -> StorageEngine {
    let store = StorageEngine::open_in_memory().unwrap();
    for i in 0..n {
        let rec = record(
            memory("bench", &format!("memory number {i}"), Sector::Episodic),
            unit_vector(FIXTURE_DIM, i),
        );
        store.insert_record(&rec).unwrap();
    }
    store
}

fn bench_insert(c: &mut Criterion) {
    let store = StorageEngine::open_in_memory().unwrap();
    c.bench_function("insert_record", |b| {
        b.iter_batched(
            || {
                record(
                    memory("bench", "a freshly observed event", Sector::Episodic),
                    unit_vector(FIXTURE_DIM, 1),
                )
            },
            |rec| store.insert_record(&rec).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_sector_probe(c: &mut Criterion) {
    let store = seeded_engine(500);
    let query = unit_vector(FIXTURE_DIM, 7);
    c.bench_function("sector_probe_500", |b| {
        b.iter(|| {
            store
                .sector_probe(
                    "bench",
                    Sector::Semantic,
                    &query,
                    &SearchFilters::default(),
                    50,
                    false,
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_insert, bench_sector_probe);
criterion_main!(benches);
