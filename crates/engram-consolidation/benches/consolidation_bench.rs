//! Clustering benchmark over synthetic candidate pools.

use criterion::{criterion_group, criterion_main, Criterion};
use engram_core::memory::{Memory, Sector};
use engram_consolidation::pipeline::cluster_candidates;

fn pool(n: usize, dim: usize) -> (Vec<Memory>, Vec<Vec<f32>>) {
    let mut memories = Vec::with_capacity(n);
    let mut vectors = Vec::with_capacity(n);
    for i in 0..n {
        let mut m = Memory::new("bench", format!("candidate {i}"), Sector::Episodic);
        m.id = format!("{i:06}");
        memories.push(m);
        // Ten loose groups: one hot bucket per group.
        let mut v = vec![0.0f32; dim];
        v[i % 10] = 1.0;
        vectors.push(v);
    }
    (memories, vectors)
}

fn bench_clustering(c: &mut Criterion) {
    let (memories, vectors) = pool(300, 64);
    c.bench_function("cluster_300_candidates", |b| {
        b.iter(|| cluster_candidates(&memories, &vectors, 0.85, 3))
    });
}

criterion_group!(benches, bench_clustering);
criterion_main!(benches);
