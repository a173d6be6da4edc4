// Recall benchmarks — retrieval scoring over a populated store, and the
// eviction path of the bounded store. Uses the deterministic hash embedder
// so runs are comparable across machines.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;
use warrenmind::{
    EmbeddingClient, GameTime, HashEmbedding, MemoryConfig, MemoryRecord, MemoryStore,
    RetrievalConfig, RetrievalEngine,
};

const STORE_SIZE: usize = 1000;

fn populated_store(embedder: &HashEmbedding, rt: &tokio::runtime::Runtime) -> MemoryStore {
    let config = MemoryConfig {
        capacity: STORE_SIZE,
        ..MemoryConfig::default()
    };
    let mut store = MemoryStore::new(config, 24.0).unwrap();
    for i in 0..STORE_SIZE {
        let now = GameTime::from_secs(i as f64);
        let content = format!(
            "observation {}: corridor {} held {} near the {} wall",
            i,
            i % 37,
            ["water", "berries", "moss", "gravel", "another agent"][i % 5],
            ["north", "south", "east", "west"][i % 4],
        );
        let embedding = rt.block_on(embedder.embed(&content)).unwrap();
        let record = MemoryRecord::observation(content, 1.0 + (i % 10) as f32, now)
            .unwrap()
            .with_embedding(embedding);
        store.add(record, now).unwrap();
    }
    store
}

fn bench_retrieve(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let embedder = HashEmbedding::new(128);
    let mut store = populated_store(&embedder, &rt);
    let retrieval = RetrievalEngine::new(
        Arc::new(HashEmbedding::new(128)),
        RetrievalConfig::default(),
        Duration::from_secs(5),
    );
    let now = GameTime::from_hours(2.0);

    c.bench_function("retrieve_top10_of_1000", |b| {
        b.iter(|| {
            rt.block_on(retrieval.retrieve(
                black_box(&mut store),
                black_box("where was water near the north wall"),
                10,
                now,
            ))
        })
    });

    c.bench_function("retrieve_importance_only_top10_of_1000", |b| {
        b.iter(|| retrieval.retrieve_importance_only(black_box(&mut store), 10, now))
    });
}

fn bench_eviction(c: &mut Criterion) {
    c.bench_function("add_with_eviction_capacity_256", |b| {
        let config = MemoryConfig {
            capacity: 256,
            ..MemoryConfig::default()
        };
        let mut store = MemoryStore::new(config, 24.0).unwrap();
        let mut tick = 0u64;
        b.iter(|| {
            tick += 1;
            let now = GameTime::from_secs(tick as f64);
            let record =
                MemoryRecord::observation("filler event", 1.0 + (tick % 10) as f32, now).unwrap();
            store.add(black_box(record), now).unwrap();
        })
    });
}

criterion_group!(benches, bench_retrieve, bench_eviction);
criterion_main!(benches);
