//! Benchmark for elevation chunk generation.
//!
//! TARGET: one 128x128 chunk (plus halo) in under 10ms
//!
//! Run with: cargo bench --package strata_terrain --bench chunk_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_core::ChunkCoord;
use strata_terrain::{build_engine, ContinentalElevationLayer, TerrainConfig};

fn config() -> TerrainConfig {
    let mut config = TerrainConfig::default();
    config.world.width = 4096;
    config.world.height = 4096;
    config.world.seed = 42;
    config
}

fn benchmark_elevation_cell(c: &mut Criterion) {
    let config = config();
    let layer = ContinentalElevationLayer::new(&config.world, config.elevation.clone()).unwrap();

    c.bench_function("elevation_single_cell", |b| {
        let mut x = 0i64;
        b.iter(|| {
            x = (x + 7) % 4096;
            black_box(layer.elevation_at(black_box(x), black_box(2048)))
        });
    });
}

fn benchmark_single_chunk(c: &mut Criterion) {
    let engine = build_engine(&config()).unwrap();

    c.bench_function("elevation_chunk_generation", |b| {
        b.iter(|| {
            // Evict so every iteration generates.
            engine.evict("elevation", 16, 16, 0);
            black_box(engine.get_chunk("elevation", 16, 16, 0).unwrap())
        });
    });
}

fn benchmark_parallel_prime(c: &mut Criterion) {
    let chunks: Vec<ChunkCoord> = (0..8).flat_map(|x| (0..8).map(move |y| ChunkCoord::new(x, y))).collect();

    let mut group = c.benchmark_group("prime");
    group.sample_size(10);
    group.throughput(Throughput::Elements(chunks.len() as u64));

    for workers in [1usize, 4] {
        group.bench_function(format!("8x8_chunks_{workers}_workers"), |b| {
            b.iter(|| {
                let engine = build_engine(&config()).unwrap();
                black_box(engine.prime("slope", &chunks, workers).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_elevation_cell,
    benchmark_single_chunk,
    benchmark_parallel_prime
);
criterion_main!(benches);
