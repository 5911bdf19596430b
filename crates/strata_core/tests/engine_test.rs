//! # Engine Integration Tests
//!
//! Determinism, cache transparency and concurrency of the public engine API,
//! driven by a small noise layer.

use std::sync::Arc;
use std::thread;

use strata_core::{
    ChunkCoord, ElementKind, FieldTile, GenError, GenResult, Layer, SimplexNoise, WorldConfig,
    WorldEngine,
};

/// Fbm noise scaled to roughly [-100, 100].
struct NoiseLayer {
    noise: SimplexNoise,
}

impl NoiseLayer {
    fn new(seed: u64) -> Self {
        let mut stream = strata_core::SeedStream::derive(seed, "noise", 0, 0);
        Self {
            noise: SimplexNoise::new(&mut stream),
        }
    }
}

impl Layer for NoiseLayer {
    fn id(&self) -> &str {
        "noise"
    }

    fn generate_chunk(&self, engine: &WorldEngine, chunk: ChunkCoord, _lod: u8) -> GenResult<FieldTile> {
        let config = engine.config();
        let extent = config.tile_extent();
        let origin = config.tile_origin(chunk);
        let mut tile = FieldTile::new(extent, extent, ElementKind::Float32, origin);
        for ly in 0..extent {
            for lx in 0..extent {
                let cell = origin.offset(lx, ly);
                let value = self.noise.fbm(cell.x as f64 * 0.01, cell.y as f64 * 0.01, 4, 0.5, 2.0);
                tile.set(lx, ly, (value * 100.0) as f32)?;
            }
        }
        Ok(tile)
    }
}

/// Land mask of the noise layer: 1 above zero, 0 below.
struct MaskLayer;

impl Layer for MaskLayer {
    fn id(&self) -> &str {
        "mask"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::UInt8
    }

    fn generate_chunk(&self, engine: &WorldEngine, chunk: ChunkCoord, lod: u8) -> GenResult<FieldTile> {
        let source = engine.get_chunk("noise", chunk.x, chunk.y, lod)?;
        let mut tile = FieldTile::new(source.width(), source.height(), self.element_kind(), source.origin());
        for ly in 0..source.height() {
            for lx in 0..source.width() {
                let land = if source.get(lx, ly)? > 0.0 { 1.0 } else { 0.0 };
                tile.set(lx, ly, land)?;
            }
        }
        Ok(tile)
    }
}

fn engine(seed: u64, cache_capacity: usize) -> WorldEngine {
    let config = WorldConfig::new(512, 384, seed)
        .with_chunking(32, 2)
        .with_cache_capacity(cache_capacity);
    WorldEngine::builder(config)
        .layer(NoiseLayer::new(seed))
        .layer(MaskLayer)
        .build()
        .expect("valid engine")
}

fn sample_cells() -> Vec<(i64, i64)> {
    (0..40).map(|i| ((i * 97) % 512, (i * 61) % 384)).collect()
}

#[test]
fn test_access_order_does_not_matter() {
    let forward = engine(42, 256);
    let backward = engine(42, 256);

    let cells = sample_cells();
    let a: Vec<_> = cells.iter().map(|&(x, y)| forward.get_cell(x, y, "noise").unwrap()).collect();
    let mut b: Vec<_> = cells.iter().rev().map(|&(x, y)| backward.get_cell(x, y, "noise").unwrap()).collect();
    b.reverse();

    assert_eq!(a, b);
}

#[test]
fn test_tiny_cache_gives_same_values() {
    let roomy = engine(7, 512);
    let cramped = engine(7, 1);

    for &(x, y) in &sample_cells() {
        assert_eq!(
            roomy.get_cell(x, y, "mask").unwrap(),
            cramped.get_cell(x, y, "mask").unwrap(),
            "cell ({x}, {y})"
        );
    }
    assert!(cramped.cache_stats().evictions > 0);
    assert_eq!(cramped.cache_stats().entries, 1);
}

#[test]
fn test_different_seeds_differ() {
    let a = engine(1, 64);
    let b = engine(2, 64);
    let differs = sample_cells()
        .iter()
        .any(|&(x, y)| a.get_cell(x, y, "noise").unwrap() != b.get_cell(x, y, "noise").unwrap());
    assert!(differs);
}

#[test]
fn test_halo_matches_neighbour() {
    let engine = engine(42, 64);
    let config = engine.config().clone();
    let overlap = config.chunk_overlap as usize;
    let size = config.chunk_size as usize;

    let left = engine.get_chunk("noise", 3, 2, 0).unwrap();
    let right = engine.get_chunk("noise", 4, 2, 0).unwrap();
    for ly in 0..left.height() {
        // Left tile's right halo == right tile's first logical columns.
        for k in 0..overlap {
            assert_eq!(left.get(overlap + size + k, ly).unwrap(), right.get(overlap + k, ly).unwrap());
        }
    }
}

#[test]
fn test_mask_is_categorical() {
    let engine = engine(42, 64);
    let tile = engine.get_chunk("mask", 0, 0, 0).unwrap();
    assert_eq!(tile.kind(), ElementKind::UInt8);
    assert!(tile.values().all(|v| v == 0.0 || v == 1.0));
    assert_eq!(tile.as_bytes().len(), tile.len());
}

#[test]
fn test_concurrent_readers_agree() {
    let engine = Arc::new(engine(42, 32));
    let cells = sample_cells();
    let expected: Vec<_> = {
        let reference = self::engine(42, 256);
        cells.iter().map(|&(x, y)| reference.get_cell(x, y, "mask").unwrap()).collect()
    };

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let cells = cells.clone();
            thread::spawn(move || {
                let mut out = vec![None; cells.len()];
                // Each thread walks the cells starting at a different offset.
                for step in 0..cells.len() {
                    let i = (step + t * 7) % cells.len();
                    let (x, y) = cells[i];
                    out[i] = engine.get_cell(x, y, "mask").unwrap();
                }
                out
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_prime_then_read() {
    let engine = engine(42, 512);
    let chunks: Vec<_> = (0..engine.config().chunks_x())
        .flat_map(|x| (0..engine.config().chunks_y()).map(move |y| ChunkCoord::new(x, y)))
        .collect();
    let resident = engine.prime("mask", &chunks, 3).unwrap();
    assert_eq!(resident, chunks.len());

    let misses_before = engine.cache_stats().misses;
    for &(x, y) in &sample_cells() {
        assert!(engine.get_cell(x, y, "mask").unwrap().is_some());
    }
    assert_eq!(engine.cache_stats().misses, misses_before, "primed reads must all hit");
}

#[test]
fn test_errors_surface() {
    let engine = engine(42, 64);
    assert!(matches!(engine.get_cell(0, 0, "rivers"), Err(GenError::UnknownLayer(_))));
    assert_eq!(engine.get_cell(512, 0, "noise").unwrap(), None);
    assert_eq!(engine.get_cell(0, 384, "noise").unwrap(), None);

    let tile = engine.get_chunk("noise", 0, 0, 0).unwrap();
    assert!(matches!(tile.get(tile.width(), 0), Err(GenError::OutOfRange { .. })));
}
