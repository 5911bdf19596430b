//! # STRATA Terrain
//!
//! Continental elevation and the terrain layers derived from it, built on
//! the `strata_core` engine.
//!
//! ## Layers
//!
//! | id          | element | reads       |
//! |-------------|---------|-------------|
//! | `elevation` | f32     | -           |
//! | `slope`     | f32     | `elevation` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use strata_terrain::{build_engine, TerrainConfig};
//!
//! let config = TerrainConfig::from_toml_str("[world]\nwidth = 2000\nheight = 1200\nseed = 42").unwrap();
//! let engine = build_engine(&config).unwrap();
//!
//! let height = engine.get_cell(1000, 600, "elevation").unwrap();
//! assert!(height.is_some());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod elevation;
pub mod features;
pub mod slope;
pub mod stats;

pub use config::{ElevationConfig, TerrainConfig};
pub use elevation::ContinentalElevationLayer;
pub use features::{ContinentFeatures, ContinentSeed, MountainRange, SpineWaypoint, Valley};
pub use slope::SlopeLayer;
pub use stats::ElevationSummary;

use strata_core::{ChunkCoord, GenResult, WorldConfig, WorldEngine};

/// Builds an engine with every terrain layer registered in dependency order.
///
/// # Errors
///
/// [`GenError::Configuration`](strata_core::GenError::Configuration) for an
/// invalid configuration.
pub fn build_engine(config: &TerrainConfig) -> GenResult<WorldEngine> {
    config.validate()?;
    let elevation = ContinentalElevationLayer::new(&config.world, config.elevation.clone())?;
    let slope = SlopeLayer::new(&config.world)?;
    WorldEngine::builder(config.world.clone())
        .layer(elevation)
        .layer(slope)
        .build()
}

/// The four corner chunks and the centre chunk of the world.
#[must_use]
pub fn sample_chunks(world: &WorldConfig) -> Vec<ChunkCoord> {
    let (last_x, last_y) = (world.chunks_x() - 1, world.chunks_y() - 1);
    let mut chunks = vec![
        ChunkCoord::new(0, 0),
        ChunkCoord::new(last_x, 0),
        ChunkCoord::new(0, last_y),
        ChunkCoord::new(last_x, last_y),
        ChunkCoord::new(world.chunks_x() / 2, world.chunks_y() / 2),
    ];
    chunks.sort_by_key(|c| (c.y, c.x));
    chunks.dedup();
    chunks
}

/// Warms the cache with elevation and slope for the [`sample_chunks`].
///
/// Returns the number of slope tiles resident afterwards.
///
/// # Errors
///
/// Anything generation returns.
pub fn prime_terrain(engine: &WorldEngine, workers: usize) -> GenResult<usize> {
    let chunks = sample_chunks(engine.config());
    engine.prime(ContinentalElevationLayer::ID, &chunks, workers)?;
    engine.prime(SlopeLayer::ID, &chunks, workers)
}
