//! # STRATA Core
//!
//! Deterministic, chunked generation of world-scale scalar fields.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and coordinates always produce the same bits
//! 2. **Chunked**: Fields are produced in fixed-size tiles with a halo
//! 3. **Seamless**: Halo cells equal the neighbouring chunk's cells
//! 4. **Composable**: Layers read other layers through the engine
//!
//! ## Core Components
//!
//! - `SeedStream`: Reproducible randomness per (seed, layer, chunk)
//! - `SimplexNoise`: 2D simplex, fbm and ridged noise
//! - `FieldTile`: Haloed, row-major buffer of one field for one chunk
//! - `Layer`: The generator contract
//! - `TileCache`: Bounded LRU memo of generated tiles
//! - `WorldEngine`: Layer registry and cache-checked dispatch
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{ChunkCoord, ElementKind, FieldTile, GenResult, Layer, WorldConfig, WorldEngine};
//!
//! struct Flat;
//!
//! impl Layer for Flat {
//!     fn id(&self) -> &str {
//!         "flat"
//!     }
//!
//!     fn generate_chunk(&self, engine: &WorldEngine, chunk: ChunkCoord, _lod: u8) -> GenResult<FieldTile> {
//!         let config = engine.config();
//!         let extent = config.tile_extent();
//!         Ok(FieldTile::filled(extent, extent, ElementKind::Float32, config.tile_origin(chunk), 1.0))
//!     }
//! }
//!
//! let engine = WorldEngine::builder(WorldConfig::new(256, 256, 7))
//!     .layer(Flat)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(engine.get_cell(10, 20, "flat").unwrap(), Some(1.0));
//! assert_eq!(engine.get_cell(256, 0, "flat").unwrap(), None);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod config;
pub mod coords;
pub mod engine;
pub mod error;
pub mod layer;
pub mod noise;
pub mod seed;
pub mod tile;

pub use cache::{CacheStats, TileCache};
pub use config::WorldConfig;
pub use coords::{CellPos, ChunkCoord};
pub use engine::{WorldEngine, WorldEngineBuilder};
pub use error::{GenError, GenResult};
pub use layer::{ChunkKey, Layer};
pub use noise::SimplexNoise;
pub use seed::{SeedStream, WorldSeed};
pub use tile::{ElementKind, FieldTile};
