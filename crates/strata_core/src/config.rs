//! # World Configuration
//!
//! The immutable record every generation session is built from, and the
//! chunk <-> world coordinate mapping.
//!
//! ## Coordinate Mapping
//!
//! Every conversion between world cells, chunks and tile-local indices goes
//! through this module. Layers and callers never redo the arithmetic, so
//! there is exactly one place where a seam could be introduced.
//!
//! ```text
//! tile origin  = chunk * chunk_size - overlap
//! tile extent  = chunk_size + 2 * overlap
//! local index  = (world mod chunk_size) + overlap
//! ```

use serde::{Deserialize, Serialize};

use crate::coords::{CellPos, ChunkCoord};
use crate::error::{GenError, GenResult};

/// World-level generation parameters.
///
/// Fixed for the lifetime of a [`WorldEngine`](crate::engine::WorldEngine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width in cells.
    pub width: u32,
    /// World height in cells.
    pub height: u32,
    /// Master seed.
    pub seed: u64,
    /// Logical chunk edge length in cells.
    pub chunk_size: u32,
    /// Halo width in cells, generated on every side of a chunk.
    pub chunk_overlap: u32,
    /// Maximum number of tiles kept by the cache.
    pub cache_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 22_000,
            height: 13_000,
            seed: 0x5EED,
            chunk_size: 128,
            chunk_overlap: 2,
            cache_capacity: 1024,
        }
    }
}

impl WorldConfig {
    /// Creates a configuration with the given dimensions and seed, defaults elsewhere.
    #[must_use]
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            ..Self::default()
        }
    }

    /// Sets the chunk size and halo width.
    #[must_use]
    pub const fn with_chunking(mut self, chunk_size: u32, chunk_overlap: u32) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Sets the tile cache capacity.
    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Checks that every parameter is within a sane range.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Configuration`] naming the first offending field.
    pub fn validate(&self) -> GenResult<()> {
        let max = i32::MAX as u32;
        if self.width == 0 || self.width > max {
            return Err(GenError::Configuration(format!(
                "world width must be in 1..={max}, got {}",
                self.width
            )));
        }
        if self.height == 0 || self.height > max {
            return Err(GenError::Configuration(format!(
                "world height must be in 1..={max}, got {}",
                self.height
            )));
        }
        if self.chunk_size == 0 || self.chunk_size > 1 << 14 {
            return Err(GenError::Configuration(format!(
                "chunk size must be in 1..=16384, got {}",
                self.chunk_size
            )));
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(GenError::Configuration(format!(
                "chunk overlap {} exceeds chunk size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.cache_capacity == 0 {
            return Err(GenError::Configuration(
                "cache capacity must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// Edge length of every tile, halo included.
    #[inline]
    #[must_use]
    pub const fn tile_extent(&self) -> usize {
        (self.chunk_size + 2 * self.chunk_overlap) as usize
    }

    /// Returns true if the world cell lies inside `[0, width) x [0, height)`.
    #[inline]
    #[must_use]
    pub fn contains(&self, world_x: i64, world_y: i64) -> bool {
        world_x >= 0
            && world_y >= 0
            && world_x < i64::from(self.width)
            && world_y < i64::from(self.height)
    }

    /// Returns the chunk owning a world cell.
    #[inline]
    #[must_use]
    pub fn chunk_of(&self, world_x: i64, world_y: i64) -> ChunkCoord {
        let size = i64::from(self.chunk_size);
        ChunkCoord::new(
            saturate_i32(world_x.div_euclid(size)),
            saturate_i32(world_y.div_euclid(size)),
        )
    }

    /// Returns the world position of a chunk tile's top-left cell (halo included).
    #[inline]
    #[must_use]
    pub fn tile_origin(&self, chunk: ChunkCoord) -> CellPos {
        let size = i64::from(self.chunk_size);
        let overlap = i64::from(self.chunk_overlap);
        CellPos::new(
            i64::from(chunk.x) * size - overlap,
            i64::from(chunk.y) * size - overlap,
        )
    }

    /// Maps a world cell to its owning chunk and the local index inside that chunk's tile.
    #[must_use]
    pub fn local_index(&self, world_x: i64, world_y: i64) -> (ChunkCoord, usize, usize) {
        let size = i64::from(self.chunk_size);
        let overlap = i64::from(self.chunk_overlap);
        let local_x = (world_x.rem_euclid(size) + overlap) as usize;
        let local_y = (world_y.rem_euclid(size) + overlap) as usize;
        (self.chunk_of(world_x, world_y), local_x, local_y)
    }

    /// Number of chunk columns needed to cover the world.
    #[must_use]
    pub fn chunks_x(&self) -> i32 {
        saturate_i32(i64::from(self.width.div_ceil(self.chunk_size.max(1))))
    }

    /// Number of chunk rows needed to cover the world.
    #[must_use]
    pub fn chunks_y(&self) -> i32 {
        saturate_i32(i64::from(self.height.div_ceil(self.chunk_size.max(1))))
    }
}

#[inline]
fn saturate_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
