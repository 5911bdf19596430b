//! # Layer Contract
//!
//! A layer is a named generator of one field, produced chunk by chunk.
//!
//! ## Rules for implementors
//!
//! - Output depends only on the world config, the layer's own construction
//!   parameters, the chunk coordinate and LOD, and tiles of *other* layers
//!   fetched through the engine.
//! - A layer never requests its own id. The engine fails such a request with
//!   [`GenError::CyclicDependency`](crate::error::GenError::CyclicDependency).
//! - State is fixed at construction. `generate_chunk` takes `&self` and may be
//!   called concurrently from several threads.
//! - The returned tile is `chunk_size + 2 * overlap` cells on each axis and
//!   starts at [`WorldConfig::tile_origin`](crate::config::WorldConfig::tile_origin).

use std::sync::Arc;

use crate::coords::ChunkCoord;
use crate::engine::WorldEngine;
use crate::error::GenResult;
use crate::tile::{ElementKind, FieldTile};

/// A pluggable field generator.
pub trait Layer: Send + Sync {
    /// Unique registry id.
    fn id(&self) -> &str;

    /// Element type of produced tiles.
    fn element_kind(&self) -> ElementKind {
        ElementKind::Float32
    }

    /// Produces the haloed tile for one chunk.
    ///
    /// # Errors
    ///
    /// Any error from reading dependency layers, or a layer-specific failure.
    fn generate_chunk(
        &self,
        engine: &WorldEngine,
        chunk: ChunkCoord,
        lod: u8,
    ) -> GenResult<FieldTile>;
}

/// Cache key for one generated tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    /// Layer id.
    pub layer: Arc<str>,
    /// Chunk X.
    pub chunk_x: i32,
    /// Chunk Y.
    pub chunk_y: i32,
    /// Level of detail. 0 is full resolution.
    pub lod: u8,
}

impl ChunkKey {
    /// Creates a key.
    #[must_use]
    pub fn new(layer: impl Into<Arc<str>>, chunk_x: i32, chunk_y: i32, lod: u8) -> Self {
        Self {
            layer: layer.into(),
            chunk_x,
            chunk_y,
            lod,
        }
    }

    /// The chunk coordinate part of the key.
    #[inline]
    #[must_use]
    pub const fn chunk(&self) -> ChunkCoord {
        ChunkCoord::new(self.chunk_x, self.chunk_y)
    }
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@({}, {})/lod{}",
            self.layer, self.chunk_x, self.chunk_y, self.lod
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_equality_covers_all_fields() {
        let base = ChunkKey::new("elevation", 1, 2, 0);
        assert_eq!(base, ChunkKey::new("elevation", 1, 2, 0));
        assert_ne!(base, ChunkKey::new("slope", 1, 2, 0));
        assert_ne!(base, ChunkKey::new("elevation", 2, 1, 0));
        assert_ne!(base, ChunkKey::new("elevation", 1, 2, 1));

        let set: HashSet<_> = [base.clone(), ChunkKey::new("elevation", 1, 2, 0)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ChunkKey::new("slope", -3, 4, 2).to_string(), "slope@(-3, 4)/lod2");
        assert_eq!(ChunkKey::new("slope", -3, 4, 2).chunk(), ChunkCoord::new(-3, 4));
    }
}
