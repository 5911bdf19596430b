//! # Chunk and Cell Coordinates
//!
//! Plain coordinate types. The conversions between them depend on the
//! configured chunk size and live on [`WorldConfig`](crate::config::WorldConfig).

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not cells).
    pub x: i32,
    /// Y coordinate (in chunks, not cells).
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A world-space cell position.
///
/// Stored as `i64` so tile origins of far-away chunks never overflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellPos {
    /// World X (cells).
    pub x: i64,
    /// World Y (cells).
    pub y: i64,
}

impl CellPos {
    /// Creates a new cell position.
    #[inline]
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Offsets this position by a local tile index.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: usize, dy: usize) -> Self {
        Self {
            x: self.x + dx as i64,
            y: self.y + dy as i64,
        }
    }
}
