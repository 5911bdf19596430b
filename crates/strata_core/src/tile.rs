//! # Field Tiles
//!
//! A dense, row-major buffer of one field's values for one chunk, plus the
//! halo cells around it.
//!
//! ## Layout
//!
//! ```text
//!   origin
//!     +---------------------------+
//!     | halo                      |
//!     |   +-------------------+   |
//!     |   | logical chunk     |   |
//!     |   | chunk_size cells  |   |
//!     |   +-------------------+   |
//!     |                           |
//!     +---------------------------+
//!        chunk_size + 2 * overlap
//! ```
//!
//! `get(lx, ly)` is the value at world cell `origin + (lx, ly)`. Tiles do not
//! know the world's extent; the producing layer writes the sentinel for cells
//! beyond the map edge.

use crate::coords::CellPos;
use crate::error::{GenError, GenResult};

/// Element type stored by a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 32-bit float scalar field (elevation, slope, temperature...).
    #[default]
    Float32,
    /// Small unsigned categories or masks (biome ids, water types...).
    UInt8,
}

impl ElementKind {
    /// Bytes per element.
    #[inline]
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::Float32 => 4,
            Self::UInt8 => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum TileBuffer {
    Float32(Vec<f32>),
    UInt8(Vec<u8>),
}

/// One field's values over a haloed chunk footprint.
///
/// Immutable once handed to the cache; shared as `Arc<FieldTile>`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldTile {
    width: usize,
    height: usize,
    origin: CellPos,
    buffer: TileBuffer,
}

impl FieldTile {
    /// Creates a zero-filled tile.
    #[must_use]
    pub fn new(width: usize, height: usize, kind: ElementKind, origin: CellPos) -> Self {
        Self::filled(width, height, kind, origin, 0.0)
    }

    /// Creates a tile with every cell set to `value`.
    #[must_use]
    pub fn filled(
        width: usize,
        height: usize,
        kind: ElementKind,
        origin: CellPos,
        value: f32,
    ) -> Self {
        let len = width * height;
        let buffer = match kind {
            ElementKind::Float32 => TileBuffer::Float32(vec![value; len]),
            ElementKind::UInt8 => TileBuffer::UInt8(vec![to_u8(value); len]),
        };
        Self {
            width,
            height,
            origin,
            buffer,
        }
    }

    /// Tile width in cells, halo included.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Tile height in cells, halo included.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// World position of local cell `(0, 0)`.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> CellPos {
        self.origin
    }

    /// Element type of the buffer.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self.buffer {
            TileBuffer::Float32(_) => ElementKind::Float32,
            TileBuffer::UInt8(_) => ElementKind::UInt8,
        }
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    /// Returns true for a zero-sized tile.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a cell by local index.
    ///
    /// # Errors
    ///
    /// [`GenError::OutOfRange`] if the index lies outside `[0, width) x [0, height)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> GenResult<f32> {
        let index = self.index(x as i64, y as i64)?;
        Ok(match &self.buffer {
            TileBuffer::Float32(values) => values[index],
            TileBuffer::UInt8(values) => f32::from(values[index]),
        })
    }

    /// Writes a cell by local index.
    ///
    /// `UInt8` tiles round and clamp the value into `0..=255`.
    ///
    /// # Errors
    ///
    /// [`GenError::OutOfRange`] if the index lies outside `[0, width) x [0, height)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) -> GenResult<()> {
        let index = self.index(x as i64, y as i64)?;
        match &mut self.buffer {
            TileBuffer::Float32(values) => values[index] = value,
            TileBuffer::UInt8(values) => values[index] = to_u8(value),
        }
        Ok(())
    }

    /// Reads a cell by world position.
    ///
    /// # Errors
    ///
    /// [`GenError::OutOfRange`] if the position is outside this tile's footprint.
    #[inline]
    pub fn get_world(&self, world_x: i64, world_y: i64) -> GenResult<f32> {
        let local_x = world_x - self.origin.x;
        let local_y = world_y - self.origin.y;
        let index = self.index(local_x, local_y)?;
        Ok(match &self.buffer {
            TileBuffer::Float32(values) => values[index],
            TileBuffer::UInt8(values) => f32::from(values[index]),
        })
    }

    /// Iterates all values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        let (floats, bytes) = match &self.buffer {
            TileBuffer::Float32(values) => (Some(values.iter().copied()), None),
            TileBuffer::UInt8(values) => (None, Some(values.iter().map(|&v| f32::from(v)))),
        };
        floats.into_iter().flatten().chain(bytes.into_iter().flatten())
    }

    /// Raw buffer bytes, native endianness, row-major.
    ///
    /// For export and rendering collaborators that upload tiles as-is.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buffer {
            TileBuffer::Float32(values) => bytemuck::cast_slice(values),
            TileBuffer::UInt8(values) => values,
        }
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> GenResult<usize> {
        let in_range = x >= 0
            && y >= 0
            && (x as u64) < self.width as u64
            && (y as u64) < self.height as u64;
        if !in_range {
            return Err(GenError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width + x as usize)
    }
}

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut tile = FieldTile::new(4, 3, ElementKind::Float32, CellPos::new(10, 20));
        tile.set(3, 2, 1.5).unwrap();
        assert_eq!(tile.get(3, 2).unwrap(), 1.5);
        assert_eq!(tile.get(0, 0).unwrap(), 0.0);
        assert_eq!(tile.len(), 12);
    }

    #[test]
    fn test_out_of_range() {
        let mut tile = FieldTile::new(4, 3, ElementKind::Float32, CellPos::default());
        assert!(matches!(tile.get(4, 0), Err(GenError::OutOfRange { x: 4, y: 0, .. })));
        assert!(matches!(tile.get(0, 3), Err(GenError::OutOfRange { .. })));
        assert!(tile.set(9, 9, 1.0).is_err());
    }

    #[test]
    fn test_world_reads_go_through_origin() {
        let mut tile = FieldTile::new(6, 6, ElementKind::Float32, CellPos::new(-2, -2));
        tile.set(2, 3, 7.0).unwrap();
        assert_eq!(tile.get_world(0, 1).unwrap(), 7.0);
        assert!(tile.get_world(-3, 0).is_err());
        assert!(tile.get_world(4, 4).is_err());
    }

    #[test]
    fn test_uint8_rounds_and_clamps() {
        let mut tile = FieldTile::new(3, 1, ElementKind::UInt8, CellPos::default());
        tile.set(0, 0, 2.6).unwrap();
        tile.set(1, 0, -4.0).unwrap();
        tile.set(2, 0, 900.0).unwrap();
        assert_eq!(tile.values().collect::<Vec<_>>(), vec![3.0, 0.0, 255.0]);
        assert_eq!(tile.kind(), ElementKind::UInt8);
        assert_eq!(tile.as_bytes(), &[3, 0, 255]);
    }

    #[test]
    fn test_filled_and_bytes() {
        let tile = FieldTile::filled(2, 2, ElementKind::Float32, CellPos::default(), -4000.0);
        assert!(tile.values().all(|v| v == -4000.0));
        assert_eq!(tile.as_bytes().len(), 4 * ElementKind::Float32.size_bytes());
        assert_eq!(&tile.as_bytes()[..4], &(-4000.0f32).to_ne_bytes());
    }
}
