//! # Slope Layer
//!
//! Gradient magnitude of the elevation field, in elevation units per cell.
//!
//! Reads the elevation tile of the same chunk through the engine and takes
//! central differences. The halo makes every logical cell's neighbours
//! available; only the tile's outermost ring falls back to one-sided
//! differences. Neighbours beyond the world edge count as level with the
//! centre cell.

use strata_core::{
    ChunkCoord, ElementKind, FieldTile, GenError, GenResult, Layer, WorldConfig, WorldEngine,
};

use crate::elevation::ContinentalElevationLayer;

/// Slope derived from the elevation layer.
#[derive(Clone, Debug)]
pub struct SlopeLayer {
    source: String,
}

impl SlopeLayer {
    /// Registry id.
    pub const ID: &'static str = "slope";

    /// Creates a slope layer over the standard elevation layer.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] if chunks carry no halo.
    pub fn new(world: &WorldConfig) -> GenResult<Self> {
        Self::over(world, ContinentalElevationLayer::ID)
    }

    /// Creates a slope layer over any scalar layer.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] if chunks carry no halo.
    pub fn over(world: &WorldConfig, source: &str) -> GenResult<Self> {
        if world.chunk_overlap == 0 {
            return Err(GenError::Configuration(
                "slope layer needs chunk_overlap >= 1".to_owned(),
            ));
        }
        Ok(Self {
            source: source.to_owned(),
        })
    }

    /// Id of the layer the slope is taken of.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Layer for SlopeLayer {
    fn id(&self) -> &str {
        Self::ID
    }

    fn generate_chunk(&self, engine: &WorldEngine, chunk: ChunkCoord, lod: u8) -> GenResult<FieldTile> {
        let world = engine.config();
        let heights = engine.get_chunk(&self.source, chunk.x, chunk.y, lod)?;
        let (width, height) = (heights.width(), heights.height());
        let origin = heights.origin();
        let mut tile = FieldTile::new(width, height, ElementKind::Float32, origin);

        for ly in 0..height {
            for lx in 0..width {
                let cell = origin.offset(lx, ly);
                if !world.contains(cell.x, cell.y) {
                    continue;
                }
                let centre = heights.get(lx, ly)?;
                // Neighbour value, or None past the tile edge.
                let at = |dx: i64, dy: i64| -> GenResult<Option<f32>> {
                    let (nx, ny) = (lx as i64 + dx, ly as i64 + dy);
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        return Ok(None);
                    }
                    if !world.contains(cell.x + dx, cell.y + dy) {
                        return Ok(Some(centre));
                    }
                    heights.get(nx as usize, ny as usize).map(Some)
                };
                let gx = difference(at(-1, 0)?, centre, at(1, 0)?);
                let gy = difference(at(0, -1)?, centre, at(0, 1)?);
                tile.set(lx, ly, gx.hypot(gy))?;
            }
        }
        Ok(tile)
    }
}

/// Central difference, one-sided when a neighbour is missing.
fn difference(before: Option<f32>, centre: f32, after: Option<f32>) -> f32 {
    match (before, after) {
        (Some(b), Some(a)) => (a - b) * 0.5,
        (None, Some(a)) => a - centre,
        (Some(b), None) => centre - b,
        (None, None) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::CellPos;

    /// Plane rising 3 units per cell in X and 4 in Y.
    struct Ramp;

    impl Layer for Ramp {
        fn id(&self) -> &str {
            "ramp"
        }

        fn generate_chunk(&self, engine: &WorldEngine, chunk: ChunkCoord, _lod: u8) -> GenResult<FieldTile> {
            let world = engine.config();
            let extent = world.tile_extent();
            let origin = world.tile_origin(chunk);
            let mut tile = FieldTile::new(extent, extent, ElementKind::Float32, origin);
            for ly in 0..extent {
                for lx in 0..extent {
                    let CellPos { x, y } = origin.offset(lx, ly);
                    tile.set(lx, ly, (3 * x + 4 * y) as f32)?;
                }
            }
            Ok(tile)
        }
    }

    fn engine() -> WorldEngine {
        let world = WorldConfig::new(40, 40, 1).with_chunking(16, 1);
        WorldEngine::builder(world.clone())
            .layer(Ramp)
            .layer(SlopeLayer::over(&world, "ramp").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_plane_has_constant_slope() {
        let engine = engine();
        for &(x, y) in &[(1_i64, 1_i64), (15, 16), (16, 15), (30, 7)] {
            assert_eq!(engine.get_cell(x, y, "slope").unwrap(), Some(5.0), "cell ({x}, {y})");
        }
    }

    #[test]
    fn test_world_edge_is_level() {
        let engine = engine();
        // At x = 0 the west neighbour is outside: gx = (3 - 0) / 2.
        let expected = 1.5_f32.hypot(4.0);
        assert_eq!(engine.get_cell(0, 5, "slope").unwrap(), Some(expected));
        // Outside the world the slope tile holds zero.
        let tile = engine.get_chunk("slope", 0, 0, 0).unwrap();
        assert_eq!(tile.get_world(-1, -1).unwrap(), 0.0);
    }

    #[test]
    fn test_requires_halo() {
        let world = WorldConfig::new(40, 40, 1).with_chunking(16, 0);
        assert!(matches!(SlopeLayer::new(&world), Err(GenError::Configuration(_))));
    }

    #[test]
    fn test_difference() {
        assert_eq!(difference(Some(1.0), 2.0, Some(5.0)), 2.0);
        assert_eq!(difference(None, 2.0, Some(5.0)), 3.0);
        assert_eq!(difference(Some(1.0), 2.0, None), 1.0);
        assert_eq!(difference(None, 2.0, None), 0.0);
    }
}
