//! # Continental Elevation Layer
//!
//! Land and sea elevation for the whole world, in elevation units
//! (nominally metres), within `[min_elevation, max_elevation]`.
//!
//! ## Pipeline (per cell)
//!
//! ```text
//! continent indicator  metaballs + coast noise + domain warp, soft threshold
//!         |
//! base elevation       coastal plains / hills / highlands by indicator
//!         |
//! mountains, valleys   spines, clusters (max), basins (min multiplier)
//!         |
//! detail, coast        ocean floor / land detail, shelf, beach, cliffs
//!         |
//! range mapping        normalized value -> [min_elevation, max_elevation]
//! ```
//!
//! All noise comes from one table seeded by the layer-scoped stream
//! `(seed, "elevation", 0, 0)`. Every value is a pure function of the world
//! cell, so a halo cell always equals the neighbouring chunk's cell.

use strata_core::{
    ChunkCoord, ElementKind, FieldTile, GenResult, Layer, SeedStream, SimplexNoise, WorldConfig,
    WorldEngine,
};

use crate::config::ElevationConfig;
use crate::features::{distance_to_segment, ContinentFeatures, MountainRange};

/// Indicator value where land starts.
const COAST_THRESHOLD: f64 = 0.5;
/// Below this indicator a cell is mapped as open ocean.
const DEEP_OCEAN_INDICATOR: f64 = 0.01;
/// Coastal distance estimate per unit of indicator.
const COASTAL_DISTANCE_SCALE: f64 = 200_000.0;

/// The continental elevation field.
#[derive(Debug)]
pub struct ContinentalElevationLayer {
    config: ElevationConfig,
    width: u32,
    height: u32,
    features: ContinentFeatures,
    noise: SimplexNoise,
}

impl ContinentalElevationLayer {
    /// Registry id.
    pub const ID: &'static str = "elevation";

    /// Places the continent features and seeds the noise for `world`.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`](strata_core::GenError::Configuration) if
    /// either configuration is invalid.
    pub fn new(world: &WorldConfig, config: ElevationConfig) -> GenResult<Self> {
        world.validate()?;
        config.validate()?;

        let features = ContinentFeatures::generate(world.seed, world.width, world.height);
        let noise = SimplexNoise::new(&mut SeedStream::derive(world.seed, Self::ID, 0, 0));
        tracing::debug!(
            "Placed {} continent seeds, {} mountain ranges, {} valleys",
            features.seeds.len(),
            features.ranges.len(),
            features.valleys.len()
        );

        Ok(Self {
            config,
            width: world.width,
            height: world.height,
            features,
            noise,
        })
    }

    /// Layer tunables.
    #[must_use]
    pub const fn config(&self) -> &ElevationConfig {
        &self.config
    }

    /// Large-scale features of this world.
    #[must_use]
    pub const fn features(&self) -> &ContinentFeatures {
        &self.features
    }

    /// Returns true if `elevation` is above sea level.
    #[must_use]
    pub fn is_land(&self, elevation: f64) -> bool {
        elevation > self.config.sea_level
    }

    /// Continent indicator in `[-1, 1]`: positive on land, negative at sea.
    #[must_use]
    pub fn continent_indicator(&self, x: f64, y: f64) -> f64 {
        let influence: f64 = self
            .features
            .seeds
            .iter()
            .map(|seed| {
                let reach = seed.radius * 2.0;
                let distance = (x - seed.x).hypot(y - seed.y);
                if distance < reach {
                    let falloff = 1.0 - distance / reach;
                    falloff * falloff * seed.strength
                } else {
                    0.0
                }
            })
            .sum();

        let scale = self.config.continent_noise_scale;
        let coast = self.noise.fbm(x * scale, y * scale, 5, 0.6, 2.2);

        let warp_scale = 0.001;
        let warp_x = self.noise.fbm(x * warp_scale, y * warp_scale, 2, 0.5, 2.0) * 100.0;
        let warp_y = self
            .noise
            .fbm(x * warp_scale + 1000.0, y * warp_scale + 1000.0, 2, 0.5, 2.0)
            * 100.0;
        let warped = self
            .noise
            .fbm((x + warp_x) * scale * 2.0, (y + warp_y) * scale * 2.0, 3, 0.5, 2.0);

        let value = influence + (coast * 0.3 + warped * 0.2) * self.config.coastline_roughness;
        soft_threshold(value).clamp(-1.0, 1.0)
    }

    /// Final elevation of a world cell. Cells outside the world are `min_elevation`.
    #[must_use]
    pub fn elevation_at(&self, world_x: i64, world_y: i64) -> f64 {
        let inside = world_x >= 0
            && world_y >= 0
            && world_x < i64::from(self.width)
            && world_y < i64::from(self.height);
        if !inside {
            return self.config.min_elevation;
        }

        let (x, y) = (world_x as f64, world_y as f64);
        let indicator = self.continent_indicator(x, y);

        let base = self.base_elevation(x, y, indicator);
        let mountains = self.mountain_height(x, y);
        let valleys = self.valley_multiplier(x, y);

        let mut elevation = base * valleys + mountains;
        elevation = self.add_detail(x, y, elevation, indicator);
        elevation = self.coastal_effects(elevation, indicator);
        map_to_range(&self.config, indicator, elevation)
    }

    fn base_elevation(&self, x: f64, y: f64, indicator: f64) -> f64 {
        if indicator <= 0.0 {
            return indicator;
        }
        // Crude estimate; reproduced exactly because it shapes every coast.
        let coastal_distance = (indicator * COASTAL_DISTANCE_SCALE).max(0.0);
        let banded = if coastal_distance < 50_000.0 {
            coastal_distance / 50_000.0 * 0.02
        } else if coastal_distance < 150_000.0 {
            0.02 + (coastal_distance - 50_000.0) / 100_000.0 * 0.08
        } else {
            0.1 + (coastal_distance - 150_000.0) / 200_000.0 * 0.1
        };
        let broad = self.noise.fbm(x * 0.0005, y * 0.0005, 3, 0.5, 2.0);
        (banded + broad * 0.05).max(0.0)
    }

    fn mountain_height(&self, x: f64, y: f64) -> f64 {
        let mut height = 0.0_f64;
        for range in &self.features.ranges {
            match range {
                MountainRange::Spine {
                    waypoints,
                    width,
                    height: peak,
                } => {
                    let distance = waypoints
                        .windows(2)
                        .map(|pair| distance_to_segment(x, y, (pair[0].x, pair[0].y), (pair[1].x, pair[1].y)))
                        .fold(f64::INFINITY, f64::min);
                    if distance < *width {
                        let profile = (1.0 - distance / width).powf(0.7);
                        let ridge = self.noise.ridged(x * 0.002, y * 0.002, 4, 0.5, 2.3);
                        height = height.max(profile * peak * (0.7 + ridge * 0.3));
                    }
                }
                MountainRange::Cluster {
                    x: cx,
                    y: cy,
                    radius,
                    height: peak,
                } => {
                    let distance = (x - cx).hypot(y - cy);
                    if distance < *radius {
                        let profile = (1.0 - distance / radius).powf(1.5);
                        let texture = self.noise.fbm(x * 0.003, y * 0.003, 3, 0.5, 2.0);
                        height = height.max(profile * peak * (0.5 + texture * 0.5));
                    }
                }
            }
        }
        height * self.config.mountain_intensity
    }

    fn valley_multiplier(&self, x: f64, y: f64) -> f64 {
        self.features
            .valleys
            .iter()
            .filter_map(|valley| {
                let distance = (x - valley.x).hypot(y - valley.y);
                (distance < valley.radius).then(|| {
                    let influence = 1.0 - distance / valley.radius;
                    1.0 - influence * influence * valley.depth
                })
            })
            .fold(1.0, f64::min)
    }

    fn add_detail(&self, x: f64, y: f64, elevation: f64, indicator: f64) -> f64 {
        if indicator <= 0.0 {
            let floor = self.noise.fbm(x * 0.002, y * 0.002, 3, 0.5, 2.0);
            return elevation + floor * 0.02;
        }
        let amplitude = if elevation > 0.5 {
            0.2
        } else if elevation > 0.2 {
            0.15
        } else {
            0.1
        };
        let fine = self.noise.fbm(x * 0.01, y * 0.01, 4, 0.5, 2.0);
        let medium = self.noise.fbm(x * 0.003, y * 0.003, 3, 0.5, 2.0);
        elevation + (fine * 0.7 + medium * 0.3) * amplitude
    }

    fn coastal_effects(&self, mut elevation: f64, indicator: f64) -> f64 {
        // Shelf
        if indicator < 0.0 && indicator > -self.config.shelf_width {
            elevation = indicator * 0.1;
        }
        // Beach
        if indicator > 0.0 && indicator < 0.1 && elevation < 0.01 {
            elevation = 0.001;
        }
        // Cliffs
        if indicator > 0.0 && indicator < 0.2 && elevation > 0.3 {
            elevation *= 1.2;
        }
        elevation
    }
}

impl Layer for ContinentalElevationLayer {
    fn id(&self) -> &str {
        Self::ID
    }

    fn generate_chunk(&self, engine: &WorldEngine, chunk: ChunkCoord, _lod: u8) -> GenResult<FieldTile> {
        let world = engine.config();
        let extent = world.tile_extent();
        let origin = world.tile_origin(chunk);
        let mut tile = FieldTile::new(extent, extent, ElementKind::Float32, origin);

        for ly in 0..extent {
            for lx in 0..extent {
                let cell = origin.offset(lx, ly);
                tile.set(lx, ly, self.elevation_at(cell.x, cell.y) as f32)?;
            }
        }
        Ok(tile)
    }
}

/// Sharp but smooth transition around the coast threshold.
fn soft_threshold(value: f64) -> f64 {
    if value > COAST_THRESHOLD {
        1.0 - (-(value - COAST_THRESHOLD) * 3.0).exp()
    } else {
        -(-(COAST_THRESHOLD - value) * 3.0).exp()
    }
}

/// Maps a normalized elevation to elevation units.
///
/// Open ocean (`indicator < 0.01`) rises from `min_elevation` at indicator 0
/// and is clamped to `min_elevation` below it.
fn map_to_range(config: &ElevationConfig, indicator: f64, elevation: f64) -> f64 {
    let mapped = if indicator < DEEP_OCEAN_INDICATOR {
        config.min_elevation + indicator * 10.0 * config.min_elevation.abs()
    } else if elevation < 0.0 {
        elevation * config.min_elevation.abs() * 0.1
    } else {
        elevation * config.max_elevation
    };
    mapped.clamp(config.min_elevation, config.max_elevation)
}
