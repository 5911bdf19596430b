//! # Terrain Configuration
//!
//! TOML surface for a whole terrain session: the world section shared by all
//! layers, plus per-layer tunables.
//!
//! ```toml
//! [world]
//! width = 2000
//! height = 1200
//! seed = 42
//! chunk_size = 64
//!
//! [elevation]
//! mountain_intensity = 1.2
//! max_elevation = 3500.0
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{GenError, GenResult, WorldConfig};

/// Tunables of the continental elevation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationConfig {
    /// Frequency of the coastline noise, per cell.
    pub continent_noise_scale: f64,
    /// Multiplier on every mountain contribution.
    pub mountain_intensity: f64,
    /// Indicator depth of the continental shelf band below the coast.
    pub shelf_width: f64,
    /// Weight of coastline noise in the continent indicator.
    pub coastline_roughness: f64,
    /// Elevation separating land from water, in elevation units.
    pub sea_level: f64,
    /// Deepest ocean floor.
    pub min_elevation: f64,
    /// Highest peak.
    pub max_elevation: f64,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            continent_noise_scale: 0.003,
            mountain_intensity: 1.0,
            shelf_width: 0.3,
            coastline_roughness: 0.5,
            sea_level: 0.0,
            min_elevation: -4000.0,
            max_elevation: 3000.0,
        }
    }
}

impl ElevationConfig {
    /// Checks every tunable.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] naming the first offending field.
    pub fn validate(&self) -> GenResult<()> {
        let finite = [
            self.continent_noise_scale,
            self.mountain_intensity,
            self.shelf_width,
            self.coastline_roughness,
            self.sea_level,
            self.min_elevation,
            self.max_elevation,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(invalid("elevation parameters must be finite"));
        }
        if self.continent_noise_scale <= 0.0 {
            return Err(invalid("continent_noise_scale must be positive"));
        }
        if self.mountain_intensity < 0.0 {
            return Err(invalid("mountain_intensity must not be negative"));
        }
        if self.shelf_width <= 0.0 || self.shelf_width > 1.0 {
            return Err(invalid("shelf_width must be in (0, 1]"));
        }
        if self.coastline_roughness < 0.0 {
            return Err(invalid("coastline_roughness must not be negative"));
        }
        if !(self.min_elevation < 0.0 && self.max_elevation > 0.0) {
            return Err(invalid("min_elevation must be below 0 and max_elevation above 0"));
        }
        if !(self.min_elevation < self.sea_level && self.sea_level < self.max_elevation) {
            return Err(invalid("sea_level must lie between min_elevation and max_elevation"));
        }
        Ok(())
    }
}

/// Complete terrain session configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World extent, seed, chunking and cache.
    pub world: WorldConfig,
    /// Elevation layer tunables.
    pub elevation: ElevationConfig,
}

impl TerrainConfig {
    /// Parses a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] on malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> GenResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| GenError::Configuration(format!("malformed terrain config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`GenError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| GenError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            "Loaded terrain config from {}: {}x{} cells, seed {}",
            path.display(),
            config.world.width,
            config.world.height,
            config.world.seed
        );
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] if a value cannot be represented.
    pub fn to_toml_string(&self) -> GenResult<String> {
        toml::to_string(self)
            .map_err(|e| GenError::Configuration(format!("cannot serialize terrain config: {e}")))
    }

    /// Validates both sections.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] naming the first offending field.
    pub fn validate(&self) -> GenResult<()> {
        self.world.validate()?;
        self.elevation.validate()
    }
}

fn invalid(message: &str) -> GenError {
    GenError::Configuration(message.to_owned())
}
