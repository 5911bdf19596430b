//! World statistics from a regular grid sample of the elevation layer.

use strata_core::{GenError, GenResult, WorldEngine};

use crate::elevation::ContinentalElevationLayer;

/// Elevation summary of a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElevationSummary {
    /// Number of cells sampled.
    pub samples: usize,
    /// Lowest sampled elevation.
    pub min: f64,
    /// Highest sampled elevation.
    pub max: f64,
    /// Mean sampled elevation.
    pub mean: f64,
    /// Fraction of samples above sea level, in `[0, 1]`.
    pub land_fraction: f64,
}

impl ElevationSummary {
    /// Samples `samples_per_axis`² cell centres spread evenly over the world.
    ///
    /// # Errors
    ///
    /// [`GenError::Configuration`] for zero samples, plus anything reading
    /// the elevation layer returns.
    pub fn sample(engine: &WorldEngine, samples_per_axis: u32, sea_level: f64) -> GenResult<Self> {
        if samples_per_axis == 0 {
            return Err(GenError::Configuration("need at least one sample per axis".to_owned()));
        }
        let config = engine.config();
        let n = f64::from(samples_per_axis);
        let (width, height) = (f64::from(config.width), f64::from(config.height));

        let mut summary = Self {
            samples: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            land_fraction: 0.0,
        };
        let mut sum = 0.0;
        let mut land = 0usize;

        for j in 0..samples_per_axis {
            let y = ((f64::from(j) + 0.5) * height / n) as i64;
            for i in 0..samples_per_axis {
                let x = ((f64::from(i) + 0.5) * width / n) as i64;
                let Some(value) = engine.get_cell(x, y, ContinentalElevationLayer::ID)? else {
                    continue;
                };
                let value = f64::from(value);
                summary.samples += 1;
                summary.min = summary.min.min(value);
                summary.max = summary.max.max(value);
                sum += value;
                if value > sea_level {
                    land += 1;
                }
            }
        }

        if summary.samples > 0 {
            summary.mean = sum / summary.samples as f64;
            summary.land_fraction = land as f64 / summary.samples as f64;
        }
        tracing::info!(
            "Elevation {:.0}..{:.0} (mean {:.1}), {:.1}% land over {} samples",
            summary.min,
            summary.max,
            summary.mean,
            summary.land_percent(),
            summary.samples
        );
        Ok(summary)
    }

    /// Land share in percent.
    #[must_use]
    pub fn land_percent(&self) -> f64 {
        self.land_fraction * 100.0
    }

    /// Water share in percent.
    #[must_use]
    pub fn water_percent(&self) -> f64 {
        100.0 - self.land_percent()
    }
}
