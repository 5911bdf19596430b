//! # Continent Features
//!
//! The large-scale skeleton of a world: the blobs that merge into a
//! continent, the mountain ranges on it and the basins cut into it.
//!
//! Features are drawn once per world from the `"continent-features"` stream
//! at chunk `(0, 0)`, so every chunk sees the same set. The draw order below
//! is part of the world format; changing it changes every world.

use std::f64::consts::TAU;

use strata_core::SeedStream;

/// Seed stream id for feature placement.
pub const FEATURE_STREAM: &str = "continent-features";

const SECONDARY_BLOBS: usize = 3;
const SPINE_WAYPOINTS: usize = 8;
const CLUSTERS: usize = 3;
const VALLEYS: usize = 3;

/// A metaball that merges with its neighbours into land.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContinentSeed {
    /// Centre X (cells).
    pub x: f64,
    /// Centre Y (cells).
    pub y: f64,
    /// Influence reaches zero at twice this distance.
    pub radius: f64,
    /// Peak influence.
    pub strength: f64,
}

/// One point of a mountain spine polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpineWaypoint {
    /// X (cells).
    pub x: f64,
    /// Y (cells).
    pub y: f64,
    /// Local width hint. Not used by the height profile.
    pub width: f64,
}

/// A mountain range.
#[derive(Clone, Debug, PartialEq)]
pub enum MountainRange {
    /// A ridge following a polyline.
    Spine {
        /// Polyline, north to south.
        waypoints: Vec<SpineWaypoint>,
        /// Distance from the ridge line at which the range ends.
        width: f64,
        /// Peak height, as a fraction of the land range.
        height: f64,
    },
    /// An isolated, roughly circular massif.
    Cluster {
        /// Centre X (cells).
        x: f64,
        /// Centre Y (cells).
        y: f64,
        /// Extent.
        radius: f64,
        /// Peak height, as a fraction of the land range.
        height: f64,
    },
}

/// A circular basin that scales base elevation down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Valley {
    /// Centre X (cells).
    pub x: f64,
    /// Centre Y (cells).
    pub y: f64,
    /// Extent.
    pub radius: f64,
    /// Depression at the centre, in `[0, 1]`.
    pub depth: f64,
}

/// Every large-scale feature of one world.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinentFeatures {
    /// Primary blob first, then the secondaries.
    pub seeds: Vec<ContinentSeed>,
    /// Western spine, eastern spine, then clusters.
    pub ranges: Vec<MountainRange>,
    /// Basins.
    pub valleys: Vec<Valley>,
}

impl ContinentFeatures {
    /// Places all features for a `width` x `height` world.
    #[must_use]
    pub fn generate(seed: u64, width: u32, height: u32) -> Self {
        let mut rng = SeedStream::derive(seed, FEATURE_STREAM, 0, 0);
        let w = f64::from(width);
        let h = f64::from(height);

        let mut seeds = Vec::with_capacity(1 + SECONDARY_BLOBS);
        seeds.push(ContinentSeed {
            x: w * 0.5 + rng.uniform(-w * 0.1, w * 0.1),
            y: h * 0.5 + rng.uniform(-h * 0.1, h * 0.1),
            radius: rng.uniform(w * 0.3, w * 0.4),
            strength: 1.0,
        });
        for i in 1..=SECONDARY_BLOBS {
            let angle = i as f64 / SECONDARY_BLOBS as f64 * TAU;
            let distance = rng.uniform(w * 0.2, w * 0.35);
            seeds.push(ContinentSeed {
                x: w * 0.5 + angle.cos() * distance,
                y: h * 0.5 + angle.sin() * distance,
                radius: rng.uniform(w * 0.15, w * 0.25),
                strength: rng.uniform(0.6, 0.9),
            });
        }

        let mut ranges = Vec::with_capacity(2 + CLUSTERS);
        let waypoints = spine(&mut rng, w, h, 0.25);
        ranges.push(MountainRange::Spine {
            waypoints,
            width: rng.uniform(w * 0.05, w * 0.08),
            height: rng.uniform(0.7, 0.9),
        });
        let waypoints = spine(&mut rng, w, h, 0.75);
        ranges.push(MountainRange::Spine {
            waypoints,
            width: rng.uniform(w * 0.03, w * 0.05),
            height: rng.uniform(0.4, 0.6),
        });
        for _ in 0..CLUSTERS {
            ranges.push(MountainRange::Cluster {
                x: rng.uniform(w * 0.3, w * 0.7),
                y: rng.uniform(h * 0.3, h * 0.7),
                radius: rng.uniform(w * 0.02, w * 0.04),
                height: rng.uniform(0.3, 0.5),
            });
        }

        let valleys = (0..VALLEYS)
            .map(|_| Valley {
                x: rng.uniform(w * 0.3, w * 0.7),
                y: rng.uniform(h * 0.3, h * 0.7),
                radius: rng.uniform(w * 0.05, w * 0.1),
                depth: rng.uniform(0.3, 0.5),
            })
            .collect();

        Self {
            seeds,
            ranges,
            valleys,
        }
    }

    /// The blob placed near the world centre.
    #[must_use]
    pub fn primary(&self) -> Option<&ContinentSeed> {
        self.seeds.first()
    }
}

/// North-to-south polyline around `base` (fraction of the width).
fn spine(rng: &mut SeedStream, w: f64, h: f64, base: f64) -> Vec<SpineWaypoint> {
    (0..SPINE_WAYPOINTS)
        .map(|i| {
            let t = i as f64 / (SPINE_WAYPOINTS - 1) as f64;
            SpineWaypoint {
                x: w * base + rng.uniform(-w * 0.05, w * 0.05),
                y: h * (0.1 + t * 0.8),
                width: rng.uniform(50.0, 150.0),
            }
        })
        .collect()
}

/// Euclidean distance from `(px, py)` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let length_squared = dx * dx + dy * dy;
    if length_squared == 0.0 {
        return (px - a.0).hypot(py - a.1);
    }
    let t = (((px - a.0) * dx + (py - a.1) * dy) / length_squared).clamp(0.0, 1.0);
    (px - (a.0 + t * dx)).hypot(py - (a.1 + t * dy))
}
