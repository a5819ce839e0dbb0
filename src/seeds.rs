//! Seed management for planet generation
//!
//! The master seed drives the shared random stream (plates, wind, heat jitter, smoothing).
//! Noise fields get their own seeds so the height and moisture patterns can be varied
//! without disturbing the rest of the pipeline.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for one planet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanetSeeds {
    /// Seeds the shared random stream.
    pub master: u64,
    /// Height noise field.
    pub heightmap: u64,
    /// Moisture noise field.
    pub moisture: u64,
}

impl PlanetSeeds {
    /// Derive the noise seeds from `master`.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            heightmap: derive_seed(master, "heightmap"),
            moisture: derive_seed(master, "moisture"),
        }
    }
}

impl Default for PlanetSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Derive a sub-seed from a master seed and a field name.
fn derive_seed(master: u64, field: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    field.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for PlanetSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PlanetSeeds {{ master: {}, heightmap: {}, moisture: {} }}",
            self.master, self.heightmap, self.moisture
        )
    }
}
