//! Planet settings and generation tunables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biomes::BiomeColors;
use crate::error::{PlanetError, Result};
use crate::noise_field::{NoiseKind, TileBounds};
use crate::tilemap::{GRID_HEIGHT, GRID_WIDTH};

/// Atmosphere of a planet. Absent for airless bodies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    /// Bar.
    pub pressure_at_sealevel: f32,
    /// Kilometers.
    pub scale_height: f32,
}

impl Atmosphere {
    pub fn earth() -> Self {
        Self {
            pressure_at_sealevel: 1.01325,
            scale_height: 8.5,
        }
    }
}

/// Physical description of the planet to generate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetConfig {
    /// Million years.
    pub age: u32,
    #[serde(default)]
    pub atmosphere: Option<Atmosphere>,
    /// Astronomical units.
    pub distance_to_star: f32,
    /// Earth masses.
    pub mass: f32,
    /// Kilometers from core to sea level.
    pub radius: f32,
    /// Zero or less means a single plate.
    pub plate_count: i32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self::earth()
    }
}

impl PlanetConfig {
    pub fn earth() -> Self {
        Self {
            age: 4543,
            atmosphere: Some(Atmosphere::earth()),
            distance_to_star: 1.0,
            mass: 1.0,
            radius: 6371.0,
            plate_count: 7,
        }
    }

    pub fn mars() -> Self {
        Self {
            age: 4500,
            atmosphere: Some(Atmosphere {
                pressure_at_sealevel: 0.01,
                scale_height: 11.1,
            }),
            distance_to_star: 1.63,
            mass: 0.11,
            radius: 3396.0,
            plate_count: 4,
        }
    }

    pub fn mercury() -> Self {
        Self {
            age: 4500,
            atmosphere: None,
            distance_to_star: 0.38,
            mass: 0.055,
            radius: 2440.0,
            plate_count: 1,
        }
    }

    pub fn venus() -> Self {
        Self {
            age: 4500,
            atmosphere: Some(Atmosphere {
                pressure_at_sealevel: 900.0,
                scale_height: 15.9,
            }),
            distance_to_star: 0.72,
            mass: 0.81,
            radius: 6052.0,
            plate_count: 1,
        }
    }

    /// Look up a preset by name (for CLI).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "earth" => Some(Self::earth()),
            "mars" => Some(Self::mars()),
            "mercury" => Some(Self::mercury()),
            "venus" => Some(Self::venus()),
            _ => None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(PlanetError::InvalidConfiguration(format!(
                    "{} must be a positive number, got {}",
                    name, v
                )))
            }
        };

        positive("distance_to_star", self.distance_to_star)?;
        positive("mass", self.mass)?;
        positive("radius", self.radius)?;

        if let Some(atmosphere) = &self.atmosphere {
            positive("scale_height", atmosphere.scale_height)?;
            if !atmosphere.pressure_at_sealevel.is_finite() || atmosphere.pressure_at_sealevel < 0.0 {
                return Err(PlanetError::InvalidConfiguration(format!(
                    "pressure_at_sealevel must be zero or more, got {}",
                    atmosphere.pressure_at_sealevel
                )));
            }
        }

        let cells = GRID_WIDTH * GRID_HEIGHT;
        if self.plate_count > 0 && self.plate_count as usize > cells {
            return Err(PlanetError::InvalidConfiguration(format!(
                "plate_count {} exceeds the {} cells of the grid",
                self.plate_count, cells
            )));
        }

        Ok(())
    }
}

/// Tunables for the generation passes.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    /// Border distances never exceed this value.
    pub border_limit: u32,
    /// Random infill sweeps before the plate fill finishes breadth-first.
    pub max_infill_passes: usize,
    pub height_noise: NoiseKind,
    pub height_bounds: TileBounds,
    pub height_frequency: f64,
    pub moisture_noise: NoiseKind,
    pub moisture_bounds: TileBounds,
    pub moisture_frequency: f64,
    /// How strongly plate activity perturbs elevation.
    pub tectonic_activity: f32,
    /// Scale of the per-plate elevation bias.
    pub plate_bias_scale: f32,
    /// Altitude in kilometers of a normalized height of 1.
    pub max_altitude_km: f32,
    /// Bound of the random jitter on the temperature ratio.
    pub temperature_jitter: f32,
    pub biome_colors: BiomeColors,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            border_limit: 25,
            max_infill_passes: 2 * (GRID_WIDTH + GRID_HEIGHT),
            height_noise: NoiseKind::Fbm,
            height_bounds: TileBounds::square(0.0, 4.0),
            height_frequency: 1.0,
            moisture_noise: NoiseKind::Fbm,
            moisture_bounds: TileBounds::square(0.0, 3.0),
            moisture_frequency: 1.0,
            tectonic_activity: 0.05,
            plate_bias_scale: 0.1,
            max_altitude_km: 10.0,
            temperature_jitter: 0.01,
            biome_colors: BiomeColors::default(),
        }
    }
}

impl GenerationParams {
    /// Reject tunables that would break a pass.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("height_frequency", self.height_frequency as f32),
            ("moisture_frequency", self.moisture_frequency as f32),
            ("tectonic_activity", self.tectonic_activity),
            ("plate_bias_scale", self.plate_bias_scale),
            ("max_altitude_km", self.max_altitude_km),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(PlanetError::InvalidConfiguration(format!(
                    "{} must be finite, got {}",
                    name, v
                )));
            }
        }

        if !self.temperature_jitter.is_finite() || self.temperature_jitter < 0.0 {
            return Err(PlanetError::InvalidConfiguration(format!(
                "temperature_jitter must be a finite value of zero or more, got {}",
                self.temperature_jitter
            )));
        }

        Ok(())
    }
}
