//! Star model used to place the habitable zone.

use serde::{Deserialize, Serialize};

/// Absolute bolometric magnitude of Sol after correction.
const SOL_CORRECTED_BOLOMETRIC: f32 = 4.72;

/// Stellar flux (relative to Earth) at the inner edge of the habitable zone.
const HABITABLE_ZONE_INNER_FLUX: f32 = 1.1;

/// Stellar flux (relative to Earth) at the outer edge of the habitable zone.
const HABITABLE_ZONE_OUTER_FLUX: f32 = 0.53;

/// Morgan-Keenan spectral class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpectralClass {
    B,
    A,
    F,
    #[default]
    G,
    K,
    M,
}

impl SpectralClass {
    /// Bolometric correction applied to the visual absolute magnitude.
    pub fn bolometric_correction(self) -> f32 {
        match self {
            SpectralClass::B => -2.0,
            SpectralClass::A => -0.3,
            SpectralClass::F => -0.15,
            SpectralClass::G => -0.4,
            SpectralClass::K => -0.8,
            SpectralClass::M => -2.0,
        }
    }
}

/// Orbital distance interval (AU) where liquid water is plausible.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HabitableZone {
    pub min: f32,
    pub max: f32,
}

impl HabitableZone {
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.min && distance <= self.max
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }
}

/// The primary star of a planet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub absolute_magnitude: f32,
    /// Solar masses.
    pub mass: f32,
    /// Solar radii.
    pub radius: f32,
    pub spectral_class: SpectralClass,
}

impl Default for Star {
    fn default() -> Self {
        Self::sol()
    }
}

impl Star {
    pub fn sol() -> Self {
        Self {
            absolute_magnitude: 4.83,
            mass: 1.0,
            radius: 1.0,
            spectral_class: SpectralClass::G,
        }
    }

    /// Luminosity relative to Sol.
    pub fn luminosity(&self) -> f32 {
        let bolometric = self.absolute_magnitude - self.spectral_class.bolometric_correction();
        10f32.powf((bolometric - SOL_CORRECTED_BOLOMETRIC) / -2.5)
    }

    pub fn habitable_zone(&self) -> HabitableZone {
        let luminosity = self.luminosity();
        HabitableZone {
            min: (luminosity / HABITABLE_ZONE_INNER_FLUX).sqrt(),
            max: (luminosity / HABITABLE_ZONE_OUTER_FLUX).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sol_zone_contains_earth() {
        let zone = Star::sol().habitable_zone();
        assert!(zone.min < zone.max);
        assert!(zone.contains(1.0));
        assert!(!zone.contains(0.38));
        assert!(!zone.contains(1.63));
    }

    #[test]
    fn test_brighter_star_pushes_zone_out() {
        let sol = Star::sol().habitable_zone();
        let bright = Star {
            absolute_magnitude: 2.0,
            spectral_class: SpectralClass::F,
            ..Star::sol()
        }
        .habitable_zone();
        assert!(bright.min > sol.min);
        assert!(bright.max > sol.max);
    }
}
