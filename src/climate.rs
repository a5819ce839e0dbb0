//! Climate passes: wind, heat, moisture and the ocean level derived from them.
//!
//! Wind and heat draw from the shared random stream, in that order. Moisture samples its own
//! noise field so it stays independent of everything drawn before it.

use std::f32::consts::TAU;

use log::{debug, info};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::{Atmosphere, GenerationParams};
use crate::noise_field::{NoiseOracle, TileBounds};
use crate::plates::Vec2;
use crate::star::HabitableZone;
use crate::surface::SurfaceStore;

// =============================================================================
// CLIMATE CONSTANTS
// =============================================================================

/// Baseline temperature (°C) at the inner edge of the habitable zone.
const ZONE_INNER_TEMP: f32 = 25.0;

/// Baseline temperature (°C) at the outer edge of the habitable zone.
const ZONE_OUTER_TEMP: f32 = 15.0;

const KELVIN_OFFSET: f32 = 273.15;

/// Exponent applied to the pressure ratio in the temperature ratio.
const PRESSURE_EXPONENT: f32 = 0.19;

/// Density correction at the poles; the equator adds `DENSITY_LATITUDE_GAIN` on top.
const DENSITY_POLAR: f32 = 0.82;
const DENSITY_LATITUDE_GAIN: f32 = 0.2;

/// Sealevel is the mean moisture scaled by this.
const SEALEVEL_MOISTURE_FACTOR: f32 = 1.1;

const MIN_WIND_SOURCES: usize = 5;
const MAX_WIND_SOURCES: usize = 20;
const MIN_WIND_RADIUS: f32 = 45.0;
const MAX_WIND_RADIUS: f32 = 135.0;

// =============================================================================
// WIND
// =============================================================================

/// A rotating point of wind influence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindSource {
    /// Grid position.
    pub x: usize,
    pub y: usize,
    /// Cells within this distance feel the source.
    pub radius: f32,
    /// Radians, in `-2π..2π`.
    pub rotation: f32,
}

impl WindSource {
    /// Position of the source as seen from column `x`, taking the shorter way around the globe.
    fn location_from(&self, x: usize, width: usize) -> Vec2 {
        let half_w = width as f32 / 2.0;
        let mut sx = self.x as f32;
        let dx = sx - x as f32;
        if dx > half_w {
            sx -= width as f32;
        } else if dx < -half_w {
            sx += width as f32;
        }
        Vec2::new(sx, self.y as f32)
    }
}

/// Scatter 5 to 19 wind sources over a `width`×`height` grid.
pub fn generate_wind_sources(width: usize, height: usize, rng: &mut ChaCha8Rng) -> Vec<WindSource> {
    let count = rng.gen_range(MIN_WIND_SOURCES..MAX_WIND_SOURCES);
    (0..count)
        .map(|_| {
            let radius = rng.gen_range(MIN_WIND_RADIUS..MAX_WIND_RADIUS);
            let rotation = rng.gen_range(-TAU..TAU);
            let x = rng.gen_range(0..width);
            let y = rng.gen_range(0..height);
            WindSource { x, y, radius, rotation }
        })
        .collect()
}

/// Wind vector at `(x, y)`: every source in range contributes the rotated vector from the
/// cell to the source, weakened quadratically with distance.
pub fn wind_at(x: usize, y: usize, width: usize, sources: &[WindSource]) -> Vec2 {
    let cell = Vec2::new(x as f32, y as f32);
    let mut wind = Vec2::ZERO;

    for source in sources {
        let location = source.location_from(x, width);
        let distance = location.distance(&cell);
        if distance > source.radius {
            continue;
        }
        let falloff = 1.0 - distance / source.radius;
        wind += (location - cell).rotate(source.rotation) * (falloff * falloff);
    }

    wind
}

/// Generate wind sources and fill in the wind field. Source cells keep a calm (zero) wind.
pub fn generate_wind(surface: &mut SurfaceStore, rng: &mut ChaCha8Rng) -> Vec<WindSource> {
    let sources = generate_wind_sources(surface.width, surface.height, rng);
    let width = surface.width;

    for (x, y, cell) in surface.iter_mut() {
        if sources.iter().any(|s| s.x == x && s.y == y) {
            cell.wind = Vec2::ZERO;
            continue;
        }
        cell.wind = wind_at(x, y, width, &sources);
    }

    info!("Generated wind field from {} sources", sources.len());
    sources
}

// =============================================================================
// HEAT
// =============================================================================

/// Baseline surface temperature (°C) for a planet at `distance` AU.
///
/// Interpolates from 25°C at the inner edge of the zone to 15°C at the outer edge and keeps
/// the same slope outside the zone.
pub fn baseline_temperature(distance: f32, zone: &HabitableZone) -> f32 {
    let width = zone.width();
    let t = if width > 0.0 {
        (distance - zone.min) / width
    } else if distance <= zone.min {
        0.0
    } else {
        1.0
    };
    ZONE_INNER_TEMP + (ZONE_OUTER_TEMP - ZONE_INNER_TEMP) * t
}

/// Atmospheric pressure (bar) at `altitude_km`.
pub fn pressure_at_altitude(atmosphere: &Atmosphere, altitude_km: f32) -> f32 {
    atmosphere.pressure_at_sealevel * (-altitude_km / atmosphere.scale_height).exp()
}

/// Fill in cell temperatures from altitude, latitude and the planet's place in the zone.
///
/// Draws one jitter value per cell, row by row. Returns the temperature range.
pub fn generate_heat(
    surface: &mut SurfaceStore,
    atmosphere: &Atmosphere,
    distance: f32,
    zone: &HabitableZone,
    params: &GenerationParams,
    rng: &mut ChaCha8Rng,
) -> (f32, f32) {
    let baseline = baseline_temperature(distance, zone);
    let baseline_k = baseline + KELVIN_OFFSET;
    debug!("Baseline temperature {:.1}°C at {} AU", baseline, distance);

    let mut min_t = f32::MAX;
    let mut max_t = f32::MIN;

    for (_, _, cell) in surface.iter_mut() {
        let altitude_km = cell.height.max(0.0) * params.max_altitude_km;
        let pressure = pressure_at_altitude(atmosphere, altitude_km);
        // A vacuum has no pressure gradient to cool with.
        let pressure_ratio = if atmosphere.pressure_at_sealevel > 0.0 {
            pressure / atmosphere.pressure_at_sealevel
        } else {
            1.0
        };
        let density = DENSITY_POLAR + DENSITY_LATITUDE_GAIN * cell.normal_factor;

        let jitter = if params.temperature_jitter.is_finite() && params.temperature_jitter > 0.0 {
            rng.gen_range(-params.temperature_jitter..params.temperature_jitter)
        } else {
            0.0
        };

        let ratio = pressure_ratio.powf(PRESSURE_EXPONENT) * density + jitter;
        cell.temperature = baseline_k * ratio - KELVIN_OFFSET;

        min_t = min_t.min(cell.temperature);
        max_t = max_t.max(cell.temperature);
    }

    info!("Generated heat: {:.1}°C..{:.1}°C", min_t, max_t);
    (min_t, max_t)
}

// =============================================================================
// MOISTURE
// =============================================================================

/// Fill in moisture from a noise field scaled by temperature, normalized into `0.0..=1.0`.
///
/// Cells where the scaled noise is negative are dry. When nothing is wet the whole field is 0.
/// Returns the maximum before normalization.
pub fn generate_moisture(
    surface: &mut SurfaceStore,
    oracle: &dyn NoiseOracle,
    bounds: &TileBounds,
    frequency: f64,
) -> f32 {
    let width = surface.width as f64;
    let height = surface.height as f64;
    let mut max_moisture = 0.0f32;

    for (x, y, cell) in surface.iter_mut() {
        let noise = oracle.sample_tileable_fbm(x, y, bounds, width, height, frequency) as f32;
        cell.moisture = (noise * cell.temperature.abs()).max(0.0);
        max_moisture = max_moisture.max(cell.moisture);
    }

    if max_moisture > 0.0 {
        for (_, _, cell) in surface.iter_mut() {
            cell.moisture /= max_moisture;
        }
    } else {
        for (_, _, cell) in surface.iter_mut() {
            cell.moisture = 0.0;
        }
    }

    debug!("Moisture maximum before normalization: {:.3}", max_moisture);
    max_moisture
}

// =============================================================================
// OCEAN
// =============================================================================

/// Normalized height below which cells are ocean.
///
/// Planets inside the habitable zone get the mean moisture times 1.1; everything else is dry.
pub fn calibrate_ocean(surface: &SurfaceStore, distance: f32, zone: &HabitableZone) -> f32 {
    if !zone.contains(distance) || surface.is_empty() {
        info!("Planet at {} AU is outside the habitable zone, no oceans", distance);
        return 0.0;
    }

    let total: f32 = surface.values().map(|c| c.moisture).sum();
    let sealevel = (total / surface.len() as f32 * SEALEVEL_MOISTURE_FACTOR).max(0.0);
    info!("Sealevel at normalized height {:.3}", sealevel);
    sealevel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::TileableFbm;
    use crate::star::Star;
    use crate::surface::new_surface;
    use rand::SeedableRng;

    struct Constant(f64);

    impl NoiseOracle for Constant {
        fn sample_tileable_fbm(&self, _: usize, _: usize, _: &TileBounds, _: f64, _: f64, _: f64) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_wind_source_count_and_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let sources = generate_wind_sources(360, 180, &mut rng);
            assert!((5..20).contains(&sources.len()));
            for s in &sources {
                assert!(s.x < 360 && s.y < 180);
                assert!((45.0..135.0).contains(&s.radius));
                assert!((-TAU..TAU).contains(&s.rotation));
            }
        }
    }

    #[test]
    fn test_wind_falloff_and_rotation() {
        let source = WindSource { x: 100, y: 50, radius: 10.0, rotation: 0.0 };

        // Five cells to the left: points at the source, quarter strength.
        let wind = wind_at(95, 50, 360, &[source]);
        assert!((wind.x - 5.0 * 0.25).abs() < 1e-5);
        assert!(wind.y.abs() < 1e-5);

        assert_eq!(wind_at(80, 50, 360, &[source]), Vec2::ZERO);

        let turned = WindSource { rotation: std::f32::consts::FRAC_PI_2, ..source };
        let wind = wind_at(95, 50, 360, &[turned]);
        assert!(wind.x.abs() < 1e-5);
        assert!((wind.y.abs() - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_wind_wraps_longitude() {
        let source = WindSource { x: 2, y: 90, radius: 10.0, rotation: 0.0 };
        let wind = wind_at(357, 90, 360, &[source]);
        assert!(wind.x > 0.0, "source across the date line should pull east");
    }

    #[test]
    fn test_generate_wind_calm_at_sources() {
        let mut surface = new_surface(360, 180);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sources = generate_wind(&mut surface, &mut rng);
        for s in &sources {
            assert_eq!(surface.get(s.x, s.y).wind, Vec2::ZERO);
        }
        assert!(surface.values().any(|c| c.wind.length() > 0.0));
    }

    #[test]
    fn test_baseline_temperature_in_zone() {
        let zone = HabitableZone { min: 1.0, max: 2.0 };
        assert!((baseline_temperature(1.0, &zone) - 25.0).abs() < 1e-5);
        assert!((baseline_temperature(2.0, &zone) - 15.0).abs() < 1e-5);
        assert!((baseline_temperature(1.5, &zone) - 20.0).abs() < 1e-5);
        assert!(baseline_temperature(3.0, &zone) < 15.0);
        assert!(baseline_temperature(0.5, &zone) > 25.0);
    }

    #[test]
    fn test_pressure_decays_with_altitude() {
        let atmosphere = Atmosphere::earth();
        assert_eq!(pressure_at_altitude(&atmosphere, 0.0), atmosphere.pressure_at_sealevel);
        let at_scale = pressure_at_altitude(&atmosphere, atmosphere.scale_height);
        assert!((at_scale - atmosphere.pressure_at_sealevel / std::f32::consts::E).abs() < 1e-4);
    }

    #[test]
    fn test_heat_warmer_at_equator() {
        let mut surface = new_surface(36, 18);
        let params = GenerationParams {
            temperature_jitter: 0.0,
            ..GenerationParams::default()
        };
        let zone = Star::sol().habitable_zone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (min_t, max_t) = generate_heat(&mut surface, &Atmosphere::earth(), 1.0, &zone, &params, &mut rng);

        assert!(min_t < max_t);
        assert!(surface.get(0, 9).temperature > surface.get(0, 0).temperature);
        assert!(surface.get(0, 9).temperature > 15.0);
        assert!(surface.get(0, 0).temperature < 0.0);
    }

    #[test]
    fn test_heat_colder_on_mountains() {
        let mut surface = new_surface(36, 18);
        surface.get_mut(5, 9).height = 1.0;
        let params = GenerationParams {
            temperature_jitter: 0.0,
            ..GenerationParams::default()
        };
        let zone = Star::sol().habitable_zone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        generate_heat(&mut surface, &Atmosphere::earth(), 1.0, &zone, &params, &mut rng);
        assert!(surface.get(5, 9).temperature < surface.get(6, 9).temperature);
    }

    #[test]
    fn test_heat_follows_pressure_at_altitude() {
        let mut surface = new_surface(36, 18);
        surface.get_mut(5, 9).height = 1.0;
        let params = GenerationParams {
            temperature_jitter: 0.0,
            ..GenerationParams::default()
        };
        let atmosphere = Atmosphere::earth();
        let zone = Star::sol().habitable_zone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        generate_heat(&mut surface, &atmosphere, 1.0, &zone, &params, &mut rng);

        let cell = surface.get(5, 9);
        let ratio = pressure_at_altitude(&atmosphere, params.max_altitude_km)
            / atmosphere.pressure_at_sealevel;
        let density = 0.82 + 0.2 * cell.normal_factor;
        let expected = (baseline_temperature(1.0, &zone) + 273.15) * ratio.powf(0.19) * density - 273.15;
        assert!((cell.temperature - expected).abs() < 1e-3);
    }

    #[test]
    fn test_heat_vacuum_ignores_altitude() {
        let mut surface = new_surface(36, 18);
        surface.get_mut(5, 9).height = 1.0;
        let params = GenerationParams {
            temperature_jitter: 0.0,
            ..GenerationParams::default()
        };
        let vacuum = Atmosphere {
            pressure_at_sealevel: 0.0,
            scale_height: 8.5,
        };
        let zone = Star::sol().habitable_zone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        generate_heat(&mut surface, &vacuum, 1.0, &zone, &params, &mut rng);

        let peak = surface.get(5, 9).temperature;
        assert!(peak.is_finite());
        assert_eq!(peak, surface.get(6, 9).temperature);
    }

    #[test]
    fn test_heat_skips_non_finite_jitter() {
        let mut surface = new_surface(36, 18);
        let params = GenerationParams {
            temperature_jitter: f32::INFINITY,
            ..GenerationParams::default()
        };
        let zone = Star::sol().habitable_zone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (min_t, max_t) = generate_heat(&mut surface, &Atmosphere::earth(), 1.0, &zone, &params, &mut rng);
        assert!(min_t.is_finite() && max_t.is_finite());
    }

    #[test]
    fn test_moisture_normalized() {
        let mut surface = new_surface(72, 36);
        for (_, y, cell) in surface.iter_mut() {
            cell.temperature = y as f32 - 10.0;
        }
        let noise = TileableFbm::new(4, 6, 0.5);
        generate_moisture(&mut surface, &noise, &TileBounds::square(0.0, 3.0), 1.0);

        assert!(surface.values().all(|c| (0.0..=1.0).contains(&c.moisture)));
        let max = surface.values().fold(0.0f32, |m, c| m.max(c.moisture));
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_moisture_all_dry_is_zero() {
        let mut surface = new_surface(20, 10);
        for (_, _, cell) in surface.iter_mut() {
            cell.temperature = 20.0;
        }
        let max = generate_moisture(&mut surface, &Constant(-0.5), &TileBounds::square(0.0, 3.0), 1.0);
        assert_eq!(max, 0.0);
        assert!(surface.values().all(|c| c.moisture == 0.0));
    }

    #[test]
    fn test_ocean_only_in_habitable_zone() {
        let mut surface = new_surface(20, 10);
        for (_, _, cell) in surface.iter_mut() {
            cell.moisture = 0.5;
        }
        let zone = Star::sol().habitable_zone();
        assert!((calibrate_ocean(&surface, 1.0, &zone) - 0.55).abs() < 1e-5);
        assert_eq!(calibrate_ocean(&surface, 1.63, &zone), 0.0);
        assert_eq!(calibrate_ocean(&surface, 0.38, &zone), 0.0);
    }
}
