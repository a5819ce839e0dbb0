//! Biome classification and smoothing
//!
//! Each land cell is classified from its normalized height, temperature and moisture, then a
//! single smoothing pass replaces isolated cells with a random neighbor's biome.

use std::ops::{Index, IndexMut};

use log::{debug, info};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::heightmap::normalize_heights;
use crate::surface::{Biome, SurfaceStore};
use crate::tilemap::Tilemap;

// =============================================================================
// CLASSIFICATION THRESHOLDS
// =============================================================================

const DRY_MOISTURE: f32 = 0.1;
const MOIST_MOISTURE: f32 = 0.5;
const DESERT_MIN_TEMP: f32 = 5.0;
const TROPICAL_MIN_TEMP: f32 = 20.0;
/// Land is desert when `temperature / EVAPORATION_TEMP` exceeds its moisture.
const EVAPORATION_TEMP: f32 = 70.0;
const MOUNTAIN_HEIGHT: f32 = 0.8;
const PEAK_HEIGHT: f32 = 0.95;
/// A neighbor this much higher turns a cell into mountain.
const CLIFF_RISE: f32 = 0.55;

/// Window cells (out of 36) that must share the cell's biome, or be ocean, for it to stay.
const SMOOTHING_THRESHOLD: usize = 20;

/// Offsets of the 6×6 neighborhood window used by smoothing and vegetation blending.
pub fn window_offsets() -> impl Iterator<Item = (i32, i32)> {
    (-3..=2).flat_map(|dy| (-3..=2).map(move |dx| (dx, dy)))
}

// =============================================================================
// BIOME COLORS
// =============================================================================

/// Base display color of every biome.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeColors {
    colors: [[u8; 3]; Biome::COUNT],
}

impl Default for BiomeColors {
    fn default() -> Self {
        let mut colors = [[0u8; 3]; Biome::COUNT];
        for &biome in Biome::all() {
            colors[biome.index()] = match biome {
                Biome::Ocean => [24, 64, 128],
                Biome::Desert => [222, 196, 140],
                Biome::Forest => [34, 100, 34],
                Biome::Grass => [110, 160, 70],
                Biome::Plains => [170, 180, 100],
                Biome::Ice => [235, 240, 250],
                Biome::Mountain => [120, 110, 100],
                Biome::Rainforest => [20, 80, 40],
            };
        }
        Self { colors }
    }
}

impl Index<Biome> for BiomeColors {
    type Output = [u8; 3];

    fn index(&self, biome: Biome) -> &[u8; 3] {
        &self.colors[biome.index()]
    }
}

impl IndexMut<Biome> for BiomeColors {
    fn index_mut(&mut self, biome: Biome) -> &mut [u8; 3] {
        &mut self.colors[biome.index()]
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classify one cell.
///
/// `max_rise` is how far the highest axis neighbor sits above this cell in normalized height.
/// Ocean is decided first and never overridden; land goes through the moisture/temperature
/// table, then the desert and frost overrides, then the height overrides.
pub fn classify_biome(
    height: f32,
    temperature: f32,
    moisture: f32,
    max_rise: f32,
    sealevel: f32,
) -> Biome {
    if height < sealevel {
        return Biome::Ocean;
    }

    let tropical = temperature > TROPICAL_MIN_TEMP;
    let mut biome = if moisture < DRY_MOISTURE {
        if temperature > DESERT_MIN_TEMP {
            Biome::Desert
        } else {
            Biome::Ice
        }
    } else if moisture < MOIST_MOISTURE {
        if tropical {
            Biome::Plains
        } else {
            Biome::Grass
        }
    } else if tropical {
        Biome::Rainforest
    } else {
        Biome::Forest
    };

    if temperature / EVAPORATION_TEMP > moisture {
        biome = Biome::Desert;
    }
    if temperature < 0.0 {
        biome = if moisture > 0.0 { Biome::Ice } else { Biome::Desert };
    }

    if height > PEAK_HEIGHT {
        biome = Biome::Ice;
    } else if height > MOUNTAIN_HEIGHT {
        biome = Biome::Mountain;
    }

    if max_rise > CLIFF_RISE {
        biome = Biome::Mountain;
    }

    biome
}

/// Classify every cell against `sealevel` (a normalized height).
pub fn classify_biomes(surface: &mut SurfaceStore, sealevel: f32) {
    let normalized = normalize_heights(surface);

    for y in 0..surface.height {
        for x in 0..surface.width {
            let h = *normalized.get(x, y);
            let max_rise = surface
                .neighbors(x, y)
                .iter()
                .map(|&(nx, ny)| *normalized.get(nx, ny) - h)
                .fold(f32::MIN, f32::max);

            let cell = surface.get_mut(x, y);
            cell.biome = classify_biome(h, cell.temperature, cell.moisture, max_rise, sealevel);
        }
    }

    info!("Classified biomes: {}", format_histogram(&biome_histogram(surface)));
}

// =============================================================================
// SMOOTHING
// =============================================================================

/// Replace isolated land cells with the biome of a random cell in their window.
///
/// Works from a snapshot, so earlier replacements never influence later decisions. A cell is
/// isolated when fewer than 20 cells of its 6×6 window share its biome or are ocean; ocean,
/// mountain and ice are never spread. Draws two values per isolated cell. Returns the number
/// of cells that changed.
pub fn smooth_biomes(surface: &mut SurfaceStore, rng: &mut ChaCha8Rng) -> usize {
    let snapshot: Tilemap<Biome> = surface.map(|c| c.biome);
    let mut changed = 0;
    let mut isolated = 0;

    for y in 0..surface.height {
        for x in 0..surface.width {
            let biome = *snapshot.get(x, y);
            if biome == Biome::Ocean {
                continue;
            }

            let agreeing = window_offsets()
                .map(|(dx, dy)| snapshot.offset(x, y, dx, dy))
                .filter(|&(nx, ny)| {
                    let other = *snapshot.get(nx, ny);
                    other == biome || other == Biome::Ocean
                })
                .count();
            if agreeing >= SMOOTHING_THRESHOLD {
                continue;
            }
            isolated += 1;

            let dx = rng.gen_range(-3..=2);
            let dy = rng.gen_range(-3..=2);
            let (nx, ny) = snapshot.offset(x, y, dx, dy);
            let candidate = *snapshot.get(nx, ny);
            if candidate.is_hard_boundary() || candidate == biome {
                continue;
            }

            surface.get_mut(x, y).biome = candidate;
            changed += 1;
        }
    }

    debug!("{} isolated biome cells, {} replaced", isolated, changed);
    info!("Smoothed biomes: {}", format_histogram(&biome_histogram(surface)));
    changed
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Number of cells per biome, indexed by [`Biome::index`].
pub fn biome_histogram(surface: &SurfaceStore) -> [usize; Biome::COUNT] {
    let mut counts = [0usize; Biome::COUNT];
    for cell in surface.values() {
        counts[cell.biome.index()] += 1;
    }
    counts
}

fn format_histogram(counts: &[usize; Biome::COUNT]) -> String {
    Biome::all()
        .iter()
        .filter(|b| counts[b.index()] > 0)
        .map(|b| format!("{}={}", b, counts[b.index()]))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::new_surface;
    use rand::SeedableRng;

    #[test]
    fn test_below_sealevel_is_ocean() {
        assert_eq!(classify_biome(0.1, 30.0, 0.9, 0.9, 0.2), Biome::Ocean);
        // Height overrides never touch ocean.
        assert_eq!(classify_biome(0.1, -10.0, 0.0, 0.9, 0.2), Biome::Ocean);
    }

    #[test]
    fn test_moisture_temperature_table() {
        assert_eq!(classify_biome(0.5, 10.0, 0.05, 0.0, 0.2), Biome::Desert);
        assert_eq!(classify_biome(0.5, 2.0, 0.05, 0.0, 0.2), Biome::Ice);
        assert_eq!(classify_biome(0.5, 25.0, 0.4, 0.0, 0.2), Biome::Plains);
        assert_eq!(classify_biome(0.5, 10.0, 0.3, 0.0, 0.2), Biome::Grass);
        assert_eq!(classify_biome(0.5, 25.0, 0.8, 0.0, 0.2), Biome::Rainforest);
        assert_eq!(classify_biome(0.5, 10.0, 0.8, 0.0, 0.2), Biome::Forest);
    }

    #[test]
    fn test_hot_and_cold_overrides() {
        // 35°C needs more than 0.5 moisture
        assert_eq!(classify_biome(0.5, 35.0, 0.45, 0.0, 0.2), Biome::Desert);
        assert_eq!(classify_biome(0.5, -5.0, 0.3, 0.0, 0.2), Biome::Ice);
        assert_eq!(classify_biome(0.5, -5.0, 0.0, 0.0, 0.2), Biome::Desert);
    }

    #[test]
    fn test_height_overrides() {
        assert_eq!(classify_biome(0.85, 10.0, 0.8, 0.0, 0.2), Biome::Mountain);
        assert_eq!(classify_biome(0.97, 10.0, 0.8, 0.0, 0.2), Biome::Ice);
        assert_eq!(classify_biome(0.3, 10.0, 0.8, 0.6, 0.2), Biome::Mountain);
        assert_eq!(classify_biome(0.3, 10.0, 0.8, 0.5, 0.2), Biome::Forest);
    }

    #[test]
    fn test_classify_biomes_detects_cliffs() {
        let mut surface = new_surface(20, 10);
        for (_, _, cell) in surface.iter_mut() {
            cell.temperature = 10.0;
            cell.moisture = 0.8;
        }
        surface.get_mut(5, 5).height = 1.0;
        classify_biomes(&mut surface, 0.0);

        assert_eq!(surface.get(5, 5).biome, Biome::Ice);
        assert_eq!(surface.get(4, 5).biome, Biome::Mountain);
        assert_eq!(surface.get(5, 4).biome, Biome::Mountain);
        assert_eq!(surface.get(10, 8).biome, Biome::Forest);
    }

    #[test]
    fn test_smoothing_keeps_uniform_region() {
        let mut surface = new_surface(20, 10);
        for (_, _, cell) in surface.iter_mut() {
            cell.biome = Biome::Grass;
        }
        let before = surface.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(smooth_biomes(&mut surface, &mut rng), 0);
        assert_eq!(surface, before);
    }

    #[test]
    fn test_smoothing_replaces_speckle() {
        let mut surface = new_surface(40, 20);
        for (x, y, cell) in surface.iter_mut() {
            cell.biome = if (x + y) % 2 == 0 { Biome::Grass } else { Biome::Forest };
        }
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let changed = smooth_biomes(&mut surface, &mut rng);
        assert!(changed > 0);
        assert!(surface
            .values()
            .all(|c| c.biome == Biome::Grass || c.biome == Biome::Forest));
    }

    #[test]
    fn test_smoothing_never_spreads_hard_boundaries() {
        let mut surface = new_surface(40, 20);
        for (x, _, cell) in surface.iter_mut() {
            cell.biome = if x % 2 == 0 { Biome::Mountain } else { Biome::Desert };
        }
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        smooth_biomes(&mut surface, &mut rng);
        for (x, _, cell) in surface.iter() {
            let expected = if x % 2 == 0 { Biome::Mountain } else { Biome::Desert };
            // Mountain cells may turn into desert, desert never into mountain.
            if expected == Biome::Desert {
                assert_eq!(cell.biome, Biome::Desert);
            }
        }
    }

    #[test]
    fn test_colors_indexable() {
        let mut colors = BiomeColors::default();
        colors[Biome::Ice] = [1, 2, 3];
        assert_eq!(colors[Biome::Ice], [1, 2, 3]);
        assert_ne!(colors[Biome::Ocean], colors[Biome::Desert]);
    }
}
