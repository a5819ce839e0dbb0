use log::{debug, info};

use crate::noise_field::{NoiseOracle, TileBounds};
use crate::plates::Plate;
use crate::surface::{latitude_degrees, SurfaceStore};
use crate::tilemap::Tilemap;

// =============================================================================
// BASE ELEVATION
// =============================================================================

/// Fill every cell with a base elevation sampled from `oracle`.
///
/// The noise tile covers half the longitude range and the full latitude range. Each sample is
/// written at `x` and again at `x + width/2`, so a cell and the cell reached by walking over the
/// pole carry the same elevation.
pub fn generate_heightmap(
    surface: &mut SurfaceStore,
    oracle: &dyn NoiseOracle,
    bounds: &TileBounds,
    frequency: f64,
) {
    let half_w = surface.width / 2;
    let tile_w = half_w.max(1) as f64;
    let tile_h = surface.height as f64;

    for y in 0..surface.height {
        for x in 0..half_w {
            let h = oracle.sample_tileable_fbm(x, y, bounds, tile_w, tile_h, frequency) as f32;
            surface.get_mut(x, y).height = h;
            surface.get_mut(x + half_w, y).height = h;
        }
    }

    let (min_h, max_h) = heights(surface).min_max();
    debug!("Base elevation range {:.3}..{:.3}", min_h, max_h);
}

// =============================================================================
// TECTONICS
// =============================================================================

/// Perturb elevation by plate activity, then add each plate's elevation bias.
///
/// Activity is the length of the cell's own plate motion plus its blended adjacent direction.
/// It is pulled toward 1 with distance from the equator (fully neutral at the poles) and turned
/// into the multiplier `1 + (activity - 1) * activity_factor`.
pub fn apply_tectonics(
    surface: &mut SurfaceStore,
    plates: &[Plate],
    activity_factor: f32,
    bias_scale: f32,
) {
    let height = surface.height;

    for (_, y, cell) in surface.iter_mut() {
        let Some(plate) = plates.get(cell.plate.index()) else {
            continue;
        };

        let mut activity = (plate.motion + cell.adjacent_direction).length();
        let equatorial = (1.0 - latitude_degrees(y, height).abs() / 90.0).clamp(0.0, 1.0);
        activity = equatorial * activity + 1.0 - equatorial;

        cell.height *= 1.0 + (activity - 1.0) * activity_factor;
        cell.height += plate.elevation_bias * bias_scale;
    }

    let (min_h, max_h) = heights(surface).min_max();
    info!("Applied tectonics: elevation range {:.3}..{:.3}", min_h, max_h);
}

// =============================================================================
// HEIGHT GRIDS
// =============================================================================

/// Raw elevation of every cell.
pub fn heights(surface: &SurfaceStore) -> Tilemap<f32> {
    surface.map(|c| c.height)
}

/// Elevation rescaled into `0.0..=1.0` by the global min/max. All zeros when flat.
pub fn normalize_heights(surface: &SurfaceStore) -> Tilemap<f32> {
    heights(surface).normalized()
}
