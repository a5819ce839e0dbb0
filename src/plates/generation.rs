use std::collections::VecDeque;

use log::{debug, info, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::surface::SurfaceStore;

use super::types::{Plate, PlateId};

/// Outcome of the plate flood fill.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlateFillStats {
    /// Full-grid infill passes that ran.
    pub passes: usize,
    /// Cells that were still unassigned after the pass bound and got filled breadth-first.
    pub fallback_cells: usize,
}

/// Assign every cell of `surface` to a tectonic plate.
///
/// With `plate_count <= 1` every cell belongs to plate 0 and the random stream is untouched.
/// Otherwise `plate_count` distinct seed cells are drawn, then the grid is swept row by row:
/// each unassigned cell copies the plate of one randomly chosen axis neighbor, which may
/// itself still be unassigned. Sweeps repeat until the grid is full or `max_passes` is hit;
/// anything left after that is claimed by the nearest assigned cell, breadth-first.
pub fn generate_plates(
    surface: &mut SurfaceStore,
    plate_count: i32,
    max_passes: usize,
    rng: &mut ChaCha8Rng,
) -> (Vec<Plate>, PlateFillStats) {
    if plate_count <= 1 {
        for (_, _, cell) in surface.iter_mut() {
            cell.plate = PlateId(0);
        }
        info!("Single-plate planet, skipping flood fill");
        return (vec![Plate::stationary(PlateId(0))], PlateFillStats::default());
    }

    let plate_count = (plate_count as usize).min(surface.len());
    for (_, _, cell) in surface.iter_mut() {
        cell.plate = PlateId::NONE;
    }

    let mut plates = Vec::with_capacity(plate_count);
    for i in 0..plate_count {
        let id = PlateId(i as u16);
        plates.push(Plate::random(id, rng));

        // Seed cells must be distinct, otherwise a plate could vanish before it grows.
        loop {
            let x = rng.gen_range(0..surface.width);
            let y = rng.gen_range(0..surface.height);
            let cell = surface.get_mut(x, y);
            if cell.plate.is_none() {
                cell.plate = id;
                break;
            }
        }
    }

    let mut empty = surface.len() - plate_count;
    let mut stats = PlateFillStats::default();

    while empty > 0 && stats.passes < max_passes {
        for y in 0..surface.height {
            for x in 0..surface.width {
                if !surface.get(x, y).plate.is_none() {
                    continue;
                }

                let candidates = surface.neighbors(x, y);
                let (nx, ny) = candidates[rng.gen_range(0..candidates.len())];
                let plate = surface.get(nx, ny).plate;

                if !plate.is_none() {
                    surface.get_mut(x, y).plate = plate;
                    empty -= 1;
                }
            }
        }
        stats.passes += 1;
        debug!("Plate infill pass {}: {} cells unassigned", stats.passes, empty);
    }

    if empty > 0 {
        warn!(
            "Plate infill stopped after {} passes with {} cells unassigned, finishing breadth-first",
            stats.passes, empty
        );
        stats.fallback_cells = fill_remaining(surface);
    }

    info!(
        "Generated {} plates in {} passes ({} fallback cells)",
        plates.len(),
        stats.passes,
        stats.fallback_cells
    );

    (plates, stats)
}

/// Give every unassigned cell the plate of its nearest assigned cell.
/// Returns the number of cells filled.
fn fill_remaining(surface: &mut SurfaceStore) -> usize {
    let mut queue: VecDeque<(usize, usize)> = surface
        .iter()
        .filter(|(_, _, cell)| !cell.plate.is_none())
        .map(|(x, y, _)| (x, y))
        .collect();

    let mut filled = 0;
    while let Some((x, y)) = queue.pop_front() {
        let plate = surface.get(x, y).plate;
        for (nx, ny) in surface.neighbors(x, y) {
            let neighbor = surface.get_mut(nx, ny);
            if neighbor.plate.is_none() {
                neighbor.plate = plate;
                filled += 1;
                queue.push_back((nx, ny));
            }
        }
    }

    filled
}

/// Number of cells owned by each plate.
pub fn plate_areas(surface: &SurfaceStore, plate_count: usize) -> Vec<usize> {
    let mut areas = vec![0; plate_count];
    for cell in surface.values() {
        if let Some(area) = areas.get_mut(cell.plate.index()) {
            *area += 1;
        }
    }
    areas
}
