//! Distance-to-boundary field and the blended motion of neighboring plates.

use log::{debug, info};

use crate::surface::SurfaceStore;

use super::types::{Plate, Vec2};

/// Mark boundary cells and record the motion of the plates they touch.
///
/// A cell gets distance 1 when any axis neighbor belongs to another plate, 0 otherwise.
/// Its adjacent direction is the mean motion of every differing neighbor (a plate touching
/// from two sides counts twice). Returns the number of boundary cells.
pub fn generate_borders(surface: &mut SurfaceStore, plates: &[Plate]) -> usize {
    let mut boundary_cells = 0;

    for y in 0..surface.height {
        for x in 0..surface.width {
            let plate = surface.get(x, y).plate;

            let others: Vec<Vec2> = surface
                .neighbors(x, y)
                .iter()
                .map(|&(nx, ny)| surface.get(nx, ny).plate)
                .filter(|&other| other != plate)
                .filter_map(|other| plates.get(other.index()).map(|p| p.motion))
                .collect();

            let cell = surface.get_mut(x, y);
            cell.border_distance = if others.is_empty() { 0 } else { 1 };
            cell.adjacent_direction = Vec2::mean(&others);
            if !others.is_empty() {
                boundary_cells += 1;
            }
        }
    }

    debug!("Marked {} plate boundary cells", boundary_cells);
    boundary_cells
}

/// Grow the boundary distances inward as a wavefront until every cell has one.
///
/// Each sweep looks for undecided cells (distance 0) touching the current ring. Such a cell
/// joins the next ring, `min(ring + 1, limit)`, and inherits the mean adjacent direction of
/// the neighbors on the ring, weakened by `1 - ring / limit`. The ring advances once per sweep
/// and stops at `limit`, so the far interior of large plates all ends up at `limit`.
///
/// Nothing happens on a surface without boundaries. Returns the number of sweeps.
pub fn extend_borders(surface: &mut SurfaceStore, limit: u32) -> usize {
    let limit = limit.max(1);
    let mut undecided = surface.values().filter(|c| c.border_distance == 0).count();

    if undecided == surface.len() {
        debug!("No plate boundaries, nothing to extend");
        return 0;
    }

    let mut ring = 1u32;
    let mut sweeps = 0;

    while undecided > 0 {
        let mut claimed = 0;

        for y in 0..surface.height {
            for x in 0..surface.width {
                if surface.get(x, y).border_distance > 0 {
                    continue;
                }

                let reached: Vec<Vec2> = surface
                    .neighbors(x, y)
                    .iter()
                    .map(|&(nx, ny)| surface.get(nx, ny))
                    .filter(|n| n.border_distance == ring)
                    .map(|n| n.adjacent_direction)
                    .collect();

                if reached.is_empty() {
                    continue;
                }

                let falloff = 1.0 - ring as f32 / limit as f32;
                let cell = surface.get_mut(x, y);
                cell.border_distance = (ring + 1).min(limit);
                cell.adjacent_direction = Vec2::mean(&reached) * falloff;
                claimed += 1;
            }
        }

        undecided -= claimed;
        sweeps += 1;

        // At the limit the ring can no longer move; a sweep that claims nothing would repeat forever.
        if claimed == 0 && ring == limit {
            break;
        }
        ring = (ring + 1).min(limit);
    }

    info!(
        "Extended plate borders to limit {} in {} sweeps ({} cells undecided)",
        limit, sweeps, undecided
    );
    sweeps
}
