//! Per-cell surface records shared by every generation pass.

use serde::{Deserialize, Serialize};

use crate::plates::{PlateId, Vec2};
use crate::tilemap::Tilemap;

/// Surface classification of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    Ocean,
    Desert,
    Forest,
    Grass,
    Plains,
    Ice,
    Mountain,
    Rainforest,
}

impl Biome {
    pub const COUNT: usize = 8;

    pub fn all() -> &'static [Biome] {
        &[
            Biome::Ocean,
            Biome::Desert,
            Biome::Forest,
            Biome::Grass,
            Biome::Plains,
            Biome::Ice,
            Biome::Mountain,
            Biome::Rainforest,
        ]
    }

    /// Stable index into per-biome tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Biomes that the smoothing pass never spreads into neighbors.
    pub fn is_hard_boundary(self) -> bool {
        matches!(self, Biome::Ocean | Biome::Mountain | Biome::Ice)
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Biome::Ocean => "ocean",
            Biome::Desert => "desert",
            Biome::Forest => "forest",
            Biome::Grass => "grass",
            Biome::Plains => "plains",
            Biome::Ice => "ice",
            Biome::Mountain => "mountain",
            Biome::Rainforest => "rainforest",
        };
        write!(f, "{}", name)
    }
}

/// Everything the pipeline knows about one 1°×1° cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceCell {
    pub plate: PlateId,
    /// Distance to the nearest plate boundary, capped by the border limit.
    pub border_distance: u32,
    /// Falloff-weighted blend of neighboring plates' motion.
    pub adjacent_direction: Vec2,
    pub height: f32,
    /// Degrees Celsius.
    pub temperature: f32,
    /// Normalized to `0.0..=1.0` once the moisture pass has run.
    pub moisture: f32,
    /// Cosine of the latitude: 1 on the equator, 0 at the poles.
    pub normal_factor: f32,
    pub biome: Biome,
    pub wind: Vec2,
    /// RGBA display color.
    pub color: [u8; 4],
}

impl Default for SurfaceCell {
    fn default() -> Self {
        Self {
            plate: PlateId::NONE,
            border_distance: 0,
            adjacent_direction: Vec2::ZERO,
            height: 0.0,
            temperature: 0.0,
            moisture: 0.0,
            normal_factor: 0.0,
            biome: Biome::Ocean,
            wind: Vec2::ZERO,
            color: [0, 0, 0, 0],
        }
    }
}

/// The owned grid of surface cells mutated in place by the pipeline.
pub type SurfaceStore = Tilemap<SurfaceCell>;

/// Allocate a store and fill in the latitude-derived normal factor.
pub fn new_surface(width: usize, height: usize) -> SurfaceStore {
    Tilemap::from_fn(width, height, |_, y| SurfaceCell {
        normal_factor: latitude_normal(y, height),
        ..SurfaceCell::default()
    })
}

/// Cosine of the latitude at the center of row `y`.
pub fn latitude_normal(y: usize, height: usize) -> f32 {
    let latitude = ((y as f32 + 0.5) / height as f32 - 0.5) * std::f32::consts::PI;
    latitude.cos().max(0.0)
}

/// Latitude of row `y` in degrees, negative in the north (top rows).
pub fn latitude_degrees(y: usize, height: usize) -> f32 {
    ((y as f32 + 0.5) / height as f32 - 0.5) * 180.0
}
