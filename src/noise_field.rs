//! Deterministic noise sources consumed by the height and moisture passes.
//!
//! Both sources are sampled through [`NoiseOracle`], which returns values in roughly
//! `-1.0..=1.0` and always gives the same answer for the same seed and arguments.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PlanetError, Result};
use crate::tilemap::Tilemap;

/// Region of noise space that one tile of the output wraps around.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub begin_x: f64,
    pub end_x: f64,
    pub begin_y: f64,
    pub end_y: f64,
}

impl TileBounds {
    pub fn square(begin: f64, end: f64) -> Self {
        Self {
            begin_x: begin,
            end_x: end,
            begin_y: begin,
            end_y: end,
        }
    }
}

/// A seeded, deterministic 2D noise field that tiles seamlessly in both directions.
pub trait NoiseOracle {
    /// Sample fractal noise at grid cell `(x, y)` of a `width`×`height` tile.
    fn sample_tileable_fbm(
        &self,
        x: usize,
        y: usize,
        bounds: &TileBounds,
        width: f64,
        height: f64,
        frequency: f64,
    ) -> f64;
}

/// Which noise primitive backs a field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NoiseKind {
    /// Fractal Brownian motion over 4D gradient noise mapped onto a torus.
    #[default]
    Fbm,
    /// Midpoint displacement on a `size`×`size` grid; `size` must be a power of two.
    DiamondSquare { size: usize, roughness: f32 },
}

/// Build the oracle described by `kind`.
pub fn build_oracle(kind: NoiseKind, seed: u64) -> Result<Box<dyn NoiseOracle>> {
    match kind {
        NoiseKind::Fbm => Ok(Box::new(TileableFbm::new(seed, 6, 0.5))),
        NoiseKind::DiamondSquare { size, roughness } => {
            Ok(Box::new(DiamondSquare::generate(size, roughness, seed)?))
        }
    }
}

// =============================================================================
// TILEABLE FBM
// =============================================================================

/// Fractal noise that wraps in x and y by walking two circles through 4D noise.
pub struct TileableFbm {
    octaves: Vec<Perlin>,
    persistence: f64,
}

impl TileableFbm {
    pub fn new(seed: u64, octave_count: usize, persistence: f64) -> Self {
        let octaves = (0..octave_count.max(1))
            .map(|i| Perlin::new((seed as u32).wrapping_add(i as u32)))
            .collect();
        Self { octaves, persistence }
    }
}

impl NoiseOracle for TileableFbm {
    fn sample_tileable_fbm(
        &self,
        x: usize,
        y: usize,
        bounds: &TileBounds,
        width: f64,
        height: f64,
        frequency: f64,
    ) -> f64 {
        use std::f64::consts::TAU;

        let s = x as f64 / width;
        let t = y as f64 / height;
        let dx = bounds.end_x - bounds.begin_x;
        let dy = bounds.end_y - bounds.begin_y;

        // One full circle per axis, so the first and last column (and row) meet.
        let nx = bounds.begin_x + (s * TAU).cos() * dx / TAU;
        let ny = bounds.begin_y + (t * TAU).cos() * dy / TAU;
        let nz = bounds.begin_x + (s * TAU).sin() * dx / TAU;
        let nw = bounds.begin_y + (t * TAU).sin() * dy / TAU;

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut freq = frequency;
        let mut max_value = 0.0;

        for octave in &self.octaves {
            total += amplitude * octave.get([nx * freq, ny * freq, nz * freq, nw * freq]);
            max_value += amplitude;
            amplitude *= self.persistence;
            freq *= 2.0;
        }

        if max_value > 0.0 {
            (total / max_value).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

// =============================================================================
// DIAMOND-SQUARE
// =============================================================================

/// A precomputed diamond-square grid sampled as a repeating tile.
pub struct DiamondSquare {
    grid: Tilemap<f32>,
    size: usize,
}

impl DiamondSquare {
    /// Run midpoint displacement on a `(size + 1)`² grid with corners at 0.
    ///
    /// The displacement range shrinks with each subdivision; `roughness` scales it.
    /// Values are rescaled so the largest magnitude is 1.
    pub fn generate(size: usize, roughness: f32, seed: u64) -> Result<Self> {
        if size < 2 || !size.is_power_of_two() {
            return Err(PlanetError::NoiseGridSize { size });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let s = size;
        let mut grid = Tilemap::new_with(s + 1, s + 1, 0.0f32);

        let mut step = s;
        while step > 1 {
            let half = step / 2;
            let amount = 2.0 * roughness * (step as f32 / s as f32);

            // Diamond step: centers from the four corners
            for y in (0..s).step_by(step) {
                for x in (0..s).step_by(step) {
                    let avg = (*grid.get(x, y)
                        + *grid.get(x + step, y)
                        + *grid.get(x, y + step)
                        + *grid.get(x + step, y + step))
                        / 4.0;
                    grid.set(x + half, y + half, avg + jitter(&mut rng, amount));
                }
            }

            // Square step: edge midpoints from corners, center and the neighboring center
            for y in (0..s).step_by(step) {
                for x in (0..s).step_by(step) {
                    let s0 = *grid.get(x, y);
                    let s1 = *grid.get(x + step, y);
                    let s2 = *grid.get(x, y + step);
                    let s3 = *grid.get(x + step, y + step);
                    let center = *grid.get(x + half, y + half);

                    let top = if y == 0 {
                        (s0 + s1 + center) / 3.0
                    } else {
                        (s0 + s1 + center + *grid.get(x + half, y - half)) / 4.0
                    };
                    let left = if x == 0 {
                        (s0 + center + s2) / 3.0
                    } else {
                        (s0 + center + s2 + *grid.get(x - half, y + half)) / 4.0
                    };
                    let right = if x + step >= s {
                        (s1 + center + s3) / 3.0
                    } else {
                        (s1 + center + s3 + *grid.get(x + step + half, y + half)) / 4.0
                    };
                    let bottom = if y + step >= s {
                        (center + s2 + s3) / 3.0
                    } else {
                        (center + s2 + s3 + *grid.get(x + half, y + step + half)) / 4.0
                    };

                    grid.set(x + half, y, top + jitter(&mut rng, amount));
                    grid.set(x, y + half, left + jitter(&mut rng, amount));
                    grid.set(x + step, y + half, right + jitter(&mut rng, amount));
                    grid.set(x + half, y + step, bottom + jitter(&mut rng, amount));
                }
            }

            step = half;
        }

        let max_abs = grid.values().fold(0.0f32, |m, v| m.max(v.abs()));
        if max_abs > 0.0 {
            grid = grid.map(|v| v / max_abs);
        }

        Ok(Self { grid, size })
    }
}

fn jitter(rng: &mut ChaCha8Rng, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.gen_range(-amount..amount)
    } else {
        0.0
    }
}

impl NoiseOracle for DiamondSquare {
    /// Tile bounds are ignored; `frequency` sets how many times the grid repeats across the tile.
    fn sample_tileable_fbm(
        &self,
        x: usize,
        y: usize,
        _bounds: &TileBounds,
        width: f64,
        height: f64,
        frequency: f64,
    ) -> f64 {
        let u = (x as f64 / width * frequency).rem_euclid(1.0);
        let v = (y as f64 / height * frequency).rem_euclid(1.0);
        let gx = ((u * self.size as f64) as usize).min(self.size - 1);
        let gy = ((v * self.size as f64) as usize).min(self.size - 1);
        *self.grid.get(gx, gy) as f64
    }
}
