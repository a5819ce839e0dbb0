//! Display colors from biomes.

use log::info;

use crate::biomes::{window_offsets, BiomeColors};
use crate::surface::{Biome, SurfaceStore};
use crate::tilemap::Tilemap;

/// Color every cell from its biome.
///
/// Ocean takes the ocean color as is. Land averages the colors of the non-ocean biomes in its
/// 6×6 window and mixes that half and half with its own biome color. Every cell ends up opaque.
pub fn colorize(surface: &mut SurfaceStore, colors: &BiomeColors) {
    let biomes: Tilemap<Biome> = surface.map(|c| c.biome);

    for y in 0..surface.height {
        for x in 0..surface.width {
            let biome = *biomes.get(x, y);
            let color = if biome == Biome::Ocean {
                colors[Biome::Ocean]
            } else {
                let own = colors[biome];
                let average = window_average(&biomes, x, y, colors).unwrap_or(own);
                blend(own, average)
            };
            surface.get_mut(x, y).color = [color[0], color[1], color[2], 255];
        }
    }

    info!("Colorized {} cells", surface.len());
}

/// Mean color of the land biomes in the window around `(x, y)`.
fn window_average(biomes: &Tilemap<Biome>, x: usize, y: usize, colors: &BiomeColors) -> Option<[u8; 3]> {
    let mut sum = [0u32; 3];
    let mut count = 0u32;

    for (dx, dy) in window_offsets() {
        let (nx, ny) = biomes.offset(x, y, dx, dy);
        let biome = *biomes.get(nx, ny);
        if biome == Biome::Ocean {
            continue;
        }
        for (s, &v) in sum.iter_mut().zip(colors[biome].iter()) {
            *s += v as u32;
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some(sum.map(|s| (s / count) as u8))
}

fn blend(a: [u8; 3], b: [u8; 3]) -> [u8; 3] {
    [
        ((a[0] as u16 + b[0] as u16) / 2) as u8,
        ((a[1] as u16 + b[1] as u16) / 2) as u8,
        ((a[2] as u16 + b[2] as u16) / 2) as u8,
    ]
}
