use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use log::debug;

use crate::error::Result;
use crate::planet::{ColorGrid, DebugLayer, Planet, TextureOutputs};
use crate::tilemap::Tilemap;

// =============================================================================
// RENDERING
// =============================================================================

/// RGBA grid to image, one pixel per cell.
pub fn render_color_grid(grid: &ColorGrid) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(grid.width as u32, grid.height as u32);
    for (x, y, &color) in grid.iter() {
        img.put_pixel(x as u32, y as u32, Rgba(color));
    }
    img
}

/// Scalar grid in `0.0..=1.0` to grayscale. Out-of-range values are clamped.
pub fn render_grayscale(grid: &Tilemap<f32>) -> GrayImage {
    let mut img: GrayImage = ImageBuffer::new(grid.width as u32, grid.height as u32);
    for (x, y, &v) in grid.iter() {
        img.put_pixel(x as u32, y as u32, Luma([(v.clamp(0.0, 1.0) * 255.0) as u8]));
    }
    img
}

/// Normalized heights through a spectral colormap, for quick inspection.
pub fn render_height_preview(heights: &Tilemap<f32>) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(heights.width as u32, heights.height as u32);
    for (x, y, &v) in heights.iter() {
        img.put_pixel(x as u32, y as u32, Rgb(spectral_colormap(v.clamp(0.0, 1.0))));
    }
    img
}

/// Spectral colormap: dark blue -> teal -> yellow -> orange -> dark red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let scaled = t * 10.0;
    let idx = (scaled as usize).min(9);
    let frac = scaled - idx as f32;
    let (c1, c2) = (colors[idx], colors[idx + 1]);

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

// =============================================================================
// FILE EXPORT
// =============================================================================

/// Write every generated texture layer into `dir` as `<name>.png`. Returns the written paths.
pub fn export_outputs(outputs: &TextureOutputs, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if let Some(color) = &outputs.color {
        let path = dir.join("color.png");
        render_color_grid(color).save(&path)?;
        written.push(path);
    }
    if let Some(height) = &outputs.height {
        let path = dir.join("height.png");
        render_grayscale(height).save(&path)?;
        written.push(path);
    }
    if let Some(gloss) = &outputs.gloss {
        let path = dir.join("gloss.png");
        render_grayscale(gloss).save(&path)?;
        written.push(path);
    }

    debug!("Wrote {} texture layers to {}", written.len(), dir.display());
    Ok(written)
}

/// Write all debug layers plus a height preview into `dir` as `debug_<layer>.png`.
pub fn export_debug_layers(planet: &Planet, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for &layer in DebugLayer::all() {
        let path = dir.join(format!("debug_{}.png", layer.name()));
        render_color_grid(&planet.debug_layer(layer)).save(&path)?;
        written.push(path);
    }

    let path = dir.join("debug_height.png");
    render_height_preview(&planet.normalized_height()).save(&path)?;
    written.push(path);

    debug!("Wrote {} debug layers to {}", written.len(), dir.display());
    Ok(written)
}
