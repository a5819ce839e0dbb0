//! The planet aggregate: runs the generation pipeline once and exposes the result read-only.

use bitflags::bitflags;
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biomes::{self, BiomeColors};
use crate::climate::{self, WindSource};
use crate::config::{GenerationParams, PlanetConfig};
use crate::error::Result;
use crate::heightmap;
use crate::noise_field::build_oracle;
use crate::plates::{self, Plate, PlateFillStats, Vec2};
use crate::seeds::PlanetSeeds;
use crate::star::{HabitableZone, Star};
use crate::surface::{new_surface, SurfaceCell, SurfaceStore};
use crate::tilemap::{Tilemap, GRID_HEIGHT, GRID_WIDTH};
use crate::vegetation;

/// RGBA raster.
pub type ColorGrid = Tilemap<[u8; 4]>;

bitflags! {
    /// Texture layers requested from [`Planet::generate_outputs`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TextureLayers: u8 {
        const COLOR = 1;
        const HEIGHT = 1 << 1;
        const GLOSS = 1 << 2;
    }
}

impl TextureLayers {
    /// Parse a layer name as used on the command line.
    pub fn parse_layer(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "color" => Some(Self::COLOR),
            "height" => Some(Self::HEIGHT),
            "gloss" => Some(Self::GLOSS),
            _ => None,
        }
    }
}

/// Texture layers produced by [`Planet::generate_outputs`]; unrequested layers are `None`.
#[derive(Clone, Debug, Default)]
pub struct TextureOutputs {
    pub color: Option<ColorGrid>,
    pub height: Option<Tilemap<f32>>,
    pub gloss: Option<Tilemap<f32>>,
}

/// Visualizations of intermediate fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugLayer {
    Plates,
    Borders,
    Adjacent,
    Wind,
    Heat,
    Moisture,
    Biome,
}

impl DebugLayer {
    pub fn all() -> &'static [DebugLayer] {
        &[
            DebugLayer::Plates,
            DebugLayer::Borders,
            DebugLayer::Adjacent,
            DebugLayer::Wind,
            DebugLayer::Heat,
            DebugLayer::Moisture,
            DebugLayer::Biome,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            DebugLayer::Plates => "plates",
            DebugLayer::Borders => "borders",
            DebugLayer::Adjacent => "adjacent",
            DebugLayer::Wind => "wind",
            DebugLayer::Heat => "heat",
            DebugLayer::Moisture => "moisture",
            DebugLayer::Biome => "biome",
        }
    }
}

/// Counters collected while generating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationStats {
    pub plate_fill: PlateFillStats,
    pub boundary_cells: usize,
    pub border_sweeps: usize,
    pub smoothed_cells: usize,
}

/// A generated planet. The surface is frozen once construction returns.
pub struct Planet {
    config: PlanetConfig,
    star: Star,
    seeds: PlanetSeeds,
    habitable_zone: HabitableZone,
    plates: Vec<Plate>,
    wind_sources: Vec<WindSource>,
    sealevel: f32,
    biome_colors: BiomeColors,
    stats: GenerationStats,
    surface: SurfaceStore,
}

impl Planet {
    /// Earth-like defaults around Sol with the given master seed.
    pub fn from_seed(config: PlanetConfig, seed: u64) -> Result<Self> {
        Self::generate(
            config,
            Star::sol(),
            PlanetSeeds::from_master(seed),
            &GenerationParams::default(),
        )
    }

    /// Run the full pipeline.
    ///
    /// The shared random stream is consumed in a fixed order: plates, wind sources, heat
    /// jitter, biome smoothing. Fails only on invalid configuration or noise settings.
    pub fn generate(
        config: PlanetConfig,
        star: Star,
        seeds: PlanetSeeds,
        params: &GenerationParams,
    ) -> Result<Self> {
        config.validate()?;
        params.validate()?;
        let height_noise = build_oracle(params.height_noise, seeds.heightmap)?;
        let moisture_noise = build_oracle(params.moisture_noise, seeds.moisture)?;

        info!("Generating planet with {}", seeds);
        let mut rng = ChaCha8Rng::seed_from_u64(seeds.master);
        let mut surface = new_surface(GRID_WIDTH, GRID_HEIGHT);
        let mut stats = GenerationStats::default();
        let habitable_zone = star.habitable_zone();

        // Tectonics
        let (plates, plate_fill) =
            plates::generate_plates(&mut surface, config.plate_count, params.max_infill_passes, &mut rng);
        stats.plate_fill = plate_fill;
        stats.boundary_cells = plates::generate_borders(&mut surface, &plates);
        stats.border_sweeps = plates::extend_borders(&mut surface, params.border_limit);

        // Terrain
        heightmap::generate_heightmap(
            &mut surface,
            height_noise.as_ref(),
            &params.height_bounds,
            params.height_frequency,
        );
        heightmap::apply_tectonics(
            &mut surface,
            &plates,
            params.tectonic_activity,
            params.plate_bias_scale,
        );

        // Climate
        let wind_sources = climate::generate_wind(&mut surface, &mut rng);
        let sealevel = match &config.atmosphere {
            Some(atmosphere) => {
                climate::generate_heat(
                    &mut surface,
                    atmosphere,
                    config.distance_to_star,
                    &habitable_zone,
                    params,
                    &mut rng,
                );
                climate::generate_moisture(
                    &mut surface,
                    moisture_noise.as_ref(),
                    &params.moisture_bounds,
                    params.moisture_frequency,
                );
                climate::calibrate_ocean(&surface, config.distance_to_star, &habitable_zone)
            }
            None => {
                info!("No atmosphere, skipping heat, moisture and oceans");
                0.0
            }
        };

        // Surface
        biomes::classify_biomes(&mut surface, sealevel);
        stats.smoothed_cells = biomes::smooth_biomes(&mut surface, &mut rng);
        vegetation::colorize(&mut surface, &params.biome_colors);

        debug!("Generation stats: {:?}", stats);

        Ok(Self {
            config,
            star,
            seeds,
            habitable_zone,
            plates,
            wind_sources,
            sealevel,
            biome_colors: params.biome_colors.clone(),
            stats,
            surface,
        })
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &PlanetConfig {
        &self.config
    }

    pub fn star(&self) -> &Star {
        &self.star
    }

    pub fn seeds(&self) -> &PlanetSeeds {
        &self.seeds
    }

    pub fn habitable_zone(&self) -> HabitableZone {
        self.habitable_zone
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    pub fn wind_sources(&self) -> &[WindSource] {
        &self.wind_sources
    }

    /// Normalized height below which cells are ocean.
    pub fn sealevel(&self) -> f32 {
        self.sealevel
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn surface(&self) -> &SurfaceStore {
        &self.surface
    }

    pub fn width(&self) -> usize {
        self.surface.width
    }

    pub fn height(&self) -> usize {
        self.surface.height
    }

    /// Cell at signed longitude/latitude, wrapped around the globe.
    pub fn cell(&self, longitude: i32, latitude: i32) -> &SurfaceCell {
        self.surface.get_geo(longitude, latitude)
    }

    /// Raw elevation.
    pub fn height_grid(&self) -> Tilemap<f32> {
        heightmap::heights(&self.surface)
    }

    /// Elevation in `0.0..=1.0`; all zeros when the planet is flat.
    pub fn normalized_height(&self) -> Tilemap<f32> {
        heightmap::normalize_heights(&self.surface)
    }

    /// Final vegetation colors.
    pub fn color_grid(&self) -> ColorGrid {
        self.surface.map(|c| c.color)
    }

    // =========================================================================
    // TEXTURES
    // =========================================================================

    /// Build the requested texture layers.
    pub fn generate_outputs(&self, layers: TextureLayers) -> TextureOutputs {
        TextureOutputs {
            color: layers.contains(TextureLayers::COLOR).then(|| self.color_grid()),
            height: layers.contains(TextureLayers::HEIGHT).then(|| self.height_texture()),
            gloss: layers.contains(TextureLayers::GLOSS).then(|| self.gloss_texture()),
        }
    }

    /// Normalized height with everything under water flattened to the sealevel.
    pub fn height_texture(&self) -> Tilemap<f32> {
        let sealevel = self.sealevel;
        self.normalized_height().map(|&h| h.max(sealevel))
    }

    /// 1 where the surface is shiny (water or soaked ground), 0 elsewhere.
    pub fn gloss_texture(&self) -> Tilemap<f32> {
        let normalized = self.normalized_height();
        Tilemap::from_fn(self.width(), self.height(), |x, y| {
            let wet = self.surface.get(x, y).moisture >= 0.95;
            if *normalized.get(x, y) < self.sealevel || wet {
                1.0
            } else {
                0.0
            }
        })
    }

    // =========================================================================
    // DEBUG LAYERS
    // =========================================================================

    pub fn debug_layer(&self, layer: DebugLayer) -> ColorGrid {
        match layer {
            DebugLayer::Plates => self.plate_colors(),
            DebugLayer::Borders => self.border_distances(),
            DebugLayer::Adjacent => self.adjacent_directions(),
            DebugLayer::Wind => self.wind_directions(),
            DebugLayer::Heat => self.heat_map(),
            DebugLayer::Moisture => self.moisture_map(),
            DebugLayer::Biome => self.biome_map(),
        }
    }

    pub fn plate_colors(&self) -> ColorGrid {
        self.surface.map(|c| match self.plates.get(c.plate.index()) {
            Some(plate) => [plate.color[0], plate.color[1], plate.color[2], 255],
            None => [0, 0, 0, 255],
        })
    }

    /// Border distance as gray, scaled by the largest distance on the planet.
    pub fn border_distances(&self) -> ColorGrid {
        let max = self.surface.values().map(|c| c.border_distance).max().unwrap_or(0);
        self.surface.map(|c| {
            let v = if max == 0 {
                0
            } else {
                (c.border_distance as f32 / max as f32 * 255.0) as u8
            };
            [v, v, v, 255]
        })
    }

    pub fn adjacent_directions(&self) -> ColorGrid {
        self.surface.map(|c| vector_color(c.adjacent_direction))
    }

    pub fn wind_directions(&self) -> ColorGrid {
        self.surface.map(|c| vector_color(c.wind.normalize()))
    }

    /// Temperature from blue (coldest) to red (hottest).
    pub fn heat_map(&self) -> ColorGrid {
        let normalized = self.surface.map(|c| c.temperature).normalized();
        normalized.map(|&t| {
            let r = (t * 255.0) as u8;
            [r, 0, 255 - r, 255]
        })
    }

    pub fn moisture_map(&self) -> ColorGrid {
        self.surface.map(|c| {
            let m = (c.moisture.clamp(0.0, 1.0) * 255.0) as u8;
            [0, m / 2, m, 255]
        })
    }

    /// Unblended base color of each cell's biome.
    pub fn biome_map(&self) -> ColorGrid {
        self.surface.map(|c| {
            let color = self.biome_colors[c.biome];
            [color[0], color[1], color[2], 255]
        })
    }
}

/// Map a vector with components in `-1.0..=1.0` onto red and green.
fn vector_color(v: Vec2) -> [u8; 4] {
    let channel = |c: f32| (((c + 1.0) / 2.0).clamp(0.0, 1.0) * 255.0) as u8;
    [channel(v.x), channel(v.y), 0, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanetError;
    use crate::noise_field::NoiseKind;
    use crate::plates::plate_areas;
    use crate::surface::Biome;

    fn earth(seed: u64) -> Planet {
        Planet::from_seed(PlanetConfig::earth(), seed).unwrap()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = earth(42);
        let b = earth(42);
        assert!(a.surface() == b.surface());
        assert_eq!(a.sealevel(), b.sealevel());
        assert_eq!(a.wind_sources(), b.wind_sources());
    }

    #[test]
    fn test_different_seeds_differ() {
        assert!(earth(1).surface() != earth(2).surface());
    }

    #[test]
    fn test_earth_scenario() {
        let config = PlanetConfig {
            plate_count: 7,
            distance_to_star: 1.0,
            ..PlanetConfig::earth()
        };
        let planet = Planet::from_seed(config, 1).unwrap();

        assert!(planet.sealevel() > 0.0);
        let counts = biomes::biome_histogram(planet.surface());
        assert!(counts[Biome::Ocean.index()] > 0);
        let land_biomes = Biome::all()
            .iter()
            .filter(|&&b| b != Biome::Ocean && counts[b.index()] > 0)
            .count();
        assert!(land_biomes >= 2, "only {} land biomes", land_biomes);

        assert!(planet.color_grid().values().all(|c| c[3] == 255));
    }

    #[test]
    fn test_plate_coverage_and_borders() {
        let planet = earth(5);
        let areas = plate_areas(planet.surface(), 7);
        assert!(areas.iter().all(|&a| a > 0));
        assert_eq!(areas.iter().sum::<usize>(), GRID_WIDTH * GRID_HEIGHT);

        let surface = planet.surface();
        for (x, y, cell) in surface.iter() {
            assert!(cell.border_distance <= 25);
            assert!(cell.border_distance > 0, "({}, {}) has no distance", x, y);
            let boundary = surface
                .neighbors(x, y)
                .iter()
                .any(|&(nx, ny)| surface.get(nx, ny).plate != cell.plate);
            assert_eq!(boundary, cell.border_distance == 1);
        }
    }

    #[test]
    fn test_single_plate_planet() {
        let config = PlanetConfig {
            plate_count: 1,
            ..PlanetConfig::earth()
        };
        let planet = Planet::from_seed(config, 3).unwrap();
        assert_eq!(planet.plates().len(), 1);
        assert!(planet
            .surface()
            .values()
            .all(|c| c.plate.0 == 0 && c.border_distance == 0));
    }

    #[test]
    fn test_no_ocean_outside_habitable_zone() {
        let planet = Planet::from_seed(PlanetConfig::mars(), 7).unwrap();
        assert!(!planet.habitable_zone().contains(1.63));
        assert_eq!(planet.sealevel(), 0.0);
        assert!(planet.surface().values().all(|c| c.biome != Biome::Ocean));
    }

    #[test]
    fn test_airless_planet_skips_climate() {
        let planet = Planet::from_seed(PlanetConfig::mercury(), 7).unwrap();
        assert_eq!(planet.sealevel(), 0.0);
        assert!(planet
            .surface()
            .values()
            .all(|c| c.temperature == 0.0 && c.moisture == 0.0));
        assert!(planet.color_grid().values().all(|c| c[3] == 255));
    }

    #[test]
    fn test_generate_outputs_selects_layers() {
        let planet = earth(11);
        let outputs = planet.generate_outputs(TextureLayers::HEIGHT | TextureLayers::GLOSS);
        assert!(outputs.color.is_none());

        let height = outputs.height.unwrap();
        assert!(height.values().all(|&h| h >= planet.sealevel() && h <= 1.0));

        let gloss = outputs.gloss.unwrap();
        let normalized = planet.normalized_height();
        for (x, y, &g) in gloss.iter() {
            assert!(g == 0.0 || g == 1.0);
            if *normalized.get(x, y) < planet.sealevel() {
                assert_eq!(g, 1.0);
            }
        }

        let all = planet.generate_outputs(TextureLayers::all());
        assert!(all.color.is_some() && all.height.is_some() && all.gloss.is_some());
    }

    #[test]
    fn test_debug_layers_cover_grid() {
        let planet = earth(13);
        for &layer in DebugLayer::all() {
            let grid = planet.debug_layer(layer);
            assert_eq!(grid.width, GRID_WIDTH);
            assert_eq!(grid.height, GRID_HEIGHT);
            assert!(grid.values().all(|c| c[3] == 255), "{} layer", layer.name());
        }
    }

    #[test]
    fn test_layer_names() {
        assert_eq!(TextureLayers::parse_layer("Height"), Some(TextureLayers::HEIGHT));
        assert_eq!(TextureLayers::parse_layer(" gloss "), Some(TextureLayers::GLOSS));
        assert_eq!(TextureLayers::parse_layer("COLOR"), Some(TextureLayers::COLOR));
        assert_eq!(TextureLayers::parse_layer("shine"), None);
    }

    #[test]
    fn test_invalid_noise_size_fails() {
        let params = GenerationParams {
            height_noise: NoiseKind::DiamondSquare { size: 100, roughness: 0.5 },
            ..GenerationParams::default()
        };
        let result = Planet::generate(
            PlanetConfig::earth(),
            Star::sol(),
            PlanetSeeds::from_master(1),
            &params,
        );
        assert!(matches!(result, Err(PlanetError::NoiseGridSize { size: 100 })));
    }

    #[test]
    fn test_diamond_square_heights() {
        let params = GenerationParams {
            height_noise: NoiseKind::DiamondSquare { size: 128, roughness: 0.6 },
            ..GenerationParams::default()
        };
        let planet = Planet::generate(
            PlanetConfig::earth(),
            Star::sol(),
            PlanetSeeds::from_master(1),
            &params,
        )
        .unwrap();
        let (lo, hi) = planet.height_grid().min_max();
        assert!(lo < hi);
    }

    #[test]
    fn test_infinite_jitter_fails_before_generation() {
        let params = GenerationParams {
            temperature_jitter: f32::INFINITY,
            ..GenerationParams::default()
        };
        let result = Planet::generate(
            PlanetConfig::earth(),
            Star::sol(),
            PlanetSeeds::from_master(1),
            &params,
        );
        assert!(matches!(result, Err(PlanetError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_config_fails() {
        let config = PlanetConfig {
            radius: -1.0,
            ..PlanetConfig::earth()
        };
        assert!(matches!(
            Planet::from_seed(config, 1),
            Err(PlanetError::InvalidConfiguration(_))
        ));
    }
}
