use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use planet_surface::biomes::biome_histogram;
use planet_surface::export;
use planet_surface::surface::Biome;
use planet_surface::{
    GenerationParams, Planet, PlanetConfig, PlanetError, PlanetSeeds, Star, TextureLayers,
};

#[derive(Parser, Debug)]
#[command(name = "planet_surface")]
#[command(about = "Generate planetary surface textures with plates, climate and biomes")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of tectonic plates (overrides the preset or config file)
    #[arg(short = 'p', long)]
    plates: Option<i32>,

    /// Planet preset: earth, mars, mercury or venus
    #[arg(long, default_value = "earth")]
    preset: String,

    /// Planet configuration JSON (takes precedence over --preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Distance to the star in AU (overrides the preset or config file)
    #[arg(short, long)]
    distance: Option<f32>,

    /// Output directory for the PNG layers
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Comma separated texture layers to write: color, height, gloss
    #[arg(short, long, value_delimiter = ',', default_values = ["color", "height", "gloss"])]
    layers: Vec<String>,

    /// Also write plates, borders, adjacent, wind, heat, moisture and biome debug images
    #[arg(long)]
    debug_layers: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), PlanetError> {
    let mut config = match &args.config {
        Some(path) => PlanetConfig::from_json_file(path)?,
        None => PlanetConfig::preset(&args.preset).ok_or_else(|| {
            PlanetError::InvalidConfiguration(format!("unknown preset '{}'", args.preset))
        })?,
    };
    if let Some(plates) = args.plates {
        config.plate_count = plates;
    }
    if let Some(distance) = args.distance {
        config.distance_to_star = distance;
    }

    let mut layers = TextureLayers::empty();
    for name in &args.layers {
        layers |= TextureLayers::parse_layer(name).ok_or_else(|| {
            PlanetError::InvalidConfiguration(format!("unknown texture layer '{}'", name))
        })?;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating planet with seed: {}", seed);
    println!(
        "Distance to star: {} AU, {} plates, atmosphere: {}",
        config.distance_to_star,
        config.plate_count.max(1),
        if config.atmosphere.is_some() { "yes" } else { "no" }
    );

    let planet = Planet::generate(
        config,
        Star::sol(),
        PlanetSeeds::from_master(seed),
        &GenerationParams::default(),
    )?;

    let zone = planet.habitable_zone();
    println!("Habitable zone: {:.3} - {:.3} AU", zone.min, zone.max);
    println!("Sealevel: {:.3}", planet.sealevel());

    let counts = biome_histogram(planet.surface());
    let total = planet.surface().len() as f64;
    for &biome in Biome::all() {
        let count = counts[biome.index()];
        if count > 0 {
            println!("  {:<12} {:>6} ({:.1}%)", biome.to_string(), count, 100.0 * count as f64 / total);
        }
    }

    let outputs = planet.generate_outputs(layers);
    for path in export::export_outputs(&outputs, &args.output)? {
        println!("Wrote {}", path.display());
    }

    if args.debug_layers {
        for path in export::export_debug_layers(&planet, &args.output)? {
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
