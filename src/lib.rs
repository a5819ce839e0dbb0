//! Planet surface generation library
//!
//! Builds a 360×180 planetary surface: tectonic plates, terrain, climate, biomes and
//! vegetation colors, exposed through [`planet::Planet`].

pub mod biomes;
pub mod climate;
pub mod config;
pub mod error;
pub mod export;
pub mod heightmap;
pub mod noise_field;
pub mod planet;
pub mod plates;
pub mod seeds;
pub mod star;
pub mod surface;
pub mod tilemap;
pub mod vegetation;

pub use config::{Atmosphere, GenerationParams, PlanetConfig};
pub use error::{PlanetError, Result};
pub use planet::{DebugLayer, Planet, TextureLayers, TextureOutputs};
pub use seeds::PlanetSeeds;
pub use star::{HabitableZone, SpectralClass, Star};
