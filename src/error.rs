use thiserror::Error;

/// Errors surfaced while configuring or exporting a planet.
///
/// The generation passes themselves never fail; arithmetic edge cases are handled where they occur.
#[derive(Debug, Error)]
pub enum PlanetError {
    #[error("invalid planet configuration: {0}")]
    InvalidConfiguration(String),

    #[error("diamond-square grid size {size} is not a power of two")]
    NoiseGridSize { size: usize },

    #[error("failed to parse planet configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PlanetError>;
