pub mod borders;
pub mod generation;
pub mod types;

pub use borders::{extend_borders, generate_borders};
pub use generation::{generate_plates, plate_areas, PlateFillStats};
pub use types::{Plate, PlateId, Vec2};
