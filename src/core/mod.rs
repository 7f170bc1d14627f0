pub mod config;
pub mod error;
pub mod types;

pub use config::TacticsConfig;
pub use error::{Result, SwarmError};
pub use types::{PlayerId, Role, Shape, SpiritId, Strategy, StructureId, Tick};
