pub mod config;
pub mod error;
pub mod types;

pub use config::DungeonConfig;
pub use error::{DelveError, PlacementError, Result, TransferFailure};
pub use types::{Depth, Direction, EntityId, Position, Turn, OFF_GRID_DEPTH};
