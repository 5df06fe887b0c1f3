//! Spatial storage and visibility

pub mod grid;
pub mod layer;
pub mod shadowcast;

pub use grid::Grid;
pub use layer::{GridIndex, GridLayer, OccupancyRank, Occupant, PlacementMode, PlacementPolicy};
pub use shadowcast::compute_visible;
