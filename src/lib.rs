//! Delve - tile-based dungeon simulation kernel
//!
//! Stacked entities on multi-level grids, advanced one turn at a time by an
//! energy-budget scheduler, with shadowcast visibility and grid
//! pathfinding.

pub mod content;
pub mod core;
pub mod entity;
pub mod pathfinding;
pub mod spatial;
pub mod topology;
pub mod turn;
pub mod world;

pub use crate::core::{DelveError, DungeonConfig, Result};
pub use crate::turn::{Intent, TurnLog, TurnScheduler};
pub use crate::world::Dungeon;
