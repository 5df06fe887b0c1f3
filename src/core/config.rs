//! Dungeon configuration with documented constants
//!
//! All generation knobs are collected here with explanations of their
//! purpose and how they interact with each other. Values can be loaded from
//! TOML; any field left out of the file keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DelveError, Result};
use crate::core::types::Position;
use crate::entity::FovMemory;

/// Configuration for dungeon generation and the default player setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    // === LEVEL SHAPE ===
    /// Rows per level, including the surrounding wall
    pub height: usize,

    /// Columns per level, including the surrounding wall
    pub width: usize,

    /// Number of stacked levels
    ///
    /// Every consecutive pair is joined by a stairwell with a carved
    /// corridor, so the player can always reach the deepest level.
    pub depth_count: usize,

    // === WALL SHAPES ===
    /// Scatter rotated wall shapes (L, plus, line, corner) over the floor
    pub wall_shapes: bool,

    /// Wall cells to place before shape scattering stops
    ///
    /// Only cells that actually turn into walls count; overlaps and cells
    /// landing on the border do not.
    pub min_wall_cells: usize,

    /// Hard cap on full-grid scattering passes
    ///
    /// Small levels may never reach `min_wall_cells`; this bounds the work.
    pub max_wall_passes: u32,

    /// Percent chance (roll 1-100 below this) that a cell anchors a shape
    pub wall_shape_chance: u32,

    // === POPULATION ===
    /// Percent chance that an empty floor cell receives a light
    pub light_chance: u32,

    /// Percent chance that an empty floor cell receives a monster
    pub monster_chance: u32,

    // === CARVING ===
    /// Traversal cost of border cells when carving stair corridors
    ///
    /// Interior cells cost their occupancy rank (floor 0, wall 3). The
    /// border must cost more than any interior detour so corridors never
    /// break the outer wall.
    pub border_cost: u32,

    // === PLAYER ===
    /// Where the player starts on depth 0
    pub player_start: Position,

    /// Shadowcasting radius for the player's field of view
    pub player_sight_radius: i32,

    /// Starting and maximum player health
    pub player_health: i32,

    /// What the player keeps in mind once a cell leaves view
    pub player_fov_memory: FovMemory,

    // === SESSION ===
    /// Seed for the session RNG; each level derives its own stream from it
    pub seed: u64,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            height: 10,
            width: 20,
            depth_count: 2,

            wall_shapes: true,
            min_wall_cells: 45,
            max_wall_passes: 100,
            wall_shape_chance: 10,

            light_chance: 3,
            monster_chance: 3,

            border_cost: 1000,

            player_start: Position::new(1, 1),
            player_sight_radius: 4,
            player_health: 6,
            player_fov_memory: FovMemory::Objects,

            seed: 12345,
        }
    }
}

impl DungeonConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DungeonConfig = toml::from_str(content)?;
        config.validate().map_err(DelveError::Config)?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        // Need at least one interior cell inside the border
        if self.height < 3 || self.width < 3 {
            return Err(format!(
                "level must be at least 3x3, got {}x{}",
                self.height, self.width
            ));
        }

        if self.depth_count == 0 {
            return Err("depth_count must be at least 1".into());
        }

        for (name, chance) in [
            ("wall_shape_chance", self.wall_shape_chance),
            ("light_chance", self.light_chance),
            ("monster_chance", self.monster_chance),
        ] {
            if chance > 100 {
                return Err(format!("{} ({}) must be a percentage", name, chance));
            }
        }

        let start = self.player_start;
        if start.row <= 0
            || start.col <= 0
            || start.row >= self.height as i32 - 1
            || start.col >= self.width as i32 - 1
        {
            return Err(format!("player_start {} must be an interior cell", start));
        }

        if self.player_sight_radius < 0 {
            return Err("player_sight_radius must not be negative".into());
        }

        Ok(())
    }
}
