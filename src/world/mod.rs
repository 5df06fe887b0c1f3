//! The dungeon: every entity plus every level
//!
//! The scheduler advances a [`Dungeon`]; grids hold ids, the arena holds
//! the entities they name.

use rand_chacha::ChaCha8Rng;

use crate::content;
use crate::core::config::DungeonConfig;
use crate::core::error::{DelveError, Result};
use crate::core::types::{Depth, EntityId, Position};
use crate::entity::{Entity, EntityArena, EntityBuilder};
use crate::spatial::layer::{PlacementMode, PlacementPolicy};
use crate::topology::{self, Level, LevelTopology};

#[derive(Debug)]
pub struct Dungeon {
    pub entities: EntityArena,
    pub topology: LevelTopology,
}

impl Dungeon {
    pub fn new(entities: EntityArena, topology: LevelTopology) -> Self {
        Self { entities, topology }
    }

    /// Generate every level from the session RNG
    pub fn generate(config: &DungeonConfig, rng: &mut ChaCha8Rng) -> Result<Self> {
        let mut entities = EntityArena::new();
        let topology = topology::generate(config, rng, &mut entities)?;
        Ok(Self::new(entities, topology))
    }

    /// Create the player at the configured start on depth 0
    pub fn add_player(&mut self, config: &DungeonConfig) -> Result<EntityId> {
        self.spawn_at(
            content::player(config),
            0,
            config.player_start,
            PlacementMode::Append,
            PlacementPolicy::NearestFree,
        )
    }

    /// Create an entity directly on a level
    pub fn spawn_at(
        &mut self,
        builder: EntityBuilder,
        depth: Depth,
        pos: Position,
        mode: PlacementMode,
        policy: PlacementPolicy,
    ) -> Result<EntityId> {
        let level = self
            .topology
            .level_mut(depth)
            .ok_or(DelveError::InvalidDepth(depth))?;
        Ok(level.spawn(&mut self.entities, builder, pos, mode, policy)?)
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(id).ok_or(DelveError::EntityNotFound(id))
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.topology.current_level()
    }

    /// Point the topology at the player's depth; true if it changed
    pub fn swap_depth(&mut self, player: EntityId) -> bool {
        match self.entities.get(player) {
            Some(entity) => self.topology.swap_depth(entity),
            None => false,
        }
    }

    /// Glyph rows for the current level
    pub fn render_current(&self) -> Vec<String> {
        self.current_level()
            .map(|level| level.render(&self.entities))
            .unwrap_or_default()
    }
}
