//! Stacked levels and the current-depth pointer

pub mod generation;
pub mod level;

pub use generation::generate;
pub use level::Level;

use crate::core::types::Depth;
use crate::entity::Entity;

/// Ordered levels, index == depth
#[derive(Debug, Clone)]
pub struct LevelTopology {
    levels: Vec<Level>,
    current: Depth,
}

impl LevelTopology {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels, current: 0 }
    }

    pub fn current_depth(&self) -> Depth {
        self.current
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn contains_depth(&self, depth: Depth) -> bool {
        depth >= 0 && (depth as usize) < self.levels.len()
    }

    pub fn level(&self, depth: Depth) -> Option<&Level> {
        usize::try_from(depth).ok().and_then(|d| self.levels.get(d))
    }

    pub fn level_mut(&mut self, depth: Depth) -> Option<&mut Level> {
        usize::try_from(depth).ok().and_then(move |d| self.levels.get_mut(d))
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.level(self.current)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Follow the player to its depth; true if the pointer moved
    pub fn swap_depth(&mut self, player: &Entity) -> bool {
        if player.depth == self.current || !self.contains_depth(player.depth) {
            return false;
        }
        tracing::debug!("current depth {} -> {}", self.current, player.depth);
        self.current = player.depth;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::core::types::EntityId;
    use crate::spatial::layer::OccupancyRank;

    fn topology(count: usize) -> LevelTopology {
        let levels = (0..count)
            .map(|d| Level::new(d as Depth, 3, 3, ChaCha8Rng::seed_from_u64(d as u64)))
            .collect();
        LevelTopology::new(levels)
    }

    #[test]
    fn test_swap_depth_follows_player() {
        let mut topology = topology(2);
        let mut player = Entity::builder("player", '@', OccupancyRank::Creature).build(EntityId(1));

        player.depth = 0;
        assert!(!topology.swap_depth(&player));

        player.depth = 1;
        assert!(topology.swap_depth(&player));
        assert_eq!(topology.current_depth(), 1);
        assert!(!topology.swap_depth(&player));
    }

    #[test]
    fn test_swap_depth_ignores_missing_level() {
        let mut topology = topology(2);
        let mut player = Entity::builder("player", '@', OccupancyRank::Creature).build(EntityId(1));
        player.depth = 5;
        assert!(!topology.swap_depth(&player));
        assert_eq!(topology.current_depth(), 0);
        assert!(topology.level(-1).is_none());
    }
}
