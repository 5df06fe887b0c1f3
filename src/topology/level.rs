//! One depth of the dungeon: grid, lighting overlay and random stream

use rand_chacha::ChaCha8Rng;

use crate::core::error::PlacementError;
use crate::core::types::{Depth, EntityId, Position};
use crate::entity::{EntityArena, EntityBuilder};
use crate::spatial::grid::Grid;
use crate::spatial::layer::{GridLayer, PlacementMode, PlacementPolicy};

/// Glyph shown for a cell with nothing in it
pub const EMPTY_GLYPH: char = ' ';

#[derive(Debug, Clone)]
pub struct Level {
    pub grid: GridLayer,
    /// Lit cells; cleared and rebuilt every turn
    pub lighting: Grid<bool>,
    pub rng: ChaCha8Rng,
}

impl Level {
    pub fn new(depth: Depth, height: usize, width: usize, rng: ChaCha8Rng) -> Self {
        Self {
            grid: GridLayer::new(depth, height, width),
            lighting: Grid::new(height, width),
            rng,
        }
    }

    pub fn depth(&self) -> Depth {
        self.grid.depth()
    }

    pub fn lighting(&self) -> &Grid<bool> {
        &self.lighting
    }

    /// Create an entity and place it here
    ///
    /// Anything an overwrite displaces is dropped from the arena. On
    /// failure the new entity is dropped too, so nothing is left off-grid.
    pub fn spawn(
        &mut self,
        entities: &mut EntityArena,
        builder: EntityBuilder,
        pos: Position,
        mode: PlacementMode,
        policy: PlacementPolicy,
    ) -> Result<EntityId, PlacementError> {
        let id = entities.spawn(builder);
        let displaced = match mode {
            PlacementMode::Overwrite if self.grid.within_bounds(pos) => self.grid.clear_cell(pos),
            _ => Vec::new(),
        };

        let placed = match entities.get_mut(id) {
            Some(entity) => self.grid.place(entity, pos, mode, policy),
            None => Err(PlacementError::OutOfBounds(pos)),
        };
        match placed {
            Ok(_) => {
                for gone in displaced {
                    entities.remove(gone);
                }
                Ok(id)
            }
            Err(err) => {
                entities.remove(id);
                Err(err)
            }
        }
    }

    /// Glyph of the top occupant: highest rank, latest placed among equals
    pub fn glyph_at(&self, pos: Position, entities: &EntityArena) -> char {
        self.grid
            .cell_at(pos)
            .iter()
            .enumerate()
            .max_by_key(|(slot, o)| (o.rank, *slot))
            .and_then(|(_, o)| entities.get(o.id))
            .map_or(EMPTY_GLYPH, |e| e.glyph)
    }

    /// The whole level as rows of glyphs
    pub fn render(&self, entities: &EntityArena) -> Vec<String> {
        (0..self.grid.height() as i32)
            .map(|row| {
                (0..self.grid.width() as i32)
                    .map(|col| self.glyph_at(Position::new(row, col), entities))
                    .collect()
            })
            .collect()
    }
}
