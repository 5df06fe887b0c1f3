//! Per-level stacked-entity spatial store
//!
//! Each cell holds an ordered stack of occupants. Insertion order is display
//! order only. Floors and objects stack freely; at most one occupant of rank
//! Creature or Wall may hold a cell at a time.

use serde::{Deserialize, Serialize};

use crate::core::error::PlacementError;
use crate::core::types::{Depth, EntityId, Position};
use crate::entity::Entity;
use crate::spatial::grid::Grid;

/// Stacking category of an entity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum OccupancyRank {
    #[default]
    Floor = 0,
    Object = 1,
    Creature = 2,
    Wall = 3,
}

impl OccupancyRank {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Floors and objects may share a cell with anything
    pub fn is_stackable(self) -> bool {
        self <= OccupancyRank::Object
    }
}

/// One entry in a cell's stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: EntityId,
    pub rank: OccupancyRank,
}

/// Cached location of an entity inside a grid
///
/// `slot` is a hint: removing an earlier occupant compacts the cell and
/// shifts later slots down, so it must be re-validated before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridIndex {
    pub depth: Depth,
    pub position: Position,
    pub slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Push onto the cell's stack, subject to rank rules
    Append,
    /// Replace everything in the cell
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// Only the requested cell
    Exact,
    /// The requested cell, then its one-ring in clockwise order
    NearestFree,
}

/// Stacked-entity grid for one depth
#[derive(Debug, Clone)]
pub struct GridLayer {
    depth: Depth,
    height: usize,
    width: usize,
    cells: Vec<Vec<Occupant>>,
}

impl GridLayer {
    pub fn new(depth: Depth, height: usize, width: usize) -> Self {
        Self {
            depth,
            height,
            width,
            cells: vec![Vec::new(); height * width],
        }
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn within_bounds(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.height
            && (pos.col as usize) < self.width
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        if self.within_bounds(pos) {
            Some(pos.row as usize * self.width + pos.col as usize)
        } else {
            None
        }
    }

    /// Ordered occupants of a cell; empty outside the grid
    pub fn cell_at(&self, pos: Position) -> &[Occupant] {
        match self.index(pos) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// Highest rank in the cell (Floor if empty)
    ///
    /// Positions outside the grid report Wall: nothing may enter them.
    pub fn occupancy_rank(&self, pos: Position) -> OccupancyRank {
        match self.index(pos) {
            Some(i) => self.cells[i]
                .iter()
                .map(|o| o.rank)
                .max()
                .unwrap_or(OccupancyRank::Floor),
            None => OccupancyRank::Wall,
        }
    }

    /// Could an occupant of `rank` be appended at `pos`?
    pub fn fits(&self, rank: OccupancyRank, pos: Position) -> bool {
        if !self.within_bounds(pos) {
            return false;
        }
        // Creatures and walls need the cell free of other creatures and
        // walls, which also means they outrank everything already there
        rank.is_stackable() || self.occupancy_rank(pos) < OccupancyRank::Creature
    }

    /// Place an entity and record where it landed
    ///
    /// The entity must not currently be on any grid; callers detach first.
    pub fn place(
        &mut self,
        entity: &mut Entity,
        pos: Position,
        mode: PlacementMode,
        policy: PlacementPolicy,
    ) -> Result<Position, PlacementError> {
        let Some(index) = self.index(pos) else {
            return Err(PlacementError::OutOfBounds(pos));
        };

        let occupant = Occupant { id: entity.id, rank: entity.rank };

        if mode == PlacementMode::Overwrite {
            self.cells[index] = vec![occupant];
            entity.set_grid_index(GridIndex { depth: self.depth, position: pos, slot: 0 });
            return Ok(pos);
        }

        let target = match policy {
            PlacementPolicy::Exact => Some(pos).filter(|p| self.fits(entity.rank, *p)),
            PlacementPolicy::NearestFree => std::iter::once(pos)
                .chain(pos.ring())
                .find(|p| self.fits(entity.rank, *p)),
        };
        let Some(target) = target else {
            return Err(PlacementError::RankTooLow(pos));
        };

        let cell = &mut self.cells[target.row as usize * self.width + target.col as usize];
        cell.push(occupant);
        let slot = cell.len() - 1;
        entity.set_grid_index(GridIndex { depth: self.depth, position: target, slot });
        tracing::trace!("placed {} ({}) at {} slot {}", entity.name, entity.id, target, slot);
        Ok(target)
    }

    /// Remove an entity from the cell its cached index names
    ///
    /// The cached slot is checked by identity first and the cell searched
    /// if it has gone stale. Returns false (a no-op) when the entity is no
    /// longer in that cell, e.g. an earlier cascade already removed it.
    pub fn detach(&mut self, entity: &mut Entity) -> bool {
        let Some(grid_index) = entity.grid_index else {
            return false;
        };
        if grid_index.depth != self.depth {
            return false;
        }
        let Some(index) = self.index(grid_index.position) else {
            entity.clear_grid_index();
            return false;
        };

        let cell = &mut self.cells[index];
        let slot = match cell.get(grid_index.slot) {
            Some(occupant) if occupant.id == entity.id => Some(grid_index.slot),
            _ => cell.iter().position(|o| o.id == entity.id),
        };

        entity.clear_grid_index();
        match slot {
            Some(slot) => {
                cell.remove(slot);
                true
            }
            None => false,
        }
    }

    /// Drop every occupant of a cell, returning their ids
    pub fn clear_cell(&mut self, pos: Position) -> Vec<EntityId> {
        match self.index(pos) {
            Some(i) => std::mem::take(&mut self.cells[i]).into_iter().map(|o| o.id).collect(),
            None => Vec::new(),
        }
    }

    pub fn contains(&self, id: EntityId, pos: Position) -> bool {
        self.cell_at(pos).iter().any(|o| o.id == id)
    }

    /// Every occupant in row-major, then stack order
    pub fn occupants(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.cells.iter().flat_map(|cell| cell.iter().map(|o| o.id))
    }

    /// Single-value snapshot: the max rank per cell
    pub fn occupancy_snapshot(&self) -> Grid<u8> {
        let mut grid = Grid::new(self.height, self.width);
        for pos in grid.positions().collect::<Vec<_>>() {
            grid.set(pos, self.occupancy_rank(pos).value());
        }
        grid
    }
}
