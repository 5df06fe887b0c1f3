//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for entities
///
/// Assigned monotonically by the [`EntityArena`](crate::entity::EntityArena)
/// and never reused, even after the entity is swept off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Game turn counter (simulation time unit)
pub type Turn = u64;

/// Depth index of a level; negative means "not on any level"
pub type Depth = i32;

/// Depth carried by entities that have not been placed yet
pub const OFF_GRID_DEPTH: Depth = -1;

/// Grid position as (row, col)
///
/// Signed so that off-grid sentinels and out-of-bounds neighbours are
/// representable; every grid access checks bounds before indexing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Sentinel for entities that are not on a grid
    pub const OFF_GRID: Position = Position { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn is_off_grid(&self) -> bool {
        *self == Self::OFF_GRID
    }

    /// Squared Euclidean distance
    pub fn distance_squared(&self, other: &Self) -> i64 {
        let dr = (self.row - other.row) as i64;
        let dc = (self.col - other.col) as i64;
        dr * dr + dc * dc
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Chebyshev (king-move) distance
    pub fn chebyshev(&self, other: &Self) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// Step one cell in a direction
    pub fn step(&self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self::new(self.row + dr, self.col + dc)
    }

    /// The eight surrounding positions, in [`Direction::RING`] order
    pub fn ring(&self) -> [Position; 8] {
        Direction::RING.map(|d| self.step(d))
    }

    /// The four orthogonal neighbours
    pub fn orthogonal(&self) -> [Position; 4] {
        Direction::ORTHOGONAL.map(|d| self.step(d))
    }
}

impl std::ops::Add for Position {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { row: self.row + rhs.row, col: self.col + rhs.col }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { row: self.row - rhs.row, col: self.col - rhs.col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Compass direction on the grid (north = decreasing row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Clockwise from north; the fixed scan order for one-ring searches
    pub const RING: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const ORTHOGONAL: [Direction; 4] =
        [Direction::North, Direction::South, Direction::West, Direction::East];

    /// (row, col) delta
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Direction whose delta is the sign of `to - from`; `None` when equal
    pub fn toward(from: Position, to: Position) -> Option<Direction> {
        let dr = (to.row - from.row).signum();
        let dc = (to.col - from.col).signum();
        Direction::RING.into_iter().find(|d| d.delta() == (dr, dc))
    }

    pub fn is_diagonal(&self) -> bool {
        let (dr, dc) = self.delta();
        dr != 0 && dc != 0
    }
}
