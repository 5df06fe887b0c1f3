//! Grid pathfinding
//!
//! Two searches share one neighbour expansion: Dijkstra over per-cell costs
//! for connectivity carving, and A* over passability for goal-directed
//! moves. Neighbour order is fixed so tie-breaks never vary between runs.

pub mod astar;
pub mod dijkstra;

pub use astar::{targeted_search, PathStatus};
pub use dijkstra::{accumulated_costs, path_cost, uniform_cost_path};

use crate::core::types::{Direction, Position};

static DIAGONALS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

/// Orthogonal neighbours (N, S, W, E), then diagonals when allowed
pub(crate) fn neighbors(pos: Position, allow_diagonal: bool) -> impl Iterator<Item = Position> {
    let diagonals: &'static [Direction] = if allow_diagonal { &DIAGONALS[..] } else { &[] };
    Direction::ORTHOGONAL
        .into_iter()
        .chain(diagonals.iter().copied())
        .map(move |d| pos.step(d))
}
