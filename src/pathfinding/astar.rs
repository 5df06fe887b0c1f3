//! A* goal-directed search over a passability grid
//!
//! Every step costs 1, diagonal or not, and the heuristic is the Euclidean
//! distance to the goal. On open ground this matches the Chebyshev-optimal
//! path length; around obstacles the Euclidean heuristic can overestimate,
//! so paths are short but not guaranteed minimal.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::Position;
use crate::pathfinding::neighbors;
use crate::spatial::grid::Grid;

/// Outcome of a targeted search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStatus {
    Found,
    /// Start or end lies outside the grid
    InvalidEndpoint,
    /// Start or end is not passable
    BlockedEndpoint,
    AlreadyAtTarget,
    NoPath,
}

/// Node in the A* open set: (f, insertion order, position, g)
type OpenNode = Reverse<(OrderedFloat<f64>, u64, Position, u32)>;

/// Find a path from `start` to `end` through passable cells
///
/// Endpoint checks run before any search work: out-of-grid endpoints,
/// identical endpoints and impassable endpoints return immediately. The
/// path is empty unless the status is `Found` (start to end inclusive) or
/// `AlreadyAtTarget` (just the start).
pub fn targeted_search(
    passable: &Grid<bool>,
    start: Position,
    end: Position,
) -> (PathStatus, Vec<Position>) {
    if !passable.in_bounds(start) || !passable.in_bounds(end) {
        return (PathStatus::InvalidEndpoint, Vec::new());
    }
    if start == end {
        return (PathStatus::AlreadyAtTarget, vec![start]);
    }
    let is_passable = |pos: Position| passable.get(pos).copied().unwrap_or(false);
    if !is_passable(start) || !is_passable(end) {
        return (PathStatus::BlockedEndpoint, Vec::new());
    }

    let mut open_set: BinaryHeap<OpenNode> = BinaryHeap::new();
    let mut came_from: AHashMap<Position, Position> = AHashMap::new();
    let mut g_scores: AHashMap<Position, u32> = AHashMap::new();
    let mut sequence: u64 = 0;

    g_scores.insert(start, 0);
    open_set.push(Reverse((OrderedFloat(start.distance(&end)), sequence, start, 0)));

    while let Some(Reverse((_, _, current, current_g))) = open_set.pop() {
        if current == end {
            return (PathStatus::Found, reconstruct_path(&came_from, current));
        }

        // Skip entries superseded by a cheaper route
        if g_scores.get(&current).map_or(false, |&g| g < current_g) {
            continue;
        }

        for neighbor in neighbors(current, true) {
            if !is_passable(neighbor) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current);
                g_scores.insert(neighbor, tentative_g);

                let f_cost = tentative_g as f64 + neighbor.distance(&end);
                sequence += 1;
                open_set.push(Reverse((OrderedFloat(f_cost), sequence, neighbor, tentative_g)));
            }
        }
    }

    (PathStatus::NoPath, Vec::new())
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &AHashMap<Position, Position>,
    mut current: Position,
) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
