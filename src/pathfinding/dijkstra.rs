//! Uniform-cost (Dijkstra) search over a per-cell cost grid
//!
//! Entering a cell costs that cell's value; the start cell is free.
//! Used for corridor carving, where the cost grid is the occupancy rank.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::core::types::Position;
use crate::pathfinding::neighbors;
use crate::spatial::grid::Grid;

/// Cheapest path from `start` to `end`, both inclusive
///
/// Ties in accumulated cost pop in insertion order, so the result is
/// identical across runs. Returns `None` if either endpoint is outside the
/// grid or `end` cannot be reached.
pub fn uniform_cost_path(
    cost_grid: &Grid<u32>,
    start: Position,
    end: Position,
    allow_diagonal: bool,
) -> Option<Vec<Position>> {
    if !cost_grid.in_bounds(start) || !cost_grid.in_bounds(end) {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    let mut open_set = BinaryHeap::new();
    let mut best: Grid<Option<u64>> = Grid::new(cost_grid.height, cost_grid.width);
    let mut came_from: Grid<Option<Position>> = Grid::new(cost_grid.height, cost_grid.width);
    let mut settled: Grid<bool> = Grid::new(cost_grid.height, cost_grid.width);
    let mut sequence: u64 = 0;

    best.set(start, Some(0));
    open_set.push(Reverse((0u64, sequence, start)));

    while let Some(Reverse((cost, _, current))) = open_set.pop() {
        if current == end {
            return Some(reconstruct_path(&came_from, end));
        }
        if settled.get(current).copied().unwrap_or(true) {
            continue;
        }
        settled.set(current, true);

        for neighbor in neighbors(current, allow_diagonal) {
            let Some(&step) = cost_grid.get(neighbor) else {
                continue;
            };
            let new_cost = cost + step as u64;
            let known = best.get(neighbor).copied().flatten();
            if known.map_or(true, |k| new_cost < k) {
                best.set(neighbor, Some(new_cost));
                came_from.set(neighbor, Some(current));
                sequence += 1;
                open_set.push(Reverse((new_cost, sequence, neighbor)));
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &Grid<Option<Position>>, end: Position) -> Vec<Position> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(prev) = came_from.get(current).copied().flatten() {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Running total of entry costs along a path (the start contributes 0)
pub fn accumulated_costs(cost_grid: &Grid<u32>, path: &[Position]) -> Vec<u64> {
    let mut total = 0u64;
    path.iter()
        .enumerate()
        .map(|(i, pos)| {
            if i > 0 {
                total += cost_grid.get(*pos).copied().unwrap_or(0) as u64;
            }
            total
        })
        .collect()
}

/// Total entry cost of a path
pub fn path_cost(cost_grid: &Grid<u32>, path: &[Position]) -> u64 {
    accumulated_costs(cost_grid, path).last().copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_grid() -> Grid<u32> {
        Grid::from_rows(&[
            vec![0, 0, 0, 0, 9],
            vec![0, 0, 0, 9, 9],
            vec![0, 1, 1, 9, 0],
            vec![0, 0, 0, 9, 0],
        ])
    }

    #[test]
    fn test_detours_around_expensive_column() {
        let grid = scenario_grid();
        let start = Position::new(0, 0);
        let end = Position::new(3, 4);

        let path = uniform_cost_path(&grid, start, end, false).unwrap();

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        // One 9 must be crossed; the cheapest crossing is (3,3)
        assert_eq!(path_cost(&grid, &path), 9);
        assert!(path.contains(&Position::new(3, 3)));
        for costly in [(0, 4), (1, 3), (1, 4), (2, 3)] {
            assert!(!path.contains(&Position::new(costly.0, costly.1)));
        }

        let costs = accumulated_costs(&grid, &path);
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_orthogonal_steps_only() {
        let grid = scenario_grid();
        let (start, end) = (Position::new(0, 0), Position::new(3, 4));
        let path = uniform_cost_path(&grid, start, end, false).unwrap();
        for pair in path.windows(2) {
            let d = pair[1] - pair[0];
            assert_eq!(d.row.abs() + d.col.abs(), 1);
        }
    }

    #[test]
    fn test_diagonal_shortens_open_path() {
        let grid = Grid::<u32>::new(5, 5).map(|_| 1u32);
        let start = Position::new(0, 0);
        let end = Position::new(4, 4);

        let straight = uniform_cost_path(&grid, start, end, false).unwrap();
        let diagonal = uniform_cost_path(&grid, start, end, true).unwrap();
        assert_eq!(straight.len(), 9);
        assert_eq!(diagonal.len(), 5);
    }

    #[test]
    fn test_same_start_and_end() {
        let grid = scenario_grid();
        let pos = Position::new(2, 2);
        assert_eq!(uniform_cost_path(&grid, pos, pos, true), Some(vec![pos]));
    }

    #[test]
    fn test_out_of_bounds_endpoint() {
        let grid = scenario_grid();
        let origin = Position::new(0, 0);
        assert!(uniform_cost_path(&grid, origin, Position::new(4, 0), false).is_none());
        assert!(uniform_cost_path(&grid, Position::new(-1, 0), origin, false).is_none());
    }

    #[test]
    fn test_deterministic() {
        let grid: Grid<u32> = Grid::new(6, 6);
        let a = uniform_cost_path(&grid, Position::new(0, 0), Position::new(5, 5), true);
        let b = uniform_cost_path(&grid, Position::new(0, 0), Position::new(5, 5), true);
        assert_eq!(a, b);
    }
}
