//! Level generation
//!
//! Every level gets a solid border over a floor, optional wall shapes,
//! stairs, lights and monsters. Consecutive depths are joined: the down
//! stair of depth `d` sits at the same position as the up stair of
//! `d + 1`, and a corridor is carved on depth `d` from where the player
//! arrives to the down stair.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::content;
use crate::core::config::DungeonConfig;
use crate::core::error::{DelveError, Result};
use crate::core::types::{Depth, Position};
use crate::entity::EntityArena;
use crate::pathfinding::uniform_cost_path;
use crate::spatial::grid::Grid;
use crate::spatial::layer::{OccupancyRank, PlacementMode, PlacementPolicy};
use crate::topology::level::Level;
use crate::topology::LevelTopology;

type Shape = [[bool; 3]; 3];

const WALL_SHAPES: [Shape; 4] = [
    // L
    [[true, false, false], [true, false, false], [true, true, true]],
    // plus
    [[false, true, false], [true, true, true], [false, true, false]],
    // line
    [[false, true, false], [false, true, false], [false, true, false]],
    // corner
    [[false, false, false], [true, false, false], [true, true, false]],
];

/// Build every level of a dungeon
///
/// `rng` is the session stream; each level draws its own seed from it.
pub fn generate(
    config: &DungeonConfig,
    rng: &mut ChaCha8Rng,
    entities: &mut EntityArena,
) -> Result<LevelTopology> {
    config.validate().map_err(DelveError::Config)?;

    let mut levels = Vec::with_capacity(config.depth_count);
    let mut arrival: Option<Position> = None;

    for index in 0..config.depth_count {
        let depth = index as Depth;
        let mut level = Level::new(
            depth,
            config.height,
            config.width,
            ChaCha8Rng::seed_from_u64(rng.gen()),
        );

        surround_with_walls(&mut level, entities)?;
        if config.wall_shapes {
            scatter_wall_shapes(&mut level, entities, config);
        }

        let start = arrival.unwrap_or(config.player_start);
        if let Some(up) = arrival {
            level.spawn(
                entities,
                content::stair_up(),
                up,
                PlacementMode::Overwrite,
                PlacementPolicy::Exact,
            )?;
        }
        arrival = if index + 1 < config.depth_count {
            let down = pick_down_stair(&mut level.rng, config, start);
            // A one-cell interior leaves no choice but to share the arrival cell
            let mode = if down == start && index > 0 {
                PlacementMode::Append
            } else {
                PlacementMode::Overwrite
            };
            level.spawn(entities, content::stair_down(), down, mode, PlacementPolicy::Exact)?;
            carve_corridor(&mut level, entities, start, down, config.border_cost)?;
            Some(down)
        } else {
            None
        };

        populate(&mut level, entities, config);
        tracing::debug!(
            "generated depth {} ({}x{}), {} entities so far",
            depth,
            config.height,
            config.width,
            entities.len()
        );
        levels.push(level);
    }

    Ok(LevelTopology::new(levels))
}

fn is_border(pos: Position, height: usize, width: usize) -> bool {
    pos.row == 0 || pos.col == 0 || pos.row as usize == height - 1 || pos.col as usize == width - 1
}

fn surround_with_walls(level: &mut Level, entities: &mut EntityArena) -> Result<()> {
    let (height, width) = (level.grid.height(), level.grid.width());
    for row in 0..height as i32 {
        for col in 0..width as i32 {
            let pos = Position::new(row, col);
            let builder = if is_border(pos, height, width) {
                content::wall()
            } else {
                content::floor()
            };
            level.spawn(entities, builder, pos, PlacementMode::Overwrite, PlacementPolicy::Exact)?;
        }
    }
    Ok(())
}

/// Rotate a shape a quarter turn clockwise
fn rotate(shape: &Shape) -> Shape {
    let mut rotated = [[false; 3]; 3];
    for (r, row) in rotated.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = shape[2 - c][r];
        }
    }
    rotated
}

/// Stamp randomly rotated shapes until enough wall cells are placed
///
/// Cells of a stamp that land on the border, an existing wall or the
/// player start are skipped and do not count. Returns the walls placed.
fn scatter_wall_shapes(
    level: &mut Level,
    entities: &mut EntityArena,
    config: &DungeonConfig,
) -> usize {
    let mut walls_placed = 0;
    let mut passes = 0;

    while walls_placed < config.min_wall_cells && passes < config.max_wall_passes {
        passes += 1;
        for anchor in level.grid.occupancy_snapshot().positions().collect::<Vec<_>>() {
            if level.rng.gen_range(1..=100) >= config.wall_shape_chance {
                continue;
            }
            let mut shape = WALL_SHAPES[level.rng.gen_range(0..WALL_SHAPES.len())];
            for _ in 0..level.rng.gen_range(0..=3) {
                shape = rotate(&shape);
            }

            for (sr, row) in shape.iter().enumerate() {
                for (sc, &filled) in row.iter().enumerate() {
                    let pos = Position::new(anchor.row + sr as i32, anchor.col + sc as i32);
                    if !filled || (level.depth() == 0 && pos == config.player_start) {
                        continue;
                    }
                    let placed = level.spawn(
                        entities,
                        content::wall(),
                        pos,
                        PlacementMode::Append,
                        PlacementPolicy::Exact,
                    );
                    if placed.is_ok() {
                        walls_placed += 1;
                    }
                }
            }
        }
    }
    tracing::debug!(
        "depth {}: {} wall cells in {} passes",
        level.depth(),
        walls_placed,
        passes
    );
    walls_placed
}

fn random_interior(rng: &mut ChaCha8Rng, config: &DungeonConfig) -> Position {
    Position::new(
        rng.gen_range(1..=config.height as i32 - 2),
        rng.gen_range(1..=config.width as i32 - 2),
    )
}

/// Any interior cell other than where the player arrives
fn pick_down_stair(rng: &mut ChaCha8Rng, config: &DungeonConfig, start: Position) -> Position {
    if (config.height - 2) * (config.width - 2) == 1 {
        return start;
    }
    loop {
        let pos = random_interior(rng, config);
        if pos != start {
            return pos;
        }
    }
}

/// Carving cost: occupancy rank inside, `border_cost` on the border
fn carving_costs(level: &Level, border_cost: u32) -> Grid<u32> {
    let (height, width) = (level.grid.height(), level.grid.width());
    let mut costs = level.grid.occupancy_snapshot().map(|&rank| rank as u32);
    for pos in costs.positions().collect::<Vec<_>>() {
        if is_border(pos, height, width) {
            costs.set(pos, border_cost);
        }
    }
    costs
}

/// Floor every cell strictly between `start` and `end` on the cheapest
/// four-directional route
fn carve_corridor(
    level: &mut Level,
    entities: &mut EntityArena,
    start: Position,
    end: Position,
    border_cost: u32,
) -> Result<()> {
    let costs = carving_costs(level, border_cost);
    let Some(path) = uniform_cost_path(&costs, start, end, false) else {
        return Err(DelveError::Config(format!(
            "no corridor from {} to {} on depth {}",
            start,
            end,
            level.depth()
        )));
    };

    let interior = path.len().saturating_sub(1);
    for &pos in path.iter().take(interior).skip(1) {
        level.spawn(
            entities,
            content::floor(),
            pos,
            PlacementMode::Overwrite,
            PlacementPolicy::Exact,
        )?;
    }
    tracing::debug!(
        "depth {}: carved {} -> {} ({} cells)",
        level.depth(),
        start,
        end,
        path.len()
    );
    Ok(())
}

/// Roll monsters, then lights, onto bare floor
fn populate(level: &mut Level, entities: &mut EntityArena, config: &DungeonConfig) {
    let positions: Vec<Position> = level.grid.occupancy_snapshot().positions().collect();

    for &pos in &positions {
        if pos == config.player_start || level.grid.occupancy_rank(pos) != OccupancyRank::Floor {
            continue;
        }
        if level.rng.gen_range(1..=100) < config.monster_chance {
            let builder = if level.rng.gen_range(1..=2) == 1 {
                content::jelly()
            } else {
                content::newt()
            };
            let spawned =
                level.spawn(entities, builder, pos, PlacementMode::Append, PlacementPolicy::Exact);
            if let Err(err) = spawned {
                tracing::trace!("depth {}: no monster at {}: {}", level.depth(), pos, err);
            }
        }
    }

    for &pos in &positions {
        if level.grid.occupancy_rank(pos) == OccupancyRank::Floor
            && level.rng.gen_range(1..=100) < config.light_chance
        {
            let spawned = level.spawn(
                entities,
                content::light(),
                pos,
                PlacementMode::Append,
                PlacementPolicy::Exact,
            );
            if let Err(err) = spawned {
                tracing::trace!("depth {}: no light at {}: {}", level.depth(), pos, err);
            }
        }
    }
}
