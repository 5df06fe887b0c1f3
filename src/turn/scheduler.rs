//! Turn engine
//!
//! One call to [`TurnScheduler::advance`] runs one whole turn on the
//! current level. Entities are processed strictly one at a time from a
//! LIFO worklist: the player is pushed last so it acts first, and any
//! entity a hook reports as affected is pushed back on to be processed
//! again. A per-entity turn guard keeps `decide` to at most once per turn
//! while `update` runs on every visit.

use crate::core::error::TransferFailure;
use crate::core::types::{Depth, EntityId, Position, Turn, OFF_GRID_DEPTH};
use crate::entity::{Entity, EntityArena, HookContext};
use crate::spatial::layer::{PlacementMode, PlacementPolicy};
use crate::topology::{Level, LevelTopology};
use crate::turn::events::{TurnEventType, TurnLog};
use crate::turn::intent::Intent;
use crate::world::Dungeon;

/// Scheduler state carried between turns
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    player: EntityId,
    turn: Turn,
    energy: i32,
    last_intent: Option<Intent>,
}

impl TurnScheduler {
    pub fn new(player: EntityId) -> Self {
        Self {
            player,
            turn: 0,
            energy: 0,
            last_intent: None,
        }
    }

    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn energy(&self) -> i32 {
        self.energy
    }

    pub fn last_intent(&self) -> Option<Intent> {
        self.last_intent
    }

    /// Start the next turn with this intent and energy grant
    pub fn step(&mut self, dungeon: &mut Dungeon, intent: Intent, energy: i32, log: &mut TurnLog) {
        let turn = self.turn + 1;
        self.advance(dungeon, intent, turn, energy, log);
    }

    /// Run every entity on the current level for `turn`
    pub fn advance(
        &mut self,
        dungeon: &mut Dungeon,
        intent: Intent,
        turn: Turn,
        energy: i32,
        log: &mut TurnLog,
    ) {
        self.turn = turn;
        self.energy = energy;
        self.last_intent = Some(intent);

        let depth = dungeon.topology.current_depth();
        let Some(level) = dungeon.topology.level_mut(depth) else {
            tracing::warn!("no level at depth {}; turn {} skipped", depth, turn);
            return;
        };
        level.lighting.clear();

        let mut worklist: Vec<EntityId> = level.grid.occupants().collect();
        worklist.push(self.player);

        let mut visits = 0usize;
        while let Some(id) = worklist.pop() {
            visits += 1;
            let affected = self.process(dungeon, depth, id, intent, turn, energy, log);
            if !affected.is_empty() {
                tracing::trace!("{} queued {} affected entities", id, affected.len());
            }
            worklist.extend(affected);
        }
        tracing::debug!("turn {} on depth {}: {} visits", turn, depth, visits);
    }

    #[allow(clippy::too_many_arguments)]
    fn process(
        &self,
        dungeon: &mut Dungeon,
        depth: Depth,
        id: EntityId,
        intent: Intent,
        turn: Turn,
        energy: i32,
        log: &mut TurnLog,
    ) -> Vec<EntityId> {
        let Dungeon { entities, topology } = dungeon;
        let (player_position, player_depth) = entities
            .get(self.player)
            .map_or((Position::OFF_GRID, OFF_GRID_DEPTH), |p| (p.position, p.depth));

        // Already swept earlier this turn
        let Some(mut entity) = entities.take(id) else {
            return Vec::new();
        };

        if !entity.is_active {
            return sweep(entity, entities, topology, player_position, player_depth, turn, log);
        }

        let mut behavior = entity.take_behavior();
        let mut affected = Vec::new();
        let hook_depth = entity
            .grid_index
            .map(|g| g.depth)
            .filter(|&d| topology.contains_depth(d))
            .unwrap_or(depth);

        if let Some(level) = topology.level_mut(hook_depth) {
            let mut ctx = hook_context(level, entities, player_position, player_depth, turn, log);
            let due = entity.last_turn_processed.map_or(true, |t| t < turn);
            if due {
                entity.last_turn_processed = Some(turn);
            }
            if let Some(behavior) = behavior.as_mut() {
                if due {
                    affected.extend(behavior.decide(&mut entity, energy, intent, &mut ctx));
                }
                affected.extend(behavior.update(&mut entity, &mut ctx));
            }
        }
        entity.restore_behavior(behavior.take());

        if reconcile(&mut entity, topology, depth, turn, log) {
            entities.restore(entity);
        }
        affected
    }
}

fn hook_context<'a>(
    level: &'a mut Level,
    entities: &'a mut EntityArena,
    player_position: Position,
    player_depth: Depth,
    turn: Turn,
    log: &'a mut TurnLog,
) -> HookContext<'a> {
    let Level { grid, lighting, rng } = level;
    HookContext {
        grid,
        lighting,
        rng,
        entities,
        player_position,
        player_depth,
        turn,
        log,
    }
}

/// Take an inactive entity off its grid and run its removal hook
///
/// The entity is dropped from the arena either way. The hook runs only if
/// the detach actually removed something, so a second sweep is a no-op.
fn sweep(
    mut entity: Entity,
    entities: &mut EntityArena,
    topology: &mut LevelTopology,
    player_position: Position,
    player_depth: Depth,
    turn: Turn,
    log: &mut TurnLog,
) -> Vec<EntityId> {
    let on_depth = entity.grid_index.map(|g| g.depth);
    let Some(level) = on_depth.and_then(|d| topology.level_mut(d)) else {
        tracing::debug!("dropping unplaced {} ({})", entity.name, entity.id);
        return Vec::new();
    };
    if !level.grid.detach(&mut entity) {
        return Vec::new();
    }

    tracing::debug!("removed {} ({}) at {}", entity.name, entity.id, entity.position);
    log.push(
        TurnEventType::Removed { entity: entity.id },
        format!("the {} is gone", entity.name),
        turn,
    );

    let mut behavior = entity.take_behavior();
    let affected = match behavior.as_mut() {
        Some(behavior) => {
            let mut ctx = hook_context(level, entities, player_position, player_depth, turn, log);
            behavior.on_removed(&mut entity, &mut ctx)
        }
        None => Vec::new(),
    };
    if !affected.is_empty() {
        tracing::debug!("{} removal cascades to {} entities", entity.id, affected.len());
    }
    affected
}

/// Bring the grids in line with where the entity wants to be
///
/// Returns false if the entity could not be put anywhere and was dropped.
fn reconcile(
    entity: &mut Entity,
    topology: &mut LevelTopology,
    depth: Depth,
    turn: Turn,
    log: &mut TurnLog,
) -> bool {
    let Some(current) = entity.grid_index else {
        return place_new(entity, topology, depth, turn, log);
    };

    if entity.depth != current.depth {
        transfer(entity, topology, current.position, current.depth, turn, log);
    } else if entity.position != current.position {
        relocate(entity, topology, current.position, turn, log);
    }
    true
}

/// First placement of an entity a hook created
fn place_new(
    entity: &mut Entity,
    topology: &mut LevelTopology,
    depth: Depth,
    turn: Turn,
    log: &mut TurnLog,
) -> bool {
    let target_depth = if topology.contains_depth(entity.depth) {
        entity.depth
    } else {
        depth
    };
    let target = entity.position;
    let placed = topology
        .level_mut(target_depth)
        .map(|level| {
            level
                .grid
                .place(entity, target, PlacementMode::Append, PlacementPolicy::NearestFree)
        });

    match placed {
        Some(Ok(_)) => true,
        _ => {
            tracing::warn!("could not place new {} ({}) at {}", entity.name, entity.id, target);
            log.push(
                TurnEventType::MoveRejected { entity: entity.id, to: target },
                format!("no room for the {}", entity.name),
                turn,
            );
            false
        }
    }
}

/// Move within one level; on failure go back to the old cell
fn relocate(
    entity: &mut Entity,
    topology: &mut LevelTopology,
    from: Position,
    turn: Turn,
    log: &mut TurnLog,
) {
    let target = entity.position;
    let Some(level) = entity.grid_index.and_then(|g| topology.level_mut(g.depth)) else {
        return;
    };
    level.grid.detach(entity);
    if level
        .grid
        .place(entity, target, PlacementMode::Append, PlacementPolicy::Exact)
        .is_ok()
    {
        return;
    }

    tracing::warn!("{} ({}) cannot move to {}", entity.name, entity.id, target);
    log.push(
        TurnEventType::MoveRejected { entity: entity.id, to: target },
        format!("the {} is blocked", entity.name),
        turn,
    );
    restore_at(entity, level, from);
}

/// Move to another depth, landing at or next to the same position
///
/// A failed transfer leaves the entity where it was and is reported, never
/// raised.
fn transfer(
    entity: &mut Entity,
    topology: &mut LevelTopology,
    from_position: Position,
    from_depth: Depth,
    turn: Turn,
    log: &mut TurnLog,
) {
    let to_depth = entity.depth;
    let target = entity.position;

    let reason = if topology.contains_depth(to_depth) {
        if let Some(level) = topology.level_mut(from_depth) {
            level.grid.detach(entity);
        }
        topology.level_mut(to_depth).and_then(|level| {
            level
                .grid
                .place(entity, target, PlacementMode::Append, PlacementPolicy::NearestFree)
                .err()
                .map(|err| err.to_string())
        })
    } else {
        Some(format!("no level at depth {}", to_depth))
    };

    match reason {
        None => {
            tracing::debug!(
                "{} ({}) moved from depth {} to {}",
                entity.name,
                entity.id,
                from_depth,
                to_depth
            );
            log.push(
                TurnEventType::Transferred { entity: entity.id, from: from_depth, to: to_depth },
                format!("the {} moves to depth {}", entity.name, to_depth),
                turn,
            );
        }
        Some(reason) => {
            let failure = TransferFailure {
                entity: entity.id,
                from: from_depth,
                to: to_depth,
                reason,
            };
            tracing::warn!("{}", failure);
            if let Some(level) = topology.level_mut(from_depth) {
                if !level.grid.contains(entity.id, from_position) {
                    restore_at(entity, level, from_position);
                } else {
                    entity.position = from_position;
                    entity.depth = from_depth;
                }
            }
            log.push(TurnEventType::TransferFailed(failure.clone()), failure.to_string(), turn);
        }
    }
}

/// Put an entity back in a cell it just left
fn restore_at(entity: &mut Entity, level: &mut Level, pos: Position) {
    let placed = level
        .grid
        .place(entity, pos, PlacementMode::Append, PlacementPolicy::Exact)
        .or_else(|_| {
            level
                .grid
                .place(entity, pos, PlacementMode::Append, PlacementPolicy::NearestFree)
        });
    if let Err(err) = placed {
        tracing::warn!("{} ({}) lost its cell: {}", entity.name, entity.id, err);
    }
}
