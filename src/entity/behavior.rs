//! Content hooks and the context they run in
//!
//! The scheduler calls three hooks on every entity kind without knowing
//! what the kind is. Hooks mutate the world only through the
//! [`HookContext`] handed to them and report every other entity they
//! touched by returning its id; the scheduler owns the worklist.

use std::fmt;

use rand_chacha::ChaCha8Rng;

use crate::core::types::{Depth, EntityId, Position, Turn};
use crate::entity::arena::EntityArena;
use crate::entity::model::{Entity, EntityBuilder};
use crate::spatial::grid::Grid;
use crate::spatial::layer::{GridLayer, OccupancyRank, Occupant};
use crate::turn::events::{TurnEventType, TurnLog};
use crate::turn::intent::Intent;

/// Per-kind behaviour. Every hook defaults to doing nothing.
pub trait Behavior: fmt::Debug {
    /// Once per turn at most, with this turn's energy grant and intent
    fn decide(
        &mut self,
        _me: &mut Entity,
        _energy: i32,
        _intent: Intent,
        _ctx: &mut HookContext<'_>,
    ) -> Vec<EntityId> {
        Vec::new()
    }

    /// Every time the entity is popped alive, including re-pushes
    fn update(&mut self, _me: &mut Entity, _ctx: &mut HookContext<'_>) -> Vec<EntityId> {
        Vec::new()
    }

    /// Once, when the scheduler sweeps the inactive entity off its grid
    fn on_removed(&mut self, _me: &mut Entity, _ctx: &mut HookContext<'_>) -> Vec<EntityId> {
        Vec::new()
    }
}

/// Borrowed world state for one hook call
///
/// The entity whose hook is running is checked out of `entities` for the
/// duration of the call, so lookups of its own id miss.
pub struct HookContext<'a> {
    pub grid: &'a mut GridLayer,
    pub lighting: &'a mut Grid<bool>,
    pub rng: &'a mut ChaCha8Rng,
    pub entities: &'a mut EntityArena,
    pub player_position: Position,
    pub player_depth: Depth,
    pub turn: Turn,
    pub log: &'a mut TurnLog,
}

impl HookContext<'_> {
    pub fn cell(&self, pos: Position) -> &[Occupant] {
        self.grid.cell_at(pos)
    }

    /// Live damageable occupants of a cell, in stack order
    pub fn attackable_at(&self, pos: Position) -> Vec<EntityId> {
        self.grid
            .cell_at(pos)
            .iter()
            .filter(|o| self.entities.get(o.id).map_or(false, Entity::is_attackable))
            .map(|o| o.id)
            .collect()
    }

    /// Damage `target`, returning it if the blow killed it
    ///
    /// A killed target is only marked inactive here; the scheduler sweeps
    /// it when the returned id is popped.
    pub fn deal_damage(
        &mut self,
        source: &str,
        target: EntityId,
        amount: i32,
    ) -> Option<EntityId> {
        let turn = self.turn;
        let entity = self.entities.get_mut(target)?;
        if !entity.is_attackable() {
            return None;
        }
        tracing::debug!("{} deals {} to {} ({})", source, amount, entity.name, target);
        if entity.take_damage(amount) {
            let description = format!("{} kills the {}", source, entity.name);
            self.log.push(TurnEventType::Killed { entity: target }, description, turn);
            Some(target)
        } else {
            let description = format!("{} hits the {}", source, entity.name);
            let event = TurnEventType::Damaged { entity: target, amount };
            self.log.push(event, description, turn);
            None
        }
    }

    /// Trigger activatable occupants of `pos`, returning those that changed
    pub fn activate_at(&mut self, pos: Position) -> Vec<EntityId> {
        let ids: Vec<EntityId> = self.grid.cell_at(pos).iter().map(|o| o.id).collect();
        let turn = self.turn;
        let mut activated = Vec::new();
        for id in ids {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            if entity.activate() {
                let description = format!("the {} switches on", entity.name);
                self.log.push(TurnEventType::Activated { entity: id }, description, turn);
                activated.push(id);
            }
        }
        activated
    }

    /// Move every portable occupant of `me`'s cell into its inventory
    ///
    /// Picked-up entities are marked removed and returned so the scheduler
    /// sweeps them. Does nothing for an entity without an inventory.
    pub fn pick_up_at(&mut self, me: &mut Entity) -> Vec<EntityId> {
        let Some(inventory) = me.inventory.as_mut() else {
            return Vec::new();
        };
        let ids: Vec<EntityId> = self.grid.cell_at(me.position).iter().map(|o| o.id).collect();
        let turn = self.turn;
        let mut picked = Vec::new();
        for id in ids {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            if !entity.is_active {
                continue;
            }
            let Some(item) = entity.pickup.clone() else {
                continue;
            };
            entity.mark_removed();
            let description = format!("the {} picks up the {}", me.name, item.name);
            inventory.pick_up(item);
            self.log.push(TurnEventType::PickedUp { entity: id, by: me.id }, description, turn);
            picked.push(id);
        }
        picked
    }

    /// Create a new entity, off-grid; return its id so the scheduler places it
    pub fn spawn(&mut self, builder: EntityBuilder) -> EntityId {
        self.entities.spawn(builder)
    }

    /// Cells a creature or projectile can pass: nothing above Creature rank
    pub fn passability(&self) -> Grid<bool> {
        self.grid
            .occupancy_snapshot()
            .map(|&rank| rank <= OccupancyRank::Creature.value())
    }

    pub fn message(&mut self, description: impl Into<String>) {
        let turn = self.turn;
        self.log.push(TurnEventType::Message, description.into(), turn);
    }
}
