//! The player-controlled entity
//!
//! Turns a decoded [`Intent`] into actions and keeps its field-of-view
//! memory current on every update.

use crate::content::items::{dart, sword_item};
use crate::content::{step_or_attack, REST_COST};
use crate::core::config::DungeonConfig;
use crate::core::types::{Direction, EntityId, Position};
use crate::entity::{Attack, Behavior, Entity, EntityBuilder, HookContext, Inventory, Stair};
use crate::pathfinding::{targeted_search, PathStatus};
use crate::spatial::layer::OccupancyRank;
use crate::spatial::shadowcast::compute_visible;
use crate::turn::events::TurnEventType;
use crate::turn::intent::Intent;

pub const PLAYER_SPEED: i32 = 5;
pub const PLAYER_ATTACK_COST: i32 = 4;
pub const PLAYER_PUNCH_DAMAGE: i32 = 1;
pub const PLAYER_THROW_COST: i32 = 6;
pub const PLAYER_CHARGE_COST: i32 = 3;
pub const PLAYER_INVENTORY_COST: i32 = 5;
pub const DART_DAMAGE: i32 = 2;

/// The player, carrying an unequipped sword
pub fn player(config: &DungeonConfig) -> EntityBuilder {
    Entity::builder("player", '@', OccupancyRank::Creature)
        .health(config.player_health)
        .speed(PLAYER_SPEED)
        .attack(Attack::new("punch", PLAYER_PUNCH_DAMAGE, PLAYER_ATTACK_COST))
        .inventory(Inventory::new(PLAYER_INVENTORY_COST).with(sword_item()))
        .charge(PLAYER_CHARGE_COST)
        .sight(config.player_sight_radius, config.player_fov_memory)
        .behavior(PlayerControl { throw_cost: PLAYER_THROW_COST })
}

#[derive(Debug)]
pub struct PlayerControl {
    pub throw_cost: i32,
}

impl PlayerControl {
    fn use_stairs(&self, me: &mut Entity, down: bool, ctx: &mut HookContext<'_>) {
        let Some(cost) = me.speed.filter(|&c| me.can_afford(c)) else {
            return;
        };
        let wanted = if down { Stair::Down } else { Stair::Up };
        let stair = ctx
            .cell(me.position)
            .iter()
            .filter_map(|o| ctx.entities.get(o.id).and_then(|e| e.stair))
            .find(|s| *s == wanted);

        match stair {
            Some(stair) => {
                me.depth = stair.destination(me.depth);
                me.spend_energy(cost);
                let way = if down { "down" } else { "up" };
                ctx.message(format!("You walk {} the stairs", way));
            }
            None => ctx.message(if down { "Can't go down here" } else { "Can't go up here" }),
        }
    }

    /// Equip or unequip; the cost is paid even when nothing changes
    fn change_equipment(me: &mut Entity, index: usize, equip: bool, ctx: &mut HookContext<'_>) {
        let Some(cost) = me.inventory.as_ref().map(|i| i.cost) else {
            return;
        };
        if !me.can_afford(cost) {
            return;
        }
        me.spend_energy(cost);

        let Some(inventory) = me.inventory.as_mut() else {
            return;
        };
        let changed = if equip {
            inventory.equip(index)
        } else {
            inventory.unequip(index)
        };
        match (changed.map(|item| item.name.clone()), equip) {
            (Some(name), true) => ctx.message(format!("You equip the {}", name)),
            (Some(name), false) => ctx.message(format!("You put away the {}", name)),
            (None, true) => ctx.message("Nothing to equip"),
            (None, false) => ctx.message("That is not equipped"),
        }
    }

    /// Where a dart thrown this way stops: on the first creature, or just
    /// before the first wall
    fn landing_cell(me: &Entity, direction: Direction, ctx: &HookContext<'_>) -> Position {
        let mut current = me.position;
        loop {
            let next = current.step(direction);
            match ctx.grid.occupancy_rank(next) {
                OccupancyRank::Creature => return next,
                OccupancyRank::Wall => return current,
                _ => current = next,
            }
        }
    }

    /// Nearest visible thing that can be hurt
    fn nearest_target(me: &Entity, ctx: &HookContext<'_>) -> Option<Position> {
        let sight = me.sight.as_ref()?;
        let mut best: Option<Position> = None;
        for &pos in &sight.visible {
            if ctx.attackable_at(pos).is_empty() {
                continue;
            }
            let closer = best.map_or(true, |b| {
                me.position.distance_squared(&pos) < me.position.distance_squared(&b)
            });
            if closer {
                best = Some(pos);
            }
        }
        best
    }

    fn throw(
        &self,
        me: &mut Entity,
        direction: Option<Direction>,
        ctx: &mut HookContext<'_>,
    ) -> Vec<EntityId> {
        if !me.can_afford(self.throw_cost) {
            return Vec::new();
        }
        let target = match direction {
            Some(direction) => Self::landing_cell(me, direction, ctx),
            None => match Self::nearest_target(me, ctx) {
                Some(target) => target,
                None => {
                    ctx.message("No targets!");
                    return Vec::new();
                }
            },
        };

        let (status, path) = targeted_search(&ctx.passability(), me.position, target);
        if status != PathStatus::Found {
            tracing::debug!("{} throw to {} aborted: {:?}", me.name, target, status);
            return Vec::new();
        }

        let mut affected = Vec::new();
        for victim in ctx.attackable_at(target) {
            affected.extend(ctx.deal_damage(&me.name, victim, DART_DAMAGE));
        }

        let turn = ctx.turn;
        ctx.log.push(
            TurnEventType::Projectile { path },
            format!("{} throws a dart", me.name),
            turn,
        );

        let dart_id = ctx.spawn(dart());
        if let Some(entity) = ctx.entities.get_mut(dart_id) {
            entity.position = target;
            entity.depth = me.depth;
        }
        affected.push(dart_id);

        me.spend_energy(self.throw_cost);
        affected
    }
}

impl Behavior for PlayerControl {
    fn decide(
        &mut self,
        me: &mut Entity,
        energy: i32,
        intent: Intent,
        ctx: &mut HookContext<'_>,
    ) -> Vec<EntityId> {
        me.grant_energy(energy);
        if let Some(direction) = me.charge.and_then(|c| c.direction) {
            return step_or_attack(me, direction, ctx);
        }
        match intent {
            Intent::Rest => {
                me.spend_energy(REST_COST);
                Vec::new()
            }
            Intent::Move(direction) => step_or_attack(me, direction, ctx),
            Intent::Ascend => {
                self.use_stairs(me, false, ctx);
                Vec::new()
            }
            Intent::Descend => {
                self.use_stairs(me, true, ctx);
                Vec::new()
            }
            Intent::Fire(direction) => self.throw(me, direction, ctx),
            Intent::Charge(direction) => {
                if let Some(charge) = me.charge.as_mut() {
                    charge.start(direction);
                }
                step_or_attack(me, direction, ctx)
            }
            Intent::Equip(index) => {
                Self::change_equipment(me, index, true, ctx);
                Vec::new()
            }
            Intent::Unequip(index) => {
                Self::change_equipment(me, index, false, ctx);
                Vec::new()
            }
        }
    }

    /// Refresh what the player sees; lit cells count as seen
    fn update(&mut self, me: &mut Entity, ctx: &mut HookContext<'_>) -> Vec<EntityId> {
        if me.position.is_off_grid() {
            return Vec::new();
        }
        let Some(sight) = me.sight.as_mut() else {
            return Vec::new();
        };

        let snapshot = ctx.grid.occupancy_snapshot();
        let mut visible = compute_visible(
            &snapshot,
            me.position,
            sight.radius,
            OccupancyRank::Creature.value(),
        );
        visible.extend(ctx.lighting.positions().filter(|&p| ctx.lighting.get(p) == Some(&true)));
        sight.refresh(visible, ctx.grid);
        Vec::new()
    }
}
