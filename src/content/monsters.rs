//! Monsters
//!
//! The jelly does nothing until it dies, then splashes its neighbours,
//! which may kill them in turn. The newt walks toward the player once it
//! is close enough and bites when adjacent.

use crate::content::items::{bite, BITE_DAMAGE};
use crate::content::{step_or_attack, REST_COST};
use crate::core::types::{Direction, EntityId};
use crate::entity::{Attack, Behavior, Entity, EntityBuilder, HookContext, Inventory};
use crate::spatial::layer::OccupancyRank;
use crate::turn::events::TurnEventType;
use crate::turn::intent::Intent;

pub const JELLY_HEALTH: i32 = 3;
pub const JELLY_SPLASH_DAMAGE: i32 = 5;

pub const NEWT_HEALTH: i32 = 3;
pub const NEWT_SIGHT_RANGE: f64 = 5.0;
pub const NEWT_SPEED: i32 = 9;
pub const NEWT_BITE_COST: i32 = 6;

pub fn jelly() -> EntityBuilder {
    Entity::builder("jelly", 'j', OccupancyRank::Creature)
        .health(JELLY_HEALTH)
        .behavior(Exploding { splash_damage: JELLY_SPLASH_DAMAGE })
}

pub fn newt() -> EntityBuilder {
    Entity::builder("newt", 'n', OccupancyRank::Creature)
        .health(NEWT_HEALTH)
        .speed(NEWT_SPEED)
        .attack(Attack::new("bite", BITE_DAMAGE, NEWT_BITE_COST))
        .inventory(Inventory { equipped: Some(0), ..Inventory::new(0).with(bite()) })
        .behavior(Stalker { sight_range: NEWT_SIGHT_RANGE })
}

/// Deals splash damage to the surrounding ring on death
#[derive(Debug)]
pub struct Exploding {
    pub splash_damage: i32,
}

impl Behavior for Exploding {
    fn on_removed(&mut self, me: &mut Entity, ctx: &mut HookContext<'_>) -> Vec<EntityId> {
        let turn = ctx.turn;
        ctx.log.push(
            TurnEventType::Burst { center: me.position },
            format!("the {} explodes!", me.name),
            turn,
        );
        tracing::debug!("{} ({}) explodes at {}", me.name, me.id, me.position);

        let source = format!("the {}'s splash", me.name);
        let mut killed = Vec::new();
        for pos in me.position.ring() {
            for victim in ctx.attackable_at(pos) {
                killed.extend(ctx.deal_damage(&source, victim, self.splash_damage));
            }
        }
        killed
    }
}

/// Heads for the player when on the same depth and within sight range
#[derive(Debug)]
pub struct Stalker {
    pub sight_range: f64,
}

impl Behavior for Stalker {
    fn decide(
        &mut self,
        me: &mut Entity,
        energy: i32,
        _intent: Intent,
        ctx: &mut HookContext<'_>,
    ) -> Vec<EntityId> {
        me.grant_energy(energy);

        let in_range = me.depth == ctx.player_depth
            && me.position.distance(&ctx.player_position) <= self.sight_range;
        match Direction::toward(me.position, ctx.player_position).filter(|_| in_range) {
            Some(direction) => step_or_attack(me, direction, ctx),
            None => {
                me.spend_energy(REST_COST);
                Vec::new()
            }
        }
    }
}
