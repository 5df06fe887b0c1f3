//! Reference entity kinds
//!
//! Small on purpose: enough kinds to drive every hook the scheduler calls.
//! Terrain, lights and items sit still; the jelly, the newt and the player
//! act.

pub mod items;
pub mod light;
pub mod monsters;
pub mod player;
pub mod terrain;

pub use items::{bite, dart, sword};
pub use light::light;
pub use monsters::{jelly, newt};
pub use player::player;
pub use terrain::{floor, stair_down, stair_up, wall};

use crate::core::types::{Direction, EntityId};
use crate::entity::{Entity, HookContext};

/// Cost of resting; large enough to empty any bank
pub const REST_COST: i32 = 100;

/// Step one cell, or attack the first thing there that can be hurt
///
/// Returns whoever was killed, activated or picked up. While charging,
/// steps use the charge cost and an attack spends the run as bonus
/// damage. Bumping into something that cannot be entered still costs a
/// step and ends a charge; an out-of-grid target only ends a charge.
pub(crate) fn step_or_attack(
    me: &mut Entity,
    direction: Direction,
    ctx: &mut HookContext<'_>,
) -> Vec<EntityId> {
    let target = me.position.step(direction);
    if !ctx.grid.within_bounds(target) {
        if let Some(charge) = me.charge.as_mut() {
            charge.end();
        }
        return Vec::new();
    }

    if let (Some(attack), Some(damage)) = (me.attack.clone(), me.attack_damage()) {
        if let Some(&victim) = ctx.attackable_at(target).first() {
            let charge = me.charge.filter(|c| c.is_charging());
            let cost = charge.map_or(attack.cost, |c| c.cost);
            if !me.can_afford(cost) {
                return Vec::new();
            }
            let bonus = me.charge.as_mut().map_or(0, |c| c.end());
            if charge.is_some() {
                ctx.message(format!("the {} charges!", me.name));
            }
            let killed = ctx.deal_damage(&me.name, victim, damage + bonus);
            me.spend_energy(cost);
            return killed.into_iter().collect();
        }
    }

    let charging = me.is_charging();
    let Some(cost) = me.charge.filter(|_| charging).map(|c| c.cost).or(me.speed) else {
        return Vec::new();
    };
    if me.rank > ctx.grid.occupancy_rank(target) {
        if !me.can_afford(cost) {
            return Vec::new();
        }
        me.position = target;
        if let Some(charge) = me.charge.as_mut().filter(|c| c.is_charging()) {
            charge.advance();
        }
        let mut affected = ctx.activate_at(target);
        affected.extend(ctx.pick_up_at(me));
        me.spend_energy(cost);
        affected
    } else {
        if let Some(charge) = me.charge.as_mut() {
            charge.end();
        }
        me.spend_energy(cost);
        Vec::new()
    }
}
