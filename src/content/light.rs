//! Floor light that switches on when something walks onto it

use crate::core::types::EntityId;
use crate::entity::{Behavior, Entity, EntityBuilder, HookContext};
use crate::spatial::layer::OccupancyRank;

pub fn light() -> EntityBuilder {
    Entity::builder("light", '+', OccupancyRank::Object)
        .light(false)
        .behavior(Lamp)
}

#[derive(Debug)]
struct Lamp;

impl Behavior for Lamp {
    /// Light its own cell and the ring around it while switched on
    fn update(&mut self, me: &mut Entity, ctx: &mut HookContext<'_>) -> Vec<EntityId> {
        if me.light.map_or(false, |l| l.active) && !me.position.is_off_grid() {
            ctx.lighting.set(me.position, true);
            for pos in me.position.ring() {
                ctx.lighting.set(pos, true);
            }
        }
        Vec::new()
    }
}
