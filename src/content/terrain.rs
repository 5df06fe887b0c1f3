use crate::entity::{Entity, EntityBuilder, Stair};
use crate::spatial::layer::OccupancyRank;

pub fn wall() -> EntityBuilder {
    Entity::builder("wall", '#', OccupancyRank::Wall)
}

pub fn floor() -> EntityBuilder {
    Entity::builder("floor", '.', OccupancyRank::Floor)
}

/// Leads one depth up
pub fn stair_up() -> EntityBuilder {
    Entity::builder("up stair", '<', OccupancyRank::Floor).stair(Stair::Up)
}

/// Leads one depth down
pub fn stair_down() -> EntityBuilder {
    Entity::builder("down stair", '>', OccupancyRank::Floor).stair(Stair::Down)
}
