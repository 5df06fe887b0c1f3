//! Things that lie on the floor until something with an inventory walks in

use crate::entity::{Entity, EntityBuilder, Item};
use crate::spatial::layer::OccupancyRank;

pub const SWORD_DAMAGE: i32 = 2;
pub const BITE_DAMAGE: i32 = 1;

pub fn sword_item() -> Item {
    Item::weapon("sword", '/', SWORD_DAMAGE)
}

/// A newt's teeth, carried and equipped from birth
pub fn bite() -> Item {
    Item::weapon("bite", '?', BITE_DAMAGE)
}

pub fn sword() -> EntityBuilder {
    Entity::builder("sword", '/', OccupancyRank::Object).pickup(sword_item())
}

pub fn dart() -> EntityBuilder {
    Entity::builder("dart", ')', OccupancyRank::Object).pickup(Item::new("dart", ')'))
}
