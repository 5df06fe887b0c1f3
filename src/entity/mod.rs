pub mod arena;
pub mod behavior;
pub mod components;
pub mod model;

pub use arena::EntityArena;
pub use behavior::{Behavior, HookContext};
pub use components::{
    Attack, Capability, Charge, FovMemory, Health, Inventory, Item, LightSource, Sight, Stair,
};
pub use model::{Entity, EntityBuilder};
