//! The entity record and its builder

use crate::core::types::{Depth, EntityId, Position, Turn, OFF_GRID_DEPTH};
use crate::entity::behavior::Behavior;
use crate::entity::components::{
    Attack, Capability, Charge, FovMemory, Health, Inventory, Item, LightSource, Sight, Stair,
};
use crate::spatial::layer::{GridIndex, OccupancyRank};

/// Anything that can sit in a grid cell
///
/// `position` and `depth` are the entity's desired location. Behaviours
/// write them freely; the scheduler reconciles the grids afterwards. The
/// cached `grid_index` is where the entity actually is.
#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub glyph: char,
    pub rank: OccupancyRank,
    pub position: Position,
    pub depth: Depth,
    /// False once removal is requested; swept on the next turn
    pub is_active: bool,
    pub last_turn_processed: Option<Turn>,
    pub grid_index: Option<GridIndex>,
    pub energy: i32,
    /// Energy cost of one step; `None` means it never moves on its own
    pub speed: Option<i32>,
    pub health: Option<Health>,
    pub attack: Option<Attack>,
    pub light: Option<LightSource>,
    pub sight: Option<Sight>,
    pub stair: Option<Stair>,
    /// What this becomes when picked up
    pub pickup: Option<Item>,
    pub inventory: Option<Inventory>,
    pub charge: Option<Charge>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Entity {
    pub fn builder(name: impl Into<String>, glyph: char, rank: OccupancyRank) -> EntityBuilder {
        EntityBuilder::new(name, glyph, rank)
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Health => self.health.is_some(),
            Capability::Attacker => self.attack.is_some(),
            Capability::Pathable => self.speed.is_some(),
            Capability::Lit => self.light.is_some(),
            Capability::Carrier => self.inventory.is_some(),
            Capability::Portable => self.pickup.is_some(),
        }
    }

    /// Melee damage: the equipped weapon, else the attack's own damage
    pub fn attack_damage(&self) -> Option<i32> {
        let base = self.attack.as_ref()?.damage;
        Some(self.inventory.as_ref().and_then(Inventory::damage).unwrap_or(base))
    }

    pub fn is_charging(&self) -> bool {
        self.charge.as_ref().map_or(false, Charge::is_charging)
    }

    /// Alive and able to take damage
    pub fn is_attackable(&self) -> bool {
        self.is_active && self.health.as_ref().map_or(false, Health::is_alive)
    }

    pub fn is_on_grid(&self) -> bool {
        self.grid_index.is_some()
    }

    /// Request removal; the scheduler sweeps it on its next pass
    pub fn mark_removed(&mut self) {
        self.is_active = false;
    }

    /// Bank energy granted for this turn
    pub fn grant_energy(&mut self, amount: i32) {
        self.energy += amount;
    }

    /// Spend energy on an action
    ///
    /// An action costing more than the bank still happens but empties it.
    pub fn spend_energy(&mut self, cost: i32) {
        if cost > self.energy {
            self.energy = 0;
        } else {
            self.energy -= cost;
        }
    }

    pub fn can_afford(&self, cost: i32) -> bool {
        self.energy >= cost
    }

    /// Switch on an activatable part; true if anything changed
    pub fn activate(&mut self) -> bool {
        match self.light.as_mut() {
            Some(light) if !light.active => {
                light.active = true;
                true
            }
            _ => false,
        }
    }

    /// Apply damage; true if this blow killed it
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let killed = self.health.as_mut().map_or(false, |h| h.change(-amount));
        if killed {
            self.mark_removed();
        }
        killed
    }

    pub(crate) fn set_grid_index(&mut self, grid_index: GridIndex) {
        self.position = grid_index.position;
        self.depth = grid_index.depth;
        self.grid_index = Some(grid_index);
    }

    pub(crate) fn clear_grid_index(&mut self) {
        self.grid_index = None;
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn Behavior>> {
        self.behavior.take()
    }

    pub(crate) fn restore_behavior(&mut self, behavior: Option<Box<dyn Behavior>>) {
        if self.behavior.is_none() {
            self.behavior = behavior;
        }
    }
}

/// Fluent construction; the arena assigns the id
#[derive(Debug)]
pub struct EntityBuilder {
    name: String,
    glyph: char,
    rank: OccupancyRank,
    energy: i32,
    speed: Option<i32>,
    health: Option<Health>,
    attack: Option<Attack>,
    light: Option<LightSource>,
    sight: Option<Sight>,
    stair: Option<Stair>,
    pickup: Option<Item>,
    inventory: Option<Inventory>,
    charge: Option<Charge>,
    behavior: Option<Box<dyn Behavior>>,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>, glyph: char, rank: OccupancyRank) -> Self {
        Self {
            name: name.into(),
            glyph,
            rank,
            energy: 0,
            speed: None,
            health: None,
            attack: None,
            light: None,
            sight: None,
            stair: None,
            pickup: None,
            inventory: None,
            charge: None,
            behavior: None,
        }
    }

    pub fn energy(mut self, energy: i32) -> Self {
        self.energy = energy;
        self
    }

    pub fn speed(mut self, cost: i32) -> Self {
        self.speed = Some(cost);
        self
    }

    pub fn health(mut self, max: i32) -> Self {
        self.health = Some(Health::new(max));
        self
    }

    pub fn attack(mut self, attack: Attack) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn light(mut self, active: bool) -> Self {
        self.light = Some(LightSource { active });
        self
    }

    pub fn sight(mut self, radius: i32, memory: FovMemory) -> Self {
        self.sight = Some(Sight::new(radius, memory));
        self
    }

    pub fn stair(mut self, stair: Stair) -> Self {
        self.stair = Some(stair);
        self
    }

    pub fn pickup(mut self, item: Item) -> Self {
        self.pickup = Some(item);
        self
    }

    pub fn inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Able to charge, at `cost` energy per charging step
    pub fn charge(mut self, cost: i32) -> Self {
        self.charge = Some(Charge::new(cost));
        self
    }

    pub fn behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub(crate) fn build(self, id: EntityId) -> Entity {
        Entity {
            id,
            name: self.name,
            glyph: self.glyph,
            rank: self.rank,
            position: Position::OFF_GRID,
            depth: OFF_GRID_DEPTH,
            is_active: true,
            last_turn_processed: None,
            grid_index: None,
            energy: self.energy,
            speed: self.speed,
            health: self.health,
            attack: self.attack,
            light: self.light,
            sight: self.sight,
            stair: self.stair,
            pickup: self.pickup,
            inventory: self.inventory,
            charge: self.charge,
            behavior: self.behavior,
        }
    }
}
