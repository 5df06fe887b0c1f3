//! Typed capability components
//!
//! An entity's capabilities are the components it carries. The core asks
//! "can this be attacked / does it move / does it emit light" through
//! these, never by probing concrete kinds.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::types::{Depth, Direction, Position};
use crate::spatial::layer::{GridLayer, OccupancyRank, Occupant};

/// Capability set the core and content can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Health,
    Attacker,
    Pathable,
    Lit,
    /// Carries an inventory and picks things up
    Carrier,
    /// Can be picked up
    Portable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub max: i32,
    pub current: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { max, current: max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Apply a signed change; true only on the change that kills
    pub fn change(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.current = (self.current + amount).min(self.max);
        was_alive && !self.is_alive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    pub damage: i32,
    /// Energy spent per attack
    pub cost: i32,
}

impl Attack {
    pub fn new(name: impl Into<String>, damage: i32, cost: i32) -> Self {
        Self { name: name.into(), damage, cost }
    }
}

/// A carried thing, as stored in an inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub glyph: char,
    /// Melee damage when equipped; `None` for things that are not weapons
    pub damage: Option<i32>,
}

impl Item {
    pub fn new(name: impl Into<String>, glyph: char) -> Self {
        Self { name: name.into(), glyph, damage: None }
    }

    pub fn weapon(name: impl Into<String>, glyph: char, damage: i32) -> Self {
        Self { name: name.into(), glyph, damage: Some(damage) }
    }
}

/// Carried items with a single equipped slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub contents: Vec<Item>,
    /// Index into `contents`
    pub equipped: Option<usize>,
    /// Energy spent per equip or unequip
    pub cost: i32,
}

impl Inventory {
    pub fn new(cost: i32) -> Self {
        Self { cost, ..Self::default() }
    }

    pub fn with(mut self, item: Item) -> Self {
        self.contents.push(item);
        self
    }

    pub fn pick_up(&mut self, item: Item) {
        self.contents.push(item);
    }

    /// Equip the item at `index`, replacing whatever was equipped
    pub fn equip(&mut self, index: usize) -> Option<&Item> {
        let item = self.contents.get(index)?;
        self.equipped = Some(index);
        Some(item)
    }

    /// Unequip the item at `index` if it is the equipped one
    pub fn unequip(&mut self, index: usize) -> Option<&Item> {
        if self.equipped != Some(index) {
            return None;
        }
        self.equipped = None;
        self.contents.get(index)
    }

    pub fn equipped_item(&self) -> Option<&Item> {
        self.equipped.and_then(|index| self.contents.get(index))
    }

    /// Damage of the equipped weapon, if any
    pub fn damage(&self) -> Option<i32> {
        self.equipped_item().and_then(|item| item.damage)
    }
}

/// A straight-line run that builds up melee damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    /// Set while a run is under way
    pub direction: Option<Direction>,
    /// Cells run since the charge started
    pub distance: i32,
    /// Energy per charging step or charging attack
    pub cost: i32,
}

impl Charge {
    pub fn new(cost: i32) -> Self {
        Self { direction: None, distance: 0, cost }
    }

    pub fn is_charging(&self) -> bool {
        self.direction.is_some()
    }

    pub fn start(&mut self, direction: Direction) {
        self.direction = Some(direction);
        self.distance = 0;
    }

    pub fn advance(&mut self) {
        self.distance += 1;
    }

    /// Stop running; returns the bonus damage built up
    pub fn end(&mut self) -> i32 {
        self.direction = None;
        std::mem::take(&mut self.distance)
    }
}

/// Light emitter; switched on by activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightSource {
    pub active: bool,
}

/// Stairwell leading to the neighbouring depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stair {
    /// Leads to depth - 1
    Up,
    /// Leads to depth + 1
    Down,
}

impl Stair {
    pub fn destination(self, depth: Depth) -> Depth {
        match self {
            Stair::Up => depth - 1,
            Stair::Down => depth + 1,
        }
    }
}

/// What stays in memory once a cell drops out of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FovMemory {
    /// Out of sight, out of mind
    Nothing,
    /// Keep objects and walls; creatures and bare floor are forgotten
    #[default]
    Objects,
    /// Keep the last full snapshot
    Everything,
}

impl FovMemory {
    fn keeps(self, rank: OccupancyRank) -> bool {
        match self {
            FovMemory::Nothing => false,
            FovMemory::Objects => matches!(rank, OccupancyRank::Object | OccupancyRank::Wall),
            FovMemory::Everything => true,
        }
    }
}

/// Field-of-view bookkeeping for an entity that looks around
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sight {
    pub radius: i32,
    pub memory: FovMemory,
    /// Cells seen this turn
    pub visible: BTreeSet<Position>,
    /// Occupants believed to be in each known cell
    pub mental_map: BTreeMap<Position, Vec<Occupant>>,
}

impl Sight {
    pub fn new(radius: i32, memory: FovMemory) -> Self {
        Self { radius, memory, ..Self::default() }
    }

    pub fn can_see(&self, pos: Position) -> bool {
        self.visible.contains(&pos)
    }

    /// Known from an earlier look but not in view now
    pub fn remembers(&self, pos: Position) -> bool {
        !self.can_see(pos) && self.mental_map.contains_key(&pos)
    }

    /// What this entity believes occupies `pos`
    pub fn recall(&self, pos: Position) -> Option<&[Occupant]> {
        self.mental_map.get(&pos).map(Vec::as_slice)
    }

    /// Set the new visible set and update the mental map from `grid`
    ///
    /// Visible cells are copied in full; every other known cell is thinned
    /// according to the memory mode and dropped once empty.
    pub fn refresh(&mut self, new_visible: BTreeSet<Position>, grid: &GridLayer) {
        let memory = self.memory;
        self.mental_map.retain(|pos, occupants| {
            if new_visible.contains(pos) {
                return true;
            }
            occupants.retain(|o| memory.keeps(o.rank));
            !occupants.is_empty()
        });
        for &pos in &new_visible {
            self.mental_map.insert(pos, grid.cell_at(pos).to_vec());
        }
        self.visible = new_visible;
    }
}
