use serde::{Deserialize, Serialize};

use crate::core::types::Direction;

/// An already-decoded player action for one turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    #[default]
    Rest,
    /// Step, or attack whatever stands in the way
    Move(Direction),
    /// Climb an up stair
    Ascend,
    /// Go down a down stair
    Descend,
    /// Throw a dart in a direction, or at the nearest visible target
    Fire(Option<Direction>),
    /// Start running in a direction; later intents are ignored until the run ends
    Charge(Direction),
    /// Equip the inventory item at this index
    Equip(usize),
    /// Unequip the inventory item at this index
    Unequip(usize),
}

impl Intent {
    /// Every intent a random driver may pick
    pub fn all() -> Vec<Intent> {
        let mut intents = vec![
            Intent::Rest,
            Intent::Ascend,
            Intent::Descend,
            Intent::Fire(None),
            Intent::Equip(0),
            Intent::Unequip(0),
        ];
        for direction in Direction::RING {
            intents.push(Intent::Move(direction));
            intents.push(Intent::Fire(Some(direction)));
            intents.push(Intent::Charge(direction));
        }
        intents
    }
}
