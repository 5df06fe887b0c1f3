//! Turn event channel
//!
//! Everything the presentation layer needs to hear about a turn (messages,
//! removals, transfers, animation cues) is pushed here and drained after
//! `advance` returns.

use serde::{Deserialize, Serialize};

use crate::core::error::TransferFailure;
use crate::core::types::{Depth, EntityId, Position, Turn};

/// Log entry for turn events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub turn: Turn,
    pub event_type: TurnEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnEventType {
    Message,
    Damaged { entity: EntityId, amount: i32 },
    Killed { entity: EntityId },
    Removed { entity: EntityId },
    Activated { entity: EntityId },
    PickedUp { entity: EntityId, by: EntityId },
    Transferred { entity: EntityId, from: Depth, to: Depth },
    TransferFailed(TransferFailure),
    MoveRejected { entity: EntityId, to: Position },
    /// Animation cue: an object flew along this path
    Projectile { path: Vec<Position> },
    /// Animation cue: an explosion centred here
    Burst { center: Position },
}

/// Events produced during one or more turns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnLog {
    pub events: Vec<TurnEvent>,
}

impl TurnLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: TurnEventType, description: String, turn: Turn) {
        self.events.push(TurnEvent {
            turn,
            event_type,
            description,
        });
    }

    /// Hand every pending event to the caller
    pub fn drain(&mut self) -> Vec<TurnEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn removed(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.events.iter().filter_map(|e| match e.event_type {
            TurnEventType::Removed { entity } => Some(entity),
            _ => None,
        })
    }
}
