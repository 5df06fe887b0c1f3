//! Turn processing: intents, the scheduler and its event channel

pub mod events;
pub mod intent;
pub mod scheduler;

pub use events::{TurnEvent, TurnEventType, TurnLog};
pub use intent::Intent;
pub use scheduler::TurnScheduler;
