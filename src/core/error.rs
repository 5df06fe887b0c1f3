use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Depth, EntityId, Position};

/// Why a grid placement was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("cell {0} is already held by an occupant of equal or higher rank")]
    RankTooLow(Position),
}

/// A cross-level transfer that could not be completed
///
/// Non-fatal: the entity stays where it was and the failure is reported
/// through the turn log.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("could not move {entity} from depth {from} to depth {to}: {reason}")]
pub struct TransferFailure {
    pub entity: EntityId,
    pub from: Depth,
    pub to: Depth,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum DelveError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Invalid depth: {0}")]
    InvalidDepth(Depth),

    #[error("Placement error: {0}")]
    Placement(#[from] PlacementError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DelveError>;
