//! Error types for simulation operations.

use crate::grid::Cell;
use thiserror::Error;

/// Local rejections detected before any collaborator is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please initialize the warehouse first.")]
    NotInitialized,

    #[error("Width and height must be between {min} and {max} (got {width}x{height}).")]
    InvalidDimensions { width: i32, height: i32, min: i32, max: i32 },

    #[error("Cell {0} is out of bounds.")]
    OutOfBounds(Cell),

    #[error("Cannot set start point on an obstacle.")]
    StartOnObstacle(Cell),

    #[error("Cannot set end point on an obstacle.")]
    EndOnObstacle(Cell),

    #[error("Start point cannot be the same as the end point.")]
    StartEqualsEnd(Cell),

    #[error("End point cannot be the same as the start point.")]
    EndEqualsStart(Cell),

    #[error("Robot cannot be placed on an obstacle.")]
    RobotOnObstacle(Cell),

    #[error("Cannot place obstacle on start point.")]
    ObstacleOnStart(Cell),

    #[error("Cannot place obstacle on end point.")]
    ObstacleOnEnd(Cell),

    #[error("Cannot place obstacle in this location. Space is occupied or out of bounds.")]
    FootprintBlocked { origin: Cell, width: i32, height: i32 },

    #[error("Please set both start and end points before finding a path.")]
    MissingEndpoints,

    #[error("Route of {len} cell(s) is too short to follow.")]
    RouteTooShort { len: usize },

    #[error("No path available for robot to follow.")]
    NoStartPoint,

    #[error("{action} is disabled when a preset is loaded. Clear simulation to customize.")]
    PresetLocked { action: &'static str },

    #[error("Preset environment \"{0}\" not found.")]
    UnknownPreset(String),

    #[error("Preset environment \"{name}\" is invalid: {reason}")]
    InvalidPreset { name: String, reason: Box<ValidationError> },
}

/// Failures reported by the persistence or planning collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("Warehouse not initialized.")]
    NotInitialized,

    #[error("Cannot add obstacle at {0}: Out of bounds.")]
    OutOfBounds(Cell),

    #[error("Failed to remove obstacle at {0}. It might not exist.")]
    NotFound(Cell),

    #[error("{0}")]
    InvalidEndpoint(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Any failure surfaced by a simulation operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl SimError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SimError::Validation(_))
    }

    pub fn is_adapter(&self) -> bool {
        matches!(self, SimError::Adapter(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
