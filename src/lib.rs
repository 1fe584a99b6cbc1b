pub mod animator;
pub mod backend;
pub mod config;
pub mod error;
pub mod grid;
pub mod mode;
pub mod obstacle;
pub mod occupancy;
pub mod pathfinding;
pub mod preset;
pub mod scheduler;
pub mod simulation;
pub mod status;
pub mod sync;

pub use animator::{AnimationEvent, AnimatorState, RouteAnimator};
pub use backend::LocalBackend;
pub use config::Config;
pub use error::{AdapterError, SimError, ValidationError};
pub use grid::{Cell, GridModel};
pub use mode::{ClickOutcome, InteractionMode, ModeController};
pub use obstacle::{FootprintTemplate, MultiCellObstacle, ObstacleKind, TemplatePolicy};
pub use occupancy::{can_place, Region};
pub use simulation::{RouteOutcome, Simulation};
pub use status::{StatusKind, StatusLog};
pub use sync::{ObstacleStore, PlacementReport, SyncAdapter};
