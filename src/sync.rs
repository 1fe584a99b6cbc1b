//! Boundary to the obstacle-persistence and route-planning collaborators.
//!
//! [`SyncAdapter`] is the narrow interface the simulation issues calls
//! through. [`ObstacleStore`] wraps an adapter and is the only place the
//! model's obstacle cache is reconciled: after every successful mutation the
//! cache is replaced wholesale by the collaborator's authoritative set.

use crate::error::AdapterError;
use crate::grid::{Cell, GridModel};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Response to `initialize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub obstacles: Vec<(i32, i32)>,
    #[serde(default)]
    pub message: String,
}

/// Response to an obstacle add or remove
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleResponse {
    pub obstacles: Vec<(i32, i32)>,
    #[serde(default)]
    pub message: String,
}

/// Response to `plan_route`; an empty route means no path exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResponse {
    #[serde(rename = "path", default)]
    pub route: Vec<Cell>,
    #[serde(default)]
    pub message: String,
}

impl InitResponse {
    pub fn obstacle_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.obstacles.iter().map(|&c| Cell::from(c))
    }
}

impl ObstacleResponse {
    pub fn obstacle_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.obstacles.iter().map(|&c| Cell::from(c))
    }
}

/// Operations issued to the external collaborators. Calls may fail; the
/// caller surfaces failures and never retries.
pub trait SyncAdapter {
    fn initialize(&mut self, width: i32, height: i32) -> Result<InitResponse, AdapterError>;
    fn add_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError>;
    fn remove_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError>;
    fn plan_route(&mut self, start: Cell, end: Cell) -> Result<RouteResponse, AdapterError>;
}

impl<A: SyncAdapter + ?Sized> SyncAdapter for Box<A> {
    fn initialize(&mut self, width: i32, height: i32) -> Result<InitResponse, AdapterError> {
        (**self).initialize(width, height)
    }

    fn add_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError> {
        (**self).add_obstacle(cell)
    }

    fn remove_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError> {
        (**self).remove_obstacle(cell)
    }

    fn plan_route(&mut self, start: Cell, end: Cell) -> Result<RouteResponse, AdapterError> {
        (**self).plan_route(start, end)
    }
}

/// Result of a toggle on one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleResult {
    /// Whether the cell is blocked according to the authoritative set
    pub blocked: bool,
    pub message: String,
}

/// Outcome of persisting a batch of cells one call at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub persisted: Vec<Cell>,
    pub failed: Vec<(Cell, AdapterError)>,
}

impl PlacementReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Repository over a [`SyncAdapter`] that keeps the model's obstacle cache
/// equal to the last authoritative response.
#[derive(Debug)]
pub struct ObstacleStore<A> {
    adapter: A,
}

impl<A: SyncAdapter> ObstacleStore<A> {
    pub fn new(adapter: A) -> Self {
        ObstacleStore { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// (Re)create the authoritative grid and, on success, replace the
    /// model's dimensions and obstacle cache. The model is untouched on failure.
    pub fn initialize(&mut self, model: &mut GridModel, width: i32, height: i32) -> Result<InitResponse, AdapterError> {
        let response = self.adapter.initialize(width, height)?;
        model.set_dimensions(response.width, response.height);
        model.set_obstacle_set(response.obstacle_cells());
        info!(width = response.width, height = response.height, "grid initialized");
        Ok(response)
    }

    /// Flip membership of `cell`: remove if cached as blocked, add otherwise
    pub fn toggle(&mut self, model: &mut GridModel, cell: Cell) -> Result<ToggleResult, AdapterError> {
        let response = if model.has_obstacle(cell) {
            self.adapter.remove_obstacle(cell)?
        } else {
            self.adapter.add_obstacle(cell)?
        };
        model.set_obstacle_set(response.obstacle_cells());
        Ok(ToggleResult {
            blocked: model.has_obstacle(cell),
            message: response.message,
        })
    }

    /// Persist each cell in turn. Every cell is attempted even after a
    /// failure; the cache is reconciled from the last successful response.
    pub fn persist_cells(&mut self, model: &mut GridModel, cells: &[Cell]) -> PlacementReport {
        let mut report = PlacementReport::default();
        let mut latest: Option<ObstacleResponse> = None;

        for &cell in cells {
            match self.adapter.add_obstacle(cell) {
                Ok(response) => {
                    report.persisted.push(cell);
                    latest = Some(response);
                }
                Err(e) => {
                    warn!(x = cell.x, y = cell.y, error = %e, "failed to persist obstacle cell");
                    report.failed.push((cell, e));
                }
            }
        }

        if let Some(response) = latest {
            model.set_obstacle_set(response.obstacle_cells());
        }
        report
    }

    pub fn plan_route(&mut self, start: Cell, end: Cell) -> Result<RouteResponse, AdapterError> {
        self.adapter.plan_route(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_service_payloads() {
        let init: InitResponse = serde_json::from_str(
            r#"{"message": "Warehouse initialized with width 5 and height 4.", "width": 5, "height": 4, "obstacles": []}"#,
        )
        .unwrap();
        assert_eq!((init.width, init.height), (5, 4));
        assert!(init.obstacles.is_empty());

        let obstacles: ObstacleResponse =
            serde_json::from_str(r#"{"message": "Obstacle added at (1,2)", "obstacles": [[1, 2], [3, 0]]}"#).unwrap();
        let cells: Vec<Cell> = obstacles.obstacle_cells().collect();
        assert_eq!(cells, vec![Cell::new(1, 2), Cell::new(3, 0)]);

        let route: RouteResponse = serde_json::from_str(r#"{"path": [{"x": 0, "y": 0}, {"x": 1, "y": 0}]}"#).unwrap();
        assert_eq!(route.route, vec![Cell::new(0, 0), Cell::new(1, 0)]);
        assert_eq!(route.message, "");

        let none: RouteResponse = serde_json::from_str(r#"{"message": "No path found.", "path": []}"#).unwrap();
        assert!(none.route.is_empty());
    }

    #[test]
    fn encodes_route_as_points() {
        let response = RouteResponse {
            route: vec![Cell::new(2, 3)],
            message: String::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["path"][0]["x"], 2);
        assert_eq!(json["path"][0]["y"], 3);
    }
}
