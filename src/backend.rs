//! In-process collaborator: authoritative obstacle store plus route planner.

use crate::error::AdapterError;
use crate::grid::Cell;
use crate::pathfinding::find_route;
use crate::sync::{InitResponse, ObstacleResponse, RouteResponse, SyncAdapter};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone)]
struct Warehouse {
    width: i32,
    height: i32,
    obstacles: HashSet<Cell>,
}

impl Warehouse {
    fn is_valid_location(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    fn obstacle_list(&self) -> Vec<(i32, i32)> {
        let mut cells: Vec<(i32, i32)> = self.obstacles.iter().map(|&c| c.into()).collect();
        cells.sort_by_key(|&(x, y)| (y, x));
        cells
    }
}

/// Reference implementation of [`SyncAdapter`] that keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    warehouse: Option<Warehouse>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authoritative obstacle cells, if initialized
    pub fn obstacles(&self) -> Option<&HashSet<Cell>> {
        self.warehouse.as_ref().map(|w| &w.obstacles)
    }

    fn warehouse_mut(&mut self) -> Result<&mut Warehouse, AdapterError> {
        self.warehouse.as_mut().ok_or(AdapterError::NotInitialized)
    }
}

impl SyncAdapter for LocalBackend {
    fn initialize(&mut self, width: i32, height: i32) -> Result<InitResponse, AdapterError> {
        if width <= 0 || height <= 0 {
            return Err(AdapterError::InvalidEndpoint(
                "Width and height must be positive integers.".to_string(),
            ));
        }
        let warehouse = Warehouse {
            width,
            height,
            obstacles: HashSet::new(),
        };
        let obstacles = warehouse.obstacle_list();
        self.warehouse = Some(warehouse);
        debug!(width, height, "backend warehouse created");

        Ok(InitResponse {
            width,
            height,
            obstacles,
            message: format!("Warehouse initialized with width {} and height {}.", width, height),
        })
    }

    fn add_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError> {
        let warehouse = self.warehouse_mut()?;
        if !warehouse.is_valid_location(cell) {
            return Err(AdapterError::OutOfBounds(cell));
        }
        warehouse.obstacles.insert(cell);
        Ok(ObstacleResponse {
            obstacles: warehouse.obstacle_list(),
            message: format!("Obstacle added at {}", cell),
        })
    }

    fn remove_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError> {
        let warehouse = self.warehouse_mut()?;
        if !warehouse.obstacles.remove(&cell) {
            return Err(AdapterError::NotFound(cell));
        }
        Ok(ObstacleResponse {
            obstacles: warehouse.obstacle_list(),
            message: format!("Obstacle removed from {}", cell),
        })
    }

    fn plan_route(&mut self, start: Cell, end: Cell) -> Result<RouteResponse, AdapterError> {
        let warehouse = self.warehouse_mut()?;

        for (label, cell) in [("Start", start), ("End", end)] {
            if !warehouse.is_valid_location(cell) {
                return Err(AdapterError::InvalidEndpoint(format!("{} point {} is out of bounds.", label, cell)));
            }
            if warehouse.obstacles.contains(&cell) {
                return Err(AdapterError::InvalidEndpoint(format!("{} point {} is an obstacle.", label, cell)));
            }
        }

        match find_route(warehouse.width, warehouse.height, &warehouse.obstacles, start, end) {
            Some(route) => Ok(RouteResponse {
                route,
                message: String::new(),
            }),
            None => Ok(RouteResponse {
                route: Vec::new(),
                message: "No path found.".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_initialization() {
        let mut backend = LocalBackend::new();
        assert_eq!(backend.add_obstacle(Cell::new(0, 0)), Err(AdapterError::NotInitialized));
        assert_eq!(
            backend.plan_route(Cell::new(0, 0), Cell::new(1, 1)),
            Err(AdapterError::NotInitialized)
        );
    }

    #[test]
    fn add_and_remove() {
        let mut backend = LocalBackend::new();
        backend.initialize(5, 5).unwrap();

        let response = backend.add_obstacle(Cell::new(2, 1)).unwrap();
        assert_eq!(response.obstacles, vec![(2, 1)]);
        assert_eq!(response.message, "Obstacle added at (2,1)");

        assert_eq!(backend.add_obstacle(Cell::new(5, 0)), Err(AdapterError::OutOfBounds(Cell::new(5, 0))));

        let response = backend.remove_obstacle(Cell::new(2, 1)).unwrap();
        assert!(response.obstacles.is_empty());
        assert_eq!(backend.remove_obstacle(Cell::new(2, 1)), Err(AdapterError::NotFound(Cell::new(2, 1))));
    }

    #[test]
    fn reinitialize_clears_obstacles() {
        let mut backend = LocalBackend::new();
        backend.initialize(5, 5).unwrap();
        backend.add_obstacle(Cell::new(1, 1)).unwrap();

        let response = backend.initialize(6, 4).unwrap();
        assert!(response.obstacles.is_empty());
        assert_eq!(backend.obstacles().map(|o| o.len()), Some(0));
    }

    #[test]
    fn plan_route_outcomes() {
        let mut backend = LocalBackend::new();
        backend.initialize(3, 3).unwrap();
        for y in 0..3 {
            backend.add_obstacle(Cell::new(1, y)).unwrap();
        }

        let none = backend.plan_route(Cell::new(0, 1), Cell::new(2, 1)).unwrap();
        assert!(none.route.is_empty());
        assert_eq!(none.message, "No path found.");

        let err = backend.plan_route(Cell::new(1, 1), Cell::new(2, 1)).unwrap_err();
        assert_eq!(err, AdapterError::InvalidEndpoint("Start point (1,1) is an obstacle.".to_string()));

        let err = backend.plan_route(Cell::new(0, 0), Cell::new(3, 0)).unwrap_err();
        assert_eq!(err, AdapterError::InvalidEndpoint("End point (3,0) is out of bounds.".to_string()));

        let same = backend.plan_route(Cell::new(0, 0), Cell::new(0, 0)).unwrap();
        assert_eq!(same.route, vec![Cell::new(0, 0)]);
    }
}
