#![allow(dead_code)]

use std::collections::HashSet;
use std::time::Duration;
use warehouse_sim::sync::{InitResponse, ObstacleResponse, RouteResponse};
use warehouse_sim::{
    AdapterError, Cell, Config, InteractionMode, LocalBackend, Simulation, StatusKind, SyncAdapter,
};

pub const STEP: Duration = Duration::from_millis(300);

/// Config with a fixed seed and always-large footprints
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.placement.seed = Some(7);
    config.placement.shelf_small_probability = 0.0;
    config.placement.crate_stack_probability = 1.0;
    config
}

pub fn simulation() -> Simulation<LocalBackend> {
    Simulation::new(&test_config(), LocalBackend::new())
}

/// Build an initialized simulation from a text layout.
///
/// `S` start, `E` end, `X` single-cell obstacle, `.` free.
pub fn from_layout(layout: &str) -> Simulation<LocalBackend> {
    let rows: Vec<&str> = layout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let height = rows.len() as i32;
    let width = rows.first().map(|r| r.chars().count()).unwrap_or(0) as i32;

    let mut sim = simulation();
    sim.initialize(width, height).expect("layout dimensions");

    let mut start = None;
    let mut end = None;
    let mut blocked = Vec::new();
    for (y, row) in rows.iter().enumerate() {
        for (x, symbol) in row.chars().enumerate() {
            let cell = Cell::new(x as i32, y as i32);
            match symbol {
                'S' => start = Some(cell),
                'E' => end = Some(cell),
                'X' => blocked.push(cell),
                _ => {}
            }
        }
    }

    sim.enter_mode(InteractionMode::ToggleObstacle).unwrap();
    for cell in blocked {
        sim.click(cell.x, cell.y).expect("toggle obstacle");
    }
    if let Some(cell) = start {
        sim.enter_mode(InteractionMode::SetStart).unwrap();
        sim.click(cell.x, cell.y).expect("set start");
    }
    if let Some(cell) = end {
        sim.enter_mode(InteractionMode::SetEnd).unwrap();
        sim.click(cell.x, cell.y).expect("set end");
    }
    sim.enter_mode(InteractionMode::Idle).unwrap();
    sim
}

pub fn last_status(sim: &Simulation<impl SyncAdapter>) -> (StatusKind, String) {
    let entry = sim.status().current().expect("status entry");
    (entry.kind, entry.message.clone())
}

/// Collaborator double that wraps [`LocalBackend`] and fails on demand
#[derive(Debug, Default)]
pub struct FlakyBackend {
    pub inner: LocalBackend,
    /// Every call fails while set
    pub offline: bool,
    /// Adds on these cells fail
    pub failing_cells: HashSet<Cell>,
    /// Fail every add after this many successful adds
    pub adds_before_failure: Option<usize>,
    /// Planner answers with just the start cell
    pub single_cell_routes: bool,
    pub add_calls: usize,
    pub remove_calls: usize,
    pub init_calls: usize,
    pub route_calls: usize,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_online(&self) -> Result<(), AdapterError> {
        if self.offline {
            Err(AdapterError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SyncAdapter for FlakyBackend {
    fn initialize(&mut self, width: i32, height: i32) -> Result<InitResponse, AdapterError> {
        self.init_calls += 1;
        self.check_online()?;
        self.inner.initialize(width, height)
    }

    fn add_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError> {
        self.add_calls += 1;
        self.check_online()?;
        if self.failing_cells.contains(&cell) {
            return Err(AdapterError::Unavailable(format!("write rejected for {}", cell)));
        }
        if let Some(limit) = self.adds_before_failure {
            if limit == 0 {
                return Err(AdapterError::Unavailable("quota exceeded".to_string()));
            }
            self.adds_before_failure = Some(limit - 1);
        }
        self.inner.add_obstacle(cell)
    }

    fn remove_obstacle(&mut self, cell: Cell) -> Result<ObstacleResponse, AdapterError> {
        self.remove_calls += 1;
        self.check_online()?;
        self.inner.remove_obstacle(cell)
    }

    fn plan_route(&mut self, start: Cell, end: Cell) -> Result<RouteResponse, AdapterError> {
        self.route_calls += 1;
        self.check_online()?;
        if self.single_cell_routes {
            return Ok(RouteResponse {
                route: vec![start],
                message: String::new(),
            });
        }
        self.inner.plan_route(start, end)
    }
}

pub fn flaky_simulation() -> Simulation<FlakyBackend> {
    Simulation::new(&test_config(), FlakyBackend::new())
}
