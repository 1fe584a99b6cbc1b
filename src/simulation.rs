//! The simulation aggregate and the operations exposed to presentation.
//!
//! [`Simulation`] owns the grid model, the mode controller, the route
//! animator, the obstacle store and the status log. Every user-facing
//! operation goes through it and leaves a status message behind.

use crate::animator::{AnimationEvent, AnimatorState, RouteAnimator};
use crate::config::{Config, GridConfig};
use crate::error::{Result, SimError, ValidationError};
use crate::grid::{Cell, GridModel};
use crate::mode::{ClickOutcome, InteractionMode, ModeController};
use crate::obstacle::ObstacleKind;
use crate::preset::{builtin_presets, Preset};
use crate::status::{StatusKind, StatusLog};
use crate::sync::{InitResponse, ObstacleStore, PlacementReport, SyncAdapter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{info, warn};

/// Result of a route request that reached the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A route was found and playback started
    Started { waypoints: usize },
    /// The planner reported no reachable path
    NoRoute { message: String },
}

pub struct Simulation<A> {
    model: GridModel,
    controller: ModeController,
    animator: RouteAnimator,
    store: ObstacleStore<A>,
    status: StatusLog,
    rng: StdRng,
    grid_limits: GridConfig,
    presets: Vec<Preset>,
    loaded_preset: Option<String>,
}

impl<A: SyncAdapter> Simulation<A> {
    pub fn new(config: &Config, adapter: A) -> Self {
        let rng = match config.placement.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut presets = builtin_presets();
        presets.extend(config.presets.iter().cloned());

        let mut sim = Simulation {
            model: GridModel::default(),
            controller: ModeController::new(config.placement.policy()),
            animator: RouteAnimator::new(config.animation.step_delay()),
            store: ObstacleStore::new(adapter),
            status: StatusLog::new(config.status.capacity),
            rng,
            grid_limits: config.grid.clone(),
            presets,
            loaded_preset: None,
        };
        sim.report(StatusKind::Info, "System ready. Please load a preset environment or initialize manually.");
        sim
    }

    pub fn model(&self) -> &GridModel {
        &self.model
    }

    pub fn mode(&self) -> InteractionMode {
        self.controller.mode()
    }

    pub fn obstacle_kind(&self) -> ObstacleKind {
        self.controller.kind()
    }

    pub fn animator_state(&self) -> AnimatorState {
        self.animator.state()
    }

    pub fn animator(&self) -> &RouteAnimator {
        &self.animator
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn loaded_preset(&self) -> Option<&str> {
        self.loaded_preset.as_deref()
    }

    pub fn adapter(&self) -> &A {
        self.store.adapter()
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        self.store.adapter_mut()
    }

    /// Simulated time
    pub fn now(&self) -> Duration {
        self.animator.now()
    }

    /// Text description of the active mode
    pub fn mode_description(&self) -> String {
        self.mode().describe(self.obstacle_kind())
    }

    /// (Re)create the grid with new dimensions
    pub fn initialize(&mut self, width: i32, height: i32) -> Result<InitResponse> {
        if self.loaded_preset.is_some() {
            return self.reject(ValidationError::PresetLocked { action: "Manual initialization" });
        }
        if !self.grid_limits.accepts(width, height) {
            return self.reject(ValidationError::InvalidDimensions {
                width,
                height,
                min: self.grid_limits.min_size,
                max: self.grid_limits.max_size,
            });
        }

        self.report(StatusKind::Info, format!("Initializing warehouse: {}x{}...", width, height));
        match self.store.initialize(&mut self.model, width, height) {
            Ok(response) => {
                self.animator.cancel();
                self.controller.enter(InteractionMode::Idle);
                let message = if response.message.is_empty() {
                    format!("Warehouse {}x{} initialized.", width, height)
                } else {
                    response.message.clone()
                };
                self.report(StatusKind::Success, message);
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "initialization failed");
                self.report(StatusKind::Error, format!("Initialization failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// Select the interpretation of the next click
    pub fn enter_mode(&mut self, mode: InteractionMode) -> Result<()> {
        if self.loaded_preset.is_some() && mode != InteractionMode::Idle {
            let action = match mode {
                InteractionMode::SetStart => "Modifying start point",
                InteractionMode::SetEnd => "Modifying end point",
                _ => "Modifying obstacles",
            };
            return self.reject(ValidationError::PresetLocked { action });
        }

        self.controller.enter(mode);
        let hint = match mode {
            InteractionMode::Idle => "Standby.",
            InteractionMode::SetStart => "Click on the grid to set robot start position.",
            InteractionMode::SetEnd => "Click on the grid to set destination point.",
            InteractionMode::ToggleObstacle => "Click on grid cells to place or remove obstacles.",
            InteractionMode::PlaceMultiCell => {
                "Click on the grid to place a multi-grid obstacle. Will use the selected obstacle type."
            }
        };
        self.report(StatusKind::Info, hint);
        Ok(())
    }

    pub fn select_obstacle_kind(&mut self, kind: ObstacleKind) {
        self.controller.select_kind(kind);
        self.report(StatusKind::Info, format!("Obstacle type: {}.", kind));
    }

    /// Handle a click on grid cell `(x, y)`
    pub fn click(&mut self, x: i32, y: i32) -> Result<ClickOutcome> {
        let cell = Cell::new(x, y);
        let outcome = match self.controller.click(cell, &mut self.model, &mut self.store, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = match &e {
                    SimError::Adapter(inner) => format!("Failed: {}", inner),
                    SimError::Validation(inner) => inner.to_string(),
                };
                self.report(StatusKind::Error, message);
                return Err(e);
            }
        };

        match &outcome {
            ClickOutcome::StartSet { cell, .. } => {
                self.report(StatusKind::Success, format!("Start point set at {}.", cell));
            }
            ClickOutcome::EndSet { cell } => {
                self.report(StatusKind::Success, format!("End point set at {}.", cell));
            }
            ClickOutcome::ObstacleToggled { message, .. } => {
                self.report(StatusKind::Success, message.clone());
            }
            ClickOutcome::MultiCellPlaced { obstacle, report } => {
                self.report(StatusKind::Success, format!("{} placed at {}.", obstacle.kind, obstacle.origin));
                self.report_partial(report);
            }
            ClickOutcome::Hint => {
                self.report(
                    StatusKind::Info,
                    "Select a mode (Set Start, Set End, Place Obstacles) to interact with the grid.",
                );
            }
        }
        Ok(outcome)
    }

    /// Ask the planner for a route from start to end and start playback
    pub fn request_route(&mut self) -> Result<RouteOutcome> {
        if !self.model.is_initialized() {
            return self.reject(ValidationError::NotInitialized);
        }
        let (start, end) = match (self.model.start(), self.model.end()) {
            (Some(start), Some(end)) => (start, end),
            _ => return self.reject(ValidationError::MissingEndpoints),
        };

        self.animator.cancel();
        self.model.set_route(Vec::new());
        self.report(StatusKind::Info, "Calculating route...");

        let response = match self.store.plan_route(start, end) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "route planning failed");
                self.report(StatusKind::Error, format!("Pathfinding error: {}", e));
                return Err(e.into());
            }
        };

        if response.route.is_empty() {
            let message = if response.message.is_empty() {
                "No path could be found.".to_string()
            } else {
                response.message
            };
            info!("planner found no route");
            self.report(StatusKind::Info, message.clone());
            return Ok(RouteOutcome::NoRoute { message });
        }

        let waypoints = response.route.len();
        if let Err(e) = self.animator.start_route(response.route.clone(), &mut self.model) {
            return self.reject(e);
        }
        self.model.set_route(response.route);
        self.report(
            StatusKind::Success,
            format!("Path found with {} steps. Starting robot...", waypoints),
        );
        self.report(StatusKind::Info, "Robot is moving to destination...");
        Ok(RouteOutcome::Started { waypoints })
    }

    /// Stop playback; returns false if nothing was running
    pub fn cancel_animation(&mut self) -> bool {
        let cancelled = self.animator.cancel();
        if cancelled {
            self.report(StatusKind::Info, "Robot animation stopped.");
        }
        cancelled
    }

    /// Clear the simulation back to an empty grid of the current size
    pub fn reset(&mut self) {
        self.animator.cancel();

        if self.model.is_initialized() {
            self.report(StatusKind::Info, "Resetting simulation by re-initializing warehouse...");
            let (width, height) = (self.model.width(), self.model.height());
            if let Err(e) = self.store.initialize(&mut self.model, width, height) {
                warn!(error = %e, "re-initialization during reset failed");
                self.report(StatusKind::Error, format!("Error resetting warehouse: {}", e));
            }
        }

        self.model.reset();
        self.controller.enter(InteractionMode::Idle);
        self.loaded_preset = None;
        self.report(StatusKind::Info, "Simulation reset. Initialize warehouse or load a preset.");
    }

    /// Load a named preset and lock editing until the next reset
    pub fn load_preset(&mut self, name: &str) -> Result<PlacementReport> {
        let preset = match self.presets.iter().find(|p| p.name == name).cloned() {
            Some(preset) => preset,
            None => return self.reject(ValidationError::UnknownPreset(name.to_string())),
        };
        if let Err(reason) = preset.validate(self.grid_limits.min_size, self.grid_limits.max_size) {
            return self.reject(ValidationError::InvalidPreset {
                name: preset.name,
                reason: Box::new(reason),
            });
        }

        self.report(StatusKind::Info, format!("Loading preset: {}...", preset.name));
        self.animator.cancel();

        if let Err(e) = self.store.initialize(&mut self.model, preset.width, preset.height) {
            warn!(preset = %preset.name, error = %e, "preset initialization failed");
            self.report(StatusKind::Error, format!("Failed to load preset: {}", e));
            return Err(e.into());
        }

        self.model.set_start(Some(preset.start));
        self.model.set_end(Some(preset.end));
        self.model.set_robot_position(Some(preset.robot_position()));
        for obstacle in &preset.obstacles {
            self.model.add_multi_cell_obstacle(*obstacle);
        }
        let report = self.store.persist_cells(&mut self.model, &preset.covered_cells());

        self.controller.enter(InteractionMode::Idle);
        self.loaded_preset = Some(preset.name.clone());
        info!(preset = %preset.name, cells = report.persisted.len(), "preset loaded");
        self.report(
            StatusKind::Success,
            format!("{} loaded and obstacles configured. Ready to find path.", preset.name),
        );
        self.report_partial(&report);
        Ok(report)
    }

    /// Advance simulated time and run any due animation steps
    pub fn advance(&mut self, elapsed: Duration) -> Vec<AnimationEvent> {
        let events = self.animator.advance(elapsed, &mut self.model);
        for event in &events {
            if let AnimationEvent::Arrived { .. } = event {
                self.report(StatusKind::Success, "Robot reached the destination!");
            }
        }
        events
    }

    fn report(&mut self, kind: StatusKind, message: impl Into<String>) {
        let now = self.animator.now();
        self.status.push(now, kind, message);
    }

    fn report_partial(&mut self, report: &PlacementReport) {
        if !report.is_complete() {
            let total = report.persisted.len() + report.failed.len();
            self.report(
                StatusKind::Error,
                format!(
                    "{} of {} obstacle cells could not be saved; layout may differ from the server.",
                    report.failed.len(),
                    total
                ),
            );
        }
    }

    fn reject<T>(&mut self, error: ValidationError) -> Result<T> {
        warn!("operation rejected: {}", error);
        self.report(StatusKind::Error, error.to_string());
        Err(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;

    fn seeded() -> Simulation<LocalBackend> {
        let mut config = Config::default();
        config.placement.seed = Some(11);
        Simulation::new(&config, LocalBackend::new())
    }

    #[test]
    fn starts_ready_and_uninitialized() {
        let sim = seeded();
        assert!(!sim.model().is_initialized());
        assert_eq!(sim.mode(), InteractionMode::Idle);
        assert_eq!(sim.status().len(), 1);
    }

    #[test]
    fn rejects_out_of_range_dimensions() {
        let mut sim = seeded();
        let err = sim.initialize(4, 10).unwrap_err();
        assert!(err.is_validation());
        assert!(sim.adapter().obstacles().is_none());
        assert_eq!(sim.status().current().map(|e| e.kind), Some(StatusKind::Error));
    }

    #[test]
    fn route_requires_endpoints() {
        let mut sim = seeded();
        sim.initialize(5, 5).unwrap();
        assert_eq!(sim.request_route(), Err(ValidationError::MissingEndpoints.into()));
    }

    #[test]
    fn mode_description_follows_kind() {
        let mut sim = seeded();
        sim.initialize(5, 5).unwrap();
        sim.select_obstacle_kind(ObstacleKind::Shelf);
        sim.enter_mode(InteractionMode::PlaceMultiCell).unwrap();
        assert_eq!(sim.mode_description(), "Place Shelf Unit (Click on Grid)");
    }
}
