//! Interaction modes and click dispatch.
//!
//! Exactly one mode is active. A click is routed to the branch for the
//! current mode; every check runs before the model is touched, so a rejected
//! click leaves the model unchanged.
//!
//! | Mode | Click | Next mode |
//! |---|---|---|
//! | `Idle` | hint only | `Idle` |
//! | `SetStart` | set start (and robot if unset) | `Idle` |
//! | `SetEnd` | set end | `Idle` |
//! | `ToggleObstacle` | flip the cell through the store | `ToggleObstacle` |
//! | `PlaceMultiCell` | validate footprint, append, persist cells | `Idle` on success |

use crate::error::{SimError, ValidationError};
use crate::grid::{Cell, GridModel};
use crate::obstacle::{MultiCellObstacle, ObstacleKind, TemplatePolicy};
use crate::occupancy::{check_region, is_obstacle, Region};
use crate::sync::{ObstacleStore, PlacementReport, SyncAdapter};
use rand::Rng;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    SetStart,
    SetEnd,
    ToggleObstacle,
    PlaceMultiCell,
}

impl InteractionMode {
    /// Description shown to the operator
    pub fn describe(&self, kind: ObstacleKind) -> String {
        match self {
            InteractionMode::Idle => "Standby".to_string(),
            InteractionMode::SetStart => "Set Robot Start Point (Click on Grid)".to_string(),
            InteractionMode::SetEnd => "Set Destination Point (Click on Grid)".to_string(),
            InteractionMode::ToggleObstacle => "Place/Remove Obstacles (Click on Grid)".to_string(),
            InteractionMode::PlaceMultiCell => format!("Place {} (Click on Grid)", kind),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionMode::Idle => "idle",
            InteractionMode::SetStart => "set_start",
            InteractionMode::SetEnd => "set_end",
            InteractionMode::ToggleObstacle => "toggle_obstacle",
            InteractionMode::PlaceMultiCell => "place_multi_cell",
        };
        f.write_str(name)
    }
}

/// What a successful click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    StartSet { cell: Cell, robot_placed: bool },
    EndSet { cell: Cell },
    ObstacleToggled { cell: Cell, blocked: bool, message: String },
    MultiCellPlaced { obstacle: MultiCellObstacle, report: PlacementReport },
    /// No mode selected
    Hint,
}

#[derive(Debug, Clone)]
pub struct ModeController {
    mode: InteractionMode,
    kind: ObstacleKind,
    policy: TemplatePolicy,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(TemplatePolicy::default())
    }
}

impl ModeController {
    pub fn new(policy: TemplatePolicy) -> Self {
        ModeController {
            mode: InteractionMode::Idle,
            kind: ObstacleKind::default(),
            policy,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn enter(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    pub fn select_kind(&mut self, kind: ObstacleKind) {
        self.kind = kind;
    }

    pub fn policy(&self) -> TemplatePolicy {
        self.policy
    }

    /// Interpret a click on `cell` under the current mode
    pub fn click<A, R>(
        &mut self,
        cell: Cell,
        model: &mut GridModel,
        store: &mut ObstacleStore<A>,
        rng: &mut R,
    ) -> Result<ClickOutcome, SimError>
    where
        A: SyncAdapter,
        R: Rng + ?Sized,
    {
        if !model.is_initialized() {
            return Err(ValidationError::NotInitialized.into());
        }
        if !model.in_bounds(cell) {
            return Err(ValidationError::OutOfBounds(cell).into());
        }

        let result = match self.mode {
            InteractionMode::Idle => Ok(ClickOutcome::Hint),
            InteractionMode::SetStart => self.set_start(cell, model),
            InteractionMode::SetEnd => self.set_end(cell, model),
            InteractionMode::ToggleObstacle => self.toggle_obstacle(cell, model, store),
            InteractionMode::PlaceMultiCell => self.place_multi_cell(cell, model, store, rng),
        };

        if let Err(e) = &result {
            warn!(mode = %self.mode, x = cell.x, y = cell.y, "click rejected: {}", e);
        }
        result
    }

    fn set_start(&mut self, cell: Cell, model: &mut GridModel) -> Result<ClickOutcome, SimError> {
        if is_obstacle(model, cell) {
            return Err(ValidationError::StartOnObstacle(cell).into());
        }
        if model.end() == Some(cell) {
            return Err(ValidationError::StartEqualsEnd(cell).into());
        }

        model.set_start(Some(cell));
        let robot_placed = model.robot_position().is_none();
        if robot_placed {
            model.set_robot_position(Some(cell));
        }
        self.mode = InteractionMode::Idle;
        info!(x = cell.x, y = cell.y, "start point set");
        Ok(ClickOutcome::StartSet { cell, robot_placed })
    }

    fn set_end(&mut self, cell: Cell, model: &mut GridModel) -> Result<ClickOutcome, SimError> {
        if is_obstacle(model, cell) {
            return Err(ValidationError::EndOnObstacle(cell).into());
        }
        if model.start() == Some(cell) {
            return Err(ValidationError::EndEqualsStart(cell).into());
        }

        model.set_end(Some(cell));
        self.mode = InteractionMode::Idle;
        info!(x = cell.x, y = cell.y, "end point set");
        Ok(ClickOutcome::EndSet { cell })
    }

    fn toggle_obstacle<A: SyncAdapter>(
        &mut self,
        cell: Cell,
        model: &mut GridModel,
        store: &mut ObstacleStore<A>,
    ) -> Result<ClickOutcome, SimError> {
        if model.start() == Some(cell) {
            return Err(ValidationError::ObstacleOnStart(cell).into());
        }
        if model.end() == Some(cell) {
            return Err(ValidationError::ObstacleOnEnd(cell).into());
        }

        let toggled = store.toggle(model, cell)?;
        info!(x = cell.x, y = cell.y, blocked = toggled.blocked, "obstacle toggled");
        Ok(ClickOutcome::ObstacleToggled {
            cell,
            blocked: toggled.blocked,
            message: toggled.message,
        })
    }

    fn place_multi_cell<A, R>(
        &mut self,
        cell: Cell,
        model: &mut GridModel,
        store: &mut ObstacleStore<A>,
        rng: &mut R,
    ) -> Result<ClickOutcome, SimError>
    where
        A: SyncAdapter,
        R: Rng + ?Sized,
    {
        let template = self.policy.select(self.kind, rng);
        let obstacle = template.anchored(cell, self.kind);
        let region = Region::Rect {
            origin: cell,
            width: obstacle.width,
            height: obstacle.height,
        };

        if check_region(model, region).is_err() {
            return Err(ValidationError::FootprintBlocked {
                origin: cell,
                width: obstacle.width,
                height: obstacle.height,
            }
            .into());
        }

        model.add_multi_cell_obstacle(obstacle);
        let report = store.persist_cells(model, &obstacle.cells());
        self.mode = InteractionMode::Idle;

        if report.is_complete() {
            info!(template = template.name, x = cell.x, y = cell.y, "multi-cell obstacle placed");
        } else {
            warn!(
                template = template.name,
                failed = report.failed.len(),
                "multi-cell obstacle placed with unpersisted cells"
            );
        }
        Ok(ClickOutcome::MultiCellPlaced { obstacle, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        model: GridModel,
        store: ObstacleStore<LocalBackend>,
        controller: ModeController,
        rng: StdRng,
    }

    impl Fixture {
        fn new(width: i32, height: i32) -> Self {
            let mut store = ObstacleStore::new(LocalBackend::new());
            let mut model = GridModel::default();
            store.initialize(&mut model, width, height).unwrap();
            Fixture {
                model,
                store,
                controller: ModeController::new(TemplatePolicy::new(1.0, 1.0)),
                rng: StdRng::seed_from_u64(3),
            }
        }

        fn click(&mut self, x: i32, y: i32) -> Result<ClickOutcome, SimError> {
            self.controller
                .click(Cell::new(x, y), &mut self.model, &mut self.store, &mut self.rng)
        }

        fn in_mode(&mut self, mode: InteractionMode, x: i32, y: i32) -> Result<ClickOutcome, SimError> {
            self.controller.enter(mode);
            self.click(x, y)
        }
    }

    #[test]
    fn idle_click_is_hint() {
        let mut f = Fixture::new(5, 5);
        let before = f.model.revision();
        assert_eq!(f.click(1, 1), Ok(ClickOutcome::Hint));
        assert_eq!(f.model.revision(), before);
        assert_eq!(f.controller.mode(), InteractionMode::Idle);
    }

    #[test]
    fn set_start_places_robot_once() {
        let mut f = Fixture::new(5, 5);
        assert_eq!(
            f.in_mode(InteractionMode::SetStart, 1, 1),
            Ok(ClickOutcome::StartSet { cell: Cell::new(1, 1), robot_placed: true })
        );
        assert_eq!(f.controller.mode(), InteractionMode::Idle);

        assert_eq!(
            f.in_mode(InteractionMode::SetStart, 2, 2),
            Ok(ClickOutcome::StartSet { cell: Cell::new(2, 2), robot_placed: false })
        );
        assert_eq!(f.model.start(), Some(Cell::new(2, 2)));
        assert_eq!(f.model.robot_position(), Some(Cell::new(1, 1)));
    }

    #[test]
    fn set_start_on_obstacle_is_rejected() {
        let mut f = Fixture::new(5, 5);
        f.in_mode(InteractionMode::ToggleObstacle, 3, 3).unwrap();

        let err = f.in_mode(InteractionMode::SetStart, 3, 3).unwrap_err();
        assert_eq!(err, SimError::from(ValidationError::StartOnObstacle(Cell::new(3, 3))));
        assert_eq!(f.model.start(), None);
        assert_eq!(f.controller.mode(), InteractionMode::SetStart);
    }

    #[test]
    fn end_on_start_is_rejected() {
        let mut f = Fixture::new(5, 5);
        f.in_mode(InteractionMode::SetStart, 0, 0).unwrap();

        let err = f.in_mode(InteractionMode::SetEnd, 0, 0).unwrap_err();
        assert_eq!(err, SimError::from(ValidationError::EndEqualsStart(Cell::new(0, 0))));
        assert_eq!(f.model.end(), None);
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut f = Fixture::new(5, 5);
        f.controller.enter(InteractionMode::ToggleObstacle);

        match f.click(2, 3).unwrap() {
            ClickOutcome::ObstacleToggled { blocked, .. } => assert!(blocked),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(f.model.has_obstacle(Cell::new(2, 3)));
        assert_eq!(f.controller.mode(), InteractionMode::ToggleObstacle);

        match f.click(2, 3).unwrap() {
            ClickOutcome::ObstacleToggled { blocked, .. } => assert!(!blocked),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(f.model.obstacles().is_empty());
    }

    #[test]
    fn toggle_on_endpoints_is_rejected() {
        let mut f = Fixture::new(5, 5);
        f.in_mode(InteractionMode::SetStart, 0, 0).unwrap();
        f.in_mode(InteractionMode::SetEnd, 4, 4).unwrap();
        f.controller.enter(InteractionMode::ToggleObstacle);

        assert_eq!(f.click(0, 0), Err(SimError::from(ValidationError::ObstacleOnStart(Cell::new(0, 0)))));
        assert_eq!(f.click(4, 4), Err(SimError::from(ValidationError::ObstacleOnEnd(Cell::new(4, 4)))));
        assert!(f.store.adapter().obstacles().map_or(true, |o| o.is_empty()));
    }

    #[test]
    fn multi_cell_then_single_inside_footprint() {
        let mut f = Fixture::new(5, 5);
        let obstacle = MultiCellObstacle::new(Cell::new(1, 1), 2, 2, ObstacleKind::Crate);
        f.model.add_multi_cell_obstacle(obstacle);
        let report = f.store.persist_cells(&mut f.model, &obstacle.cells());
        assert!(report.is_complete());

        // Walls use the 1x1 fallback footprint
        f.controller.select_kind(ObstacleKind::Wall);
        let err = f.in_mode(InteractionMode::PlaceMultiCell, 2, 2).unwrap_err();
        assert!(matches!(err, SimError::Validation(ValidationError::FootprintBlocked { .. })));
        assert_eq!(f.controller.mode(), InteractionMode::PlaceMultiCell);
        assert_eq!(f.model.multi_cell_obstacles().len(), 1);
    }

    #[test]
    fn crate_stack_placement_persists_every_cell() {
        let mut f = Fixture::new(6, 6);
        f.controller.select_kind(ObstacleKind::Crate);

        let outcome = f.in_mode(InteractionMode::PlaceMultiCell, 1, 1).unwrap();
        match outcome {
            ClickOutcome::MultiCellPlaced { obstacle, report } => {
                assert_eq!((obstacle.width, obstacle.height), (3, 2));
                assert_eq!(report.persisted.len(), 6);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(f.model.obstacles().len(), 6);
        assert_eq!(f.controller.mode(), InteractionMode::Idle);
    }

    #[test]
    fn restricted_area_out_of_bounds() {
        let mut f = Fixture::new(5, 5);
        f.controller.select_kind(ObstacleKind::Restricted);
        let before = f.model.revision();

        let err = f.in_mode(InteractionMode::PlaceMultiCell, 3, 3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FootprintBlocked { origin: Cell::new(3, 3), width: 3, height: 3 }.into()
        );
        assert_eq!(f.model.revision(), before);
    }

    #[test]
    fn clicks_outside_grid_or_before_init() {
        let mut f = Fixture::new(5, 5);
        f.controller.enter(InteractionMode::SetStart);
        assert_eq!(f.click(5, 0), Err(SimError::from(ValidationError::OutOfBounds(Cell::new(5, 0)))));

        let mut model = GridModel::default();
        let mut store = ObstacleStore::new(LocalBackend::new());
        let mut rng = StdRng::seed_from_u64(0);
        let err = f
            .controller
            .click(Cell::new(0, 0), &mut model, &mut store, &mut rng)
            .unwrap_err();
        assert_eq!(err, SimError::from(ValidationError::NotInitialized));
    }
}
