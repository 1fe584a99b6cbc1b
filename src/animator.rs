use crate::error::ValidationError;
use crate::grid::{Cell, GridModel};
use crate::scheduler::Scheduler;
use std::time::Duration;
use tracing::{debug, info};

/// Default delay between two route steps
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Running,
}

/// Something the animator did to the robot during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// Robot moved to route index `index`
    Moved { cell: Cell, index: usize },
    /// Robot is on the last waypoint and the animator went idle
    Arrived { cell: Cell },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step;

/// Live playback state; only exists while running
#[derive(Debug, Clone)]
struct Playback {
    route: Vec<Cell>,
}

/// Moves the robot one route waypoint per step on a fixed delay.
///
/// Owns the robot position while running. All timing goes through a single
/// [`Scheduler`] slot so at most one step is ever pending.
#[derive(Debug, Clone)]
pub struct RouteAnimator {
    step_delay: Duration,
    scheduler: Scheduler<Step>,
    playback: Option<Playback>,
}

impl Default for RouteAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DELAY)
    }
}

impl RouteAnimator {
    pub fn new(step_delay: Duration) -> Self {
        RouteAnimator {
            step_delay,
            scheduler: Scheduler::new(),
            playback: None,
        }
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn state(&self) -> AnimatorState {
        if self.playback.is_some() {
            AnimatorState::Running
        } else {
            AnimatorState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.playback.is_some()
    }

    /// Simulated time seen by the animator
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// True if a step is waiting on the timer
    pub fn has_pending_step(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Place the robot on the first waypoint and schedule the first step.
    ///
    /// Any playback already in progress is cancelled first.
    pub fn start_route(&mut self, route: Vec<Cell>, model: &mut GridModel) -> Result<(), ValidationError> {
        if route.len() < 2 {
            return Err(ValidationError::RouteTooShort { len: route.len() });
        }
        if model.start().is_none() {
            return Err(ValidationError::NoStartPoint);
        }

        self.cancel();

        model.set_robot_position(Some(route[0]));
        info!(waypoints = route.len(), "route playback started");
        self.playback = Some(Playback { route });
        self.scheduler.schedule(self.step_delay, Step);
        Ok(())
    }

    /// Stop playback. The robot stays where it is.
    pub fn cancel(&mut self) -> bool {
        self.scheduler.cancel();
        let was_running = self.playback.take().is_some();
        if was_running {
            debug!("route playback cancelled");
        }
        was_running
    }

    /// Advance the simulated clock, running every step that becomes due
    pub fn advance(&mut self, elapsed: Duration, model: &mut GridModel) -> Vec<AnimationEvent> {
        let target = self.scheduler.now() + elapsed;
        let mut events = Vec::new();

        while let Some(Step) = self.scheduler.advance_to(target) {
            if let Some(event) = self.step(model) {
                events.push(event);
            }
        }

        events
    }

    fn step(&mut self, model: &mut GridModel) -> Option<AnimationEvent> {
        let playback = self.playback.as_ref()?;
        let last = playback.route.len().saturating_sub(1);

        // Off-route robot restarts from the first waypoint
        let index = model
            .robot_position()
            .and_then(|robot| playback.route.iter().position(|&c| c == robot))
            .unwrap_or(0);

        if index >= last {
            let cell = playback.route[last];
            self.finish(cell);
            return Some(AnimationEvent::Arrived { cell });
        }

        let next = index + 1;
        let cell = playback.route[next];
        model.set_robot_position(Some(cell));
        debug!(index = next, x = cell.x, y = cell.y, "robot stepped");

        if next == last {
            self.finish(cell);
            return Some(AnimationEvent::Arrived { cell });
        }

        self.scheduler.schedule(self.step_delay, Step);
        Some(AnimationEvent::Moved { cell, index: next })
    }

    fn finish(&mut self, cell: Cell) {
        self.scheduler.cancel();
        self.playback = None;
        info!(x = cell.x, y = cell.y, "robot reached the destination");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: Duration = Duration::from_millis(300);

    fn model_with_start() -> GridModel {
        let mut model = GridModel::new(5, 5);
        model.set_start(Some(Cell::new(0, 0)));
        model
    }

    fn straight_route() -> Vec<Cell> {
        vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)]
    }

    #[test]
    fn rejects_short_routes() {
        let mut model = model_with_start();
        let mut animator = RouteAnimator::default();

        assert_eq!(
            animator.start_route(vec![Cell::new(0, 0)], &mut model),
            Err(ValidationError::RouteTooShort { len: 1 })
        );
        assert_eq!(
            animator.start_route(Vec::new(), &mut model),
            Err(ValidationError::RouteTooShort { len: 0 })
        );
        assert_eq!(animator.state(), AnimatorState::Idle);
    }

    #[test]
    fn rejects_without_start_point() {
        let mut model = GridModel::new(5, 5);
        let mut animator = RouteAnimator::default();
        assert_eq!(
            animator.start_route(straight_route(), &mut model),
            Err(ValidationError::NoStartPoint)
        );
        assert_eq!(model.robot_position(), None);
    }

    #[test]
    fn reaches_end_after_two_delays() {
        let mut model = model_with_start();
        let mut animator = RouteAnimator::new(D);
        animator.start_route(straight_route(), &mut model).unwrap();
        assert_eq!(model.robot_position(), Some(Cell::new(0, 0)));

        let events = animator.advance(D, &mut model);
        assert_eq!(events, vec![AnimationEvent::Moved { cell: Cell::new(1, 0), index: 1 }]);
        assert_eq!(animator.state(), AnimatorState::Running);

        let events = animator.advance(D, &mut model);
        assert_eq!(events, vec![AnimationEvent::Arrived { cell: Cell::new(2, 0) }]);
        assert_eq!(model.robot_position(), Some(Cell::new(2, 0)));
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert!(!animator.has_pending_step());
    }

    #[test]
    fn large_elapsed_drains_all_steps() {
        let mut model = model_with_start();
        let mut animator = RouteAnimator::new(D);
        animator.start_route(straight_route(), &mut model).unwrap();

        let events = animator.advance(D * 10, &mut model);
        assert_eq!(events.len(), 2);
        assert_eq!(model.robot_position(), Some(Cell::new(2, 0)));
        assert!(!animator.is_running());
    }

    #[test]
    fn cancel_keeps_robot_in_place() {
        let mut model = model_with_start();
        let mut animator = RouteAnimator::new(D);
        animator.start_route(straight_route(), &mut model).unwrap();
        animator.advance(D, &mut model);

        assert!(animator.cancel());
        assert_eq!(model.robot_position(), Some(Cell::new(1, 0)));
        assert!(animator.advance(D * 5, &mut model).is_empty());
        assert_eq!(model.robot_position(), Some(Cell::new(1, 0)));
        assert!(!animator.cancel());
    }

    #[test]
    fn off_route_robot_restarts_from_first_waypoint() {
        let mut model = model_with_start();
        let mut animator = RouteAnimator::new(D);
        animator.start_route(straight_route(), &mut model).unwrap();
        model.set_robot_position(Some(Cell::new(4, 4)));

        let events = animator.advance(D, &mut model);
        assert_eq!(events, vec![AnimationEvent::Moved { cell: Cell::new(1, 0), index: 1 }]);
    }

    #[test]
    fn restart_while_running_keeps_single_timer() {
        let mut model = model_with_start();
        let mut animator = RouteAnimator::new(D);
        let long: Vec<Cell> = (0..5).map(|x| Cell::new(x, 0)).collect();

        animator.start_route(long.clone(), &mut model).unwrap();
        animator.advance(D / 2, &mut model);
        animator.start_route(long, &mut model).unwrap();

        // The first schedule would have fired at D; the restart moved it to 1.5 D
        assert!(animator.advance(D / 2, &mut model).is_empty());
        assert_eq!(model.robot_position(), Some(Cell::new(0, 0)));

        let events = animator.advance(D / 2, &mut model);
        assert_eq!(events, vec![AnimationEvent::Moved { cell: Cell::new(1, 0), index: 1 }]);
    }
}
