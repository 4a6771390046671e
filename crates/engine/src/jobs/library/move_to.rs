use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::grid::{Direction, Position, Positioning};
use crate::jobs::action::Action;
use crate::jobs::assignment::{Assignment, AssignmentBehavior, Step};
use crate::jobs::status::{ActionState, JobStatus};
use crate::jobs::worker::JobContext;
use crate::pathfinding::PathError;

/// Walks to a destination one cell per action, replanning when the route goes stale.
#[derive(Debug, Clone)]
pub struct MoveTo {
    destination: Position,
    positioning: Positioning,
    route: VecDeque<Direction>,
    /// Cell the remaining route starts from; a mismatch with the worker's
    /// location means the route is stale.
    route_from: Option<Position>,
    /// Origin and expected landing cell of the step in flight.
    step: Option<(Position, Position)>,
    consecutive_failures: u32,
    plans: u32,
}

pub type MoveToJob = Assignment<MoveTo>;

impl MoveTo {
    pub fn new(destination: Position, positioning: Positioning) -> Self {
        Self {
            destination,
            positioning,
            route: VecDeque::new(),
            route_from: None,
            step: None,
            consecutive_failures: 0,
            plans: 0,
        }
    }

    pub fn job(destination: Position, positioning: Positioning) -> MoveToJob {
        Assignment::new(Self::new(destination, positioning))
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    /// Routes computed so far, the first one included.
    pub fn plans(&self) -> u32 {
        self.plans
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn plan(&mut self, ctx: &JobContext<'_>) -> Result<(), PathError> {
        self.route.clear();
        self.route_from = None;
        self.plans += 1;
        let path = ctx.path_to(self.destination, self.positioning)?;
        self.route.extend(path.directions().iter().copied());
        self.route_from = Some(path.start());
        Ok(())
    }

    fn unreachable(&self, ctx: &JobContext<'_>, error: PathError) -> JobStatus {
        match error {
            PathError::LimitExceeded { max_node_count } => warn!(
                from = ?ctx.location(),
                to = ?self.destination,
                tick = ctx.tick,
                max_node_count,
                "move_to_search_budget_exhausted"
            ),
            PathError::NotFound | PathError::Cancelled => debug!(
                from = ?ctx.location(),
                to = ?self.destination,
                tick = ctx.tick,
                %error,
                "move_to_unreachable"
            ),
        }
        JobStatus::Abort
    }
}

impl AssignmentBehavior for MoveTo {
    fn label(&self) -> &'static str {
        "move_to"
    }

    fn next_action(&mut self, ctx: &JobContext<'_>) -> Step {
        let here = ctx.location();
        if self.positioning.is_satisfied(here, self.destination) {
            return Step::Finish(JobStatus::Done);
        }
        if self.route_from != Some(here) || self.route.is_empty() {
            if let Err(error) = self.plan(ctx) {
                return Step::Finish(self.unreachable(ctx, error));
            }
        }
        let Some(direction) = self.route.pop_front() else {
            return Step::Finish(JobStatus::Abort);
        };
        let next = here.step(direction);
        self.route_from = Some(next);
        self.step = Some((here, next));
        Step::Act(Action::Move { direction })
    }

    fn on_progress(&mut self, ctx: &JobContext<'_>, _action: &Action) -> Option<JobStatus> {
        let (from, expected) = self.step?;
        let here = ctx.location();
        if here == from || here == expected {
            return None;
        }
        debug!(?here, ?expected, to = ?self.destination, "move_to_drift_detected");
        self.step = None;
        match self.plan(ctx) {
            Ok(()) => None,
            Err(error) => Some(self.unreachable(ctx, error)),
        }
    }

    fn on_action_done(&mut self, result: ActionState, ctx: &JobContext<'_>) -> JobStatus {
        self.step = None;
        match result {
            ActionState::Ok | ActionState::Done => {
                self.consecutive_failures = 0;
                JobStatus::Ok
            }
            ActionState::Fail => {
                self.consecutive_failures += 1;
                self.route.clear();
                self.route_from = None;
                if self.consecutive_failures >= ctx.jobs.max_consecutive_failures {
                    warn!(
                        failures = self.consecutive_failures,
                        to = ?self.destination,
                        "move_to_retry_budget_exhausted"
                    );
                    JobStatus::Abort
                } else {
                    JobStatus::Ok
                }
            }
            ActionState::Abort => JobStatus::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::grid::{TileGrid, TileKind};
    use crate::jobs::job::Job;
    use crate::jobs::observer::StatusRecorder;
    use crate::jobs::testing::Fixture;

    #[test]
    fn walks_the_optimal_route_and_finishes_on_arrival() {
        let mut fixture = Fixture::open(10, 10);
        let mut job = MoveTo::job(Position::planar(9, 9), Positioning::Exact);
        let mut recorder = StatusRecorder::new();
        let ticks = fixture.run(&mut job, &mut recorder, 50);
        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(fixture.location(), Position::planar(9, 9));
        assert_eq!(fixture.executed.len(), 9);
        assert_eq!(ticks, 10);
        assert_eq!(job.behavior().plans(), 1);
    }

    #[test]
    fn already_in_position_finishes_without_moving() {
        let mut fixture = Fixture::open(4, 4);
        let mut job = MoveTo::job(Position::planar(1, 1), Positioning::Planar);
        let mut recorder = StatusRecorder::new();
        fixture.run(&mut job, &mut recorder, 5);
        assert_eq!(job.status(), JobStatus::Done);
        assert!(fixture.executed.is_empty());
    }

    #[test]
    fn wall_closing_the_only_corridor_costs_one_replan_then_aborts() {
        let grid = TileGrid::filled(8, 1, 1, TileKind::Floor).expect("grid");
        let mut fixture = Fixture::with_grid(grid, Position::planar(0, 0));
        let mut job = MoveTo::job(Position::planar(7, 0), Positioning::Exact);
        let mut recorder = StatusRecorder::new();
        fixture.run(&mut job, &mut recorder, 2);
        assert_eq!(fixture.location(), Position::planar(2, 0));

        fixture.grid.set_tile(Position::planar(4, 0), TileKind::Wall);
        fixture.run(&mut job, &mut recorder, 50);

        assert_eq!(job.status(), JobStatus::Abort);
        assert_eq!(job.behavior().plans(), 2);
        assert_eq!(fixture.location(), Position::planar(3, 0));
        assert_eq!(recorder.statuses(), vec![JobStatus::Abort]);
    }

    #[test]
    fn wall_with_a_detour_costs_one_replan_then_arrives() {
        let mut fixture = Fixture::open(8, 3);
        fixture.worker.location.set(Position::planar(0, 1));
        let mut job = MoveTo::job(Position::planar(7, 1), Positioning::Exact);
        let mut recorder = StatusRecorder::new();
        fixture.run(&mut job, &mut recorder, 2);
        assert_eq!(fixture.location(), Position::planar(2, 1));

        fixture.grid.set_tile(Position::planar(3, 1), TileKind::Wall);
        fixture.run(&mut job, &mut recorder, 50);

        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(fixture.location(), Position::planar(7, 1));
        assert_eq!(job.behavior().plans(), 2);
    }

    #[test]
    fn persistent_failures_abort_after_the_retry_budget() {
        let mut fixture = Fixture::open(6, 6);
        fixture.block_moves = true;
        let mut job = MoveTo::job(Position::planar(5, 5), Positioning::Exact);
        let mut recorder = StatusRecorder::new();
        fixture.run(&mut job, &mut recorder, 1_000);
        assert_eq!(job.status(), JobStatus::Abort);
        assert_eq!(fixture.executed.len(), 10);
        assert_eq!(job.behavior().consecutive_failures(), 10);
    }

    #[test]
    fn a_successful_step_resets_the_failure_counter() {
        let mut fixture = Fixture::open(6, 1);
        let mut job = MoveTo::job(Position::planar(5, 0), Positioning::Exact);
        let mut recorder = StatusRecorder::new();
        job.assign(&fixture.context());
        for _ in 0..3 {
            let action = job
                .prepare_next_action(&fixture.context(), &mut recorder)
                .expect("move");
            assert!(matches!(action, Action::Move { .. }));
            job.action_done(ActionState::Fail, &fixture.context(), &mut recorder);
        }
        assert_eq!(job.behavior().consecutive_failures(), 3);
        fixture.run(&mut job, &mut recorder, 20);
        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(job.behavior().consecutive_failures(), 0);
    }

    #[test]
    fn drift_during_a_step_triggers_a_replan() {
        let mut fixture = Fixture::open(10, 10);
        let mut job = MoveTo::job(Position::planar(9, 0), Positioning::Exact);
        let mut recorder = StatusRecorder::new();
        job.assign(&fixture.context());
        let action = job
            .prepare_next_action(&fixture.context(), &mut recorder)
            .expect("first step");
        assert_eq!(action, Action::Move { direction: Direction::East });

        fixture.worker.location.set(Position::planar(0, 6));
        job.action_progress(&fixture.context(), &mut recorder);
        assert_eq!(job.behavior().plans(), 2);
        assert_eq!(job.status(), JobStatus::Ok);

        job.action_done(ActionState::Done, &fixture.context(), &mut recorder);
        fixture.run(&mut job, &mut recorder, 50);
        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(fixture.location(), Position::planar(9, 0));
        assert_eq!(job.behavior().plans(), 2);
    }

    #[test]
    fn drift_into_a_sealed_pocket_aborts() {
        let mut fixture = Fixture::open(10, 10);
        for (x, y) in [(4, 4), (5, 4), (6, 4), (4, 5), (6, 5), (4, 6), (5, 6), (6, 6)] {
            fixture.grid.set_tile(Position::planar(x, y), TileKind::Wall);
        }
        let mut job = MoveTo::job(Position::planar(9, 0), Positioning::Exact);
        let mut recorder = StatusRecorder::new();
        job.assign(&fixture.context());
        job.prepare_next_action(&fixture.context(), &mut recorder);

        fixture.worker.location.set(Position::planar(5, 5));
        assert!(fixture.grid.can_enter(Position::planar(5, 5)));
        job.action_progress(&fixture.context(), &mut recorder);
        assert_eq!(job.status(), JobStatus::Abort);
        assert!(!job.has_outstanding_action());
        assert_eq!(recorder.statuses(), vec![JobStatus::Abort]);
    }
}
