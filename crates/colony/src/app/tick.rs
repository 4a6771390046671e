use engine::{
    Action, ActionState, CancellationToken, Environment, Job, JobConfig, JobContext, JobStatus,
    Position, Positioning, SearchConfig, StrikeOutcome,
};
use tracing::{debug, info, trace};

use super::config::SimConfig;
use super::map::STONE;
use super::policy::{ColonyPolicy, JobTally};
use super::world::{ColonyWorld, InFlight, SettlerView};

/// Settlers act on anything in their planar neighborhood.
const REACH: Positioning = Positioning::Planar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimReport {
    pub ticks: u64,
    pub tally: JobTally,
    pub mined: u32,
    pub stockpiled: usize,
}

/// Drives every settler's root job one tick at a time.
pub struct Simulation {
    pub world: ColonyWorld,
    pub policy: ColonyPolicy,
    search: SearchConfig,
    jobs: JobConfig,
    cancel: CancellationToken,
    mined: u32,
}

impl Simulation {
    pub fn new(world: ColonyWorld, config: &SimConfig) -> Self {
        Self {
            world,
            policy: ColonyPolicy::new(),
            search: config.search,
            jobs: config.jobs,
            cancel: CancellationToken::new(),
            mined: 0,
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn run(&mut self, ticks: u64) -> SimReport {
        for _ in 0..ticks {
            if self.cancel.is_cancelled() {
                self.abort_all();
                break;
            }
            self.step();
        }
        let report = self.report();
        info!(
            ticks = report.ticks,
            done = report.tally.done,
            failed = report.tally.failed,
            aborted = report.tally.aborted,
            mined = report.mined,
            stockpiled = report.stockpiled,
            "simulation_finished"
        );
        report
    }

    pub fn report(&self) -> SimReport {
        SimReport {
            ticks: self.world.tick,
            tally: self.policy.tally(),
            mined: self.mined,
            stockpiled: self.world.stockpiled_count(),
        }
    }

    pub fn step(&mut self) {
        self.world.tick += 1;
        for index in 0..self.world.settlers.len() {
            self.step_settler(index);
        }
    }

    /// Aborts whatever the settlers are still holding.
    pub fn abort_all(&mut self) {
        for settler in &mut self.world.settlers {
            settler.in_flight = None;
            if let Some(mut job) = settler.job.take() {
                job.abort(&mut self.policy);
            }
        }
    }

    fn step_settler(&mut self, index: usize) {
        let mut job = match self.world.settlers[index].job.take() {
            Some(job) => job,
            None => {
                let view = self.world.settlers[index].view();
                let ctx = job_context(&self.world, &view, self.search, self.jobs, &self.cancel);
                let mut job = self.policy.next_job(&self.world, &ctx);
                job.assign(&ctx);
                job
            }
        };

        let in_flight = match self.world.settlers[index].in_flight {
            Some(in_flight) => {
                let view = self.world.settlers[index].view();
                let ctx = job_context(&self.world, &view, self.search, self.jobs, &self.cancel);
                job.action_progress(&ctx, &mut self.policy);
                if job.status().is_terminal() || !job.has_outstanding_action() {
                    self.world.settlers[index].in_flight = None;
                    self.restore(index, job);
                    return;
                }
                in_flight
            }
            None => {
                let view = self.world.settlers[index].view();
                let ctx = job_context(&self.world, &view, self.search, self.jobs, &self.cancel);
                let Some(action) = job.prepare_next_action(&ctx, &mut self.policy) else {
                    return;
                };
                InFlight::new(action)
            }
        };

        let remaining_ticks = in_flight.remaining_ticks.saturating_sub(1);
        if remaining_ticks > 0 {
            self.world.settlers[index].in_flight = Some(InFlight {
                remaining_ticks,
                ..in_flight
            });
            self.restore(index, job);
            return;
        }

        let result = self.execute(index, in_flight.action);
        self.world.settlers[index].in_flight = None;
        let view = self.world.settlers[index].view();
        let ctx = job_context(&self.world, &view, self.search, self.jobs, &self.cancel);
        job.action_done(result, &ctx, &mut self.policy);
        self.restore(index, job);
    }

    fn restore(&mut self, index: usize, job: Box<dyn Job>) {
        if job.status() == JobStatus::Ok {
            self.world.settlers[index].job = Some(job);
        }
    }

    /// Applies a finished action to the world.
    fn execute(&mut self, index: usize, action: Action) -> ActionState {
        let settler = &mut self.world.settlers[index];
        let here = settler.location;
        let result = match action {
            Action::Move { direction } => {
                if self.world.grid.can_move_between(here, direction) {
                    settler.location = here.step(direction);
                    ActionState::Done
                } else {
                    ActionState::Fail
                }
            }
            Action::Work { target } => {
                if !REACH.is_satisfied(here, target) {
                    ActionState::Fail
                } else {
                    match self.world.grid.strike(target) {
                        StrikeOutcome::Damaged { .. } => ActionState::Done,
                        StrikeOutcome::Cleared => {
                            self.mined += 1;
                            self.world.grid.place_item(target, STONE);
                            debug!(settler = settler.id.0, ?target, "rock_cleared");
                            ActionState::Done
                        }
                        StrikeOutcome::NotMinable => ActionState::Fail,
                    }
                }
            }
            Action::PickUp { at, filter } => {
                let accepted = self
                    .world
                    .grid
                    .item_at(at)
                    .is_some_and(|item| filter.accepts(item));
                if REACH.is_satisfied(here, at) && accepted && settler.carrying.is_none() {
                    settler.carrying = self.world.grid.take_item(at);
                    ActionState::Done
                } else {
                    ActionState::Fail
                }
            }
            Action::Drop { at } => match settler.carrying {
                Some(item)
                    if REACH.is_satisfied(here, at) && self.world.grid.place_item(at, item) =>
                {
                    settler.carrying = None;
                    ActionState::Done
                }
                _ => ActionState::Fail,
            },
            Action::Wait { .. } => ActionState::Done,
        };
        trace!(
            settler = settler.id.0,
            action = action.kind(),
            ?result,
            "action_executed"
        );
        result
    }

    pub fn settler_location(&self, index: usize) -> Option<Position> {
        self.world.settlers.get(index).map(|settler| settler.location)
    }
}

/// Built from disjoint fields so the policy can be borrowed mutably alongside.
pub(crate) fn job_context<'a>(
    world: &'a ColonyWorld,
    view: &'a SettlerView,
    search: SearchConfig,
    jobs: JobConfig,
    cancel: &'a CancellationToken,
) -> JobContext<'a> {
    JobContext {
        worker: view,
        environment: &world.grid,
        tick: world.tick,
        search,
        jobs,
        cancel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::map::parse_map;

    const QUARRY: &str = "\
s....*
.###..
.#2#..
......
P....*
";

    fn simulation(source: &str, settlers: u32) -> Simulation {
        let world = ColonyWorld::from_map(parse_map(source).expect("map"), settlers);
        Simulation::new(world, &SimConfig::default())
    }

    #[test]
    fn one_settler_clears_the_quarry_and_stocks_the_stone() {
        let mut sim = simulation(QUARRY, 1);
        let report = sim.run(300);

        assert_eq!(report.ticks, 300);
        assert_eq!(report.mined, 1);
        assert!(!sim.world.grid.is_minable(Position::planar(2, 2)));
        assert_eq!(report.stockpiled, 3);
        assert!(sim.world.loose_items().is_empty());
        assert_eq!(report.tally.failed, 0);
        assert_eq!(report.tally.aborted, 0);
        assert!(report.tally.done >= 4);
        assert_eq!(sim.policy.active_claims(), 0);
    }

    #[test]
    fn two_settlers_split_the_work() {
        let mut sim = simulation(QUARRY, 2);
        let report = sim.run(200);
        assert_eq!(report.mined, 1);
        assert_eq!(report.stockpiled, 3);
        assert_eq!(report.tally.failed, 0);
    }

    #[test]
    fn unreachable_items_are_left_alone() {
        let mut sim = simulation("s.#*\n..##\nP...\n", 1);
        let report = sim.run(50);
        assert_eq!(report.stockpiled, 0);
        assert_eq!(report.tally.aborted, 0);
        assert_eq!(report.tally.failed, 0);
        assert_eq!(sim.world.loose_items().len(), 1);
        assert_eq!(sim.policy.active_claims(), 0);
    }

    #[test]
    fn a_blocked_delivery_leaves_the_stone_on_the_ground() {
        let mut sim = simulation("s.*#P\n", 1);
        let report = sim.run(60);
        assert_eq!(report.stockpiled, 0);
        assert!(report.tally.aborted >= 1);
        assert_eq!(sim.world.grid.items().count(), 1);
        assert_eq!(sim.world.settlers[0].carrying, None);
    }

    #[test]
    fn waits_span_several_ticks() {
        let mut sim = simulation("s..\n", 1);
        sim.step();
        let settler = &sim.world.settlers[0];
        assert_eq!(settler.job.as_ref().map(|job| job.label()), Some("wait"));
        assert_eq!(
            settler.in_flight.map(|in_flight| in_flight.remaining_ticks),
            Some(4)
        );
        for _ in 0..4 {
            sim.step();
        }
        assert!(sim.world.settlers[0].job.is_none());
        assert_eq!(sim.policy.tally().done, 1);
    }

    #[test]
    fn a_blocked_step_is_reported_as_a_failed_action() {
        let mut sim = simulation("s..\n...\n", 1);
        sim.world.grid.set_tile(Position::planar(1, 0), engine::TileKind::Wall);
        sim.world.grid.set_tile(Position::planar(1, 1), engine::TileKind::Wall);
        let result = sim.execute(
            0,
            Action::Move {
                direction: engine::Direction::East,
            },
        );
        assert_eq!(result, ActionState::Fail);
        assert_eq!(sim.settler_location(0), Some(Position::planar(0, 0)));
    }

    #[test]
    fn cancelling_stops_the_run_and_aborts_held_jobs() {
        let mut sim = simulation(QUARRY, 1);
        sim.run(3);
        sim.cancellation().cancel();
        let report = sim.run(100);
        assert_eq!(report.ticks, 3);
        assert!(sim.world.settlers[0].job.is_none());
    }
}
