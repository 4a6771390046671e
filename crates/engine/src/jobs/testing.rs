use std::cell::Cell;

use crate::environment::{Environment, ItemKind};
use crate::grid::{Position, Positioning, StrikeOutcome, TileGrid, TileKind};
use crate::pathfinding::{CancellationToken, SearchConfig};

use super::action::Action;
use super::job::Job;
use super::observer::JobObserver;
use super::status::ActionState;
use super::worker::{JobConfig, JobContext, Worker, WorkerId};

pub(crate) struct TestWorker {
    pub(crate) location: Cell<Position>,
    pub(crate) carrying: Cell<Option<ItemKind>>,
    pub(crate) outstanding: Cell<bool>,
}

impl Worker for TestWorker {
    fn id(&self) -> WorkerId {
        WorkerId(1)
    }

    fn location(&self) -> Position {
        self.location.get()
    }

    fn has_outstanding_action(&self) -> bool {
        self.outstanding.get()
    }

    fn carrying(&self) -> Option<ItemKind> {
        self.carrying.get()
    }
}

/// A one-worker world with a tiny action executor for driving jobs in tests.
pub(crate) struct Fixture {
    pub(crate) grid: TileGrid,
    pub(crate) worker: TestWorker,
    pub(crate) jobs: JobConfig,
    pub(crate) cancel: CancellationToken,
    pub(crate) tick: u64,
    pub(crate) executed: Vec<Action>,
    /// Forces every move to fail while set.
    pub(crate) block_moves: bool,
}

impl Fixture {
    pub(crate) fn open(width: u32, height: u32) -> Self {
        let grid = TileGrid::filled(width, height, 1, TileKind::Floor).expect("fixture grid");
        Self::with_grid(grid, Position::planar(0, 0))
    }

    pub(crate) fn with_grid(grid: TileGrid, at: Position) -> Self {
        Self {
            grid,
            worker: TestWorker {
                location: Cell::new(at),
                carrying: Cell::new(None),
                outstanding: Cell::new(false),
            },
            jobs: JobConfig::default(),
            cancel: CancellationToken::new(),
            tick: 0,
            executed: Vec::new(),
            block_moves: false,
        }
    }

    pub(crate) fn context(&self) -> JobContext<'_> {
        JobContext {
            worker: &self.worker,
            environment: &self.grid,
            tick: self.tick,
            search: SearchConfig::default(),
            jobs: self.jobs,
            cancel: &self.cancel,
        }
    }

    pub(crate) fn location(&self) -> Position {
        self.worker.location.get()
    }

    pub(crate) fn execute(&mut self, action: Action) -> ActionState {
        self.executed.push(action);
        let here = self.location();
        match action {
            Action::Move { direction } => {
                if self.block_moves || !self.grid.can_move_between(here, direction) {
                    return ActionState::Fail;
                }
                self.worker.location.set(here.step(direction));
                ActionState::Done
            }
            Action::Work { target } => {
                if !Positioning::Planar.is_satisfied(here, target) {
                    return ActionState::Fail;
                }
                match self.grid.strike(target) {
                    StrikeOutcome::Damaged { .. } | StrikeOutcome::Cleared => ActionState::Done,
                    StrikeOutcome::NotMinable => ActionState::Fail,
                }
            }
            Action::PickUp { at, filter } => {
                let accepted = self.grid.item_at(at).is_some_and(|item| filter.accepts(item));
                if !accepted || self.worker.carrying.get().is_some() {
                    return ActionState::Fail;
                }
                self.worker.carrying.set(self.grid.take_item(at));
                ActionState::Done
            }
            Action::Drop { at } => match self.worker.carrying.get() {
                Some(item) if self.grid.place_item(at, item) => {
                    self.worker.carrying.set(None);
                    ActionState::Done
                }
                _ => ActionState::Fail,
            },
            Action::Wait { .. } => ActionState::Done,
        }
    }

    /// Drives `job` until it finishes or `max_ticks` pass; returns the ticks used.
    pub(crate) fn run(
        &mut self,
        job: &mut dyn Job,
        observer: &mut dyn JobObserver,
        max_ticks: u64,
    ) -> u64 {
        if !job.is_assigned() {
            job.assign(&self.context());
        }
        let start = self.tick;
        while job.status() == super::status::JobStatus::Ok && self.tick - start < max_ticks {
            self.tick += 1;
            let Some(action) = job.prepare_next_action(&self.context(), observer) else {
                break;
            };
            self.worker.outstanding.set(true);
            let result = self.execute(action);
            self.worker.outstanding.set(false);
            job.action_done(result, &self.context(), observer);
        }
        self.tick - start
    }
}
