use crate::grid::{Position, Positioning};
use crate::jobs::group::{AssignmentGroup, ChildFailure, GroupPlan, NextAssignment};
use crate::jobs::observer::ObservedJob;
use crate::jobs::status::JobStatus;
use crate::jobs::worker::JobContext;

use super::mine::Mine;
use super::move_to::MoveTo;

const MINING_REACH: Positioning = Positioning::Planar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Approach,
    Strike,
    Finished,
}

/// Walks next to a tile and mines it out, re-approaching once if a strike
/// fails because the worker is no longer in reach.
#[derive(Debug, Clone)]
pub struct MineTile {
    target: Position,
    stage: Stage,
    retries_left: u32,
}

pub type MineTileGroup = AssignmentGroup<MineTile>;

impl MineTile {
    pub fn new(target: Position) -> Self {
        Self {
            target,
            stage: Stage::Approach,
            retries_left: 1,
        }
    }

    pub fn job(target: Position) -> MineTileGroup {
        AssignmentGroup::new(Self::new(target))
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }
}

impl GroupPlan for MineTile {
    fn label(&self) -> &'static str {
        "mine_tile"
    }

    fn prepare_next_assignment(&mut self, _ctx: &JobContext<'_>) -> NextAssignment {
        match self.stage {
            Stage::Approach => {
                self.stage = Stage::Strike;
                NextAssignment::Start(Box::new(MoveTo::job(self.target, MINING_REACH)))
            }
            Stage::Strike => {
                self.stage = Stage::Finished;
                NextAssignment::Start(Box::new(Mine::job(self.target, MINING_REACH)))
            }
            Stage::Finished => NextAssignment::Finish(JobStatus::Done),
        }
    }

    fn on_child_failed(&mut self, _child: ObservedJob, status: JobStatus) -> ChildFailure {
        if status == JobStatus::Fail && self.retries_left > 0 {
            self.retries_left -= 1;
            self.stage = Stage::Approach;
            return ChildFailure::Recover;
        }
        ChildFailure::Propagate
    }
}
