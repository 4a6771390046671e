use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::ItemFilter;
use crate::grid::{Position, Positioning};
use crate::jobs::action::Action;
use crate::jobs::assignment::{Assignment, AssignmentBehavior, Step};
use crate::jobs::status::JobStatus;
use crate::jobs::worker::JobContext;

/// Reach for an item lying on or next to the worker's cell.
const REACH: Positioning = Positioning::Planar;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickUpItem {
    at: Position,
    filter: ItemFilter,
}

pub type PickUpItemJob = Assignment<PickUpItem>;

impl PickUpItem {
    pub fn new(at: Position, filter: ItemFilter) -> Self {
        Self { at, filter }
    }

    pub fn job(at: Position, filter: ItemFilter) -> PickUpItemJob {
        Assignment::new(Self::new(at, filter))
    }
}

impl AssignmentBehavior for PickUpItem {
    fn label(&self) -> &'static str {
        "pick_up"
    }

    fn next_action(&mut self, ctx: &JobContext<'_>) -> Step {
        let available = ctx
            .environment
            .item_at(self.at)
            .is_some_and(|item| self.filter.accepts(item));
        if !available {
            debug!(at = ?self.at, "pick_up_item_missing");
            return Step::Finish(JobStatus::Fail);
        }
        if ctx.worker.carrying().is_some() || !REACH.is_satisfied(ctx.location(), self.at) {
            return Step::Finish(JobStatus::Fail);
        }
        Step::Act(Action::PickUp {
            at: self.at,
            filter: self.filter,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropItem {
    at: Position,
}

pub type DropItemJob = Assignment<DropItem>;

impl DropItem {
    pub fn new(at: Position) -> Self {
        Self { at }
    }

    pub fn job(at: Position) -> DropItemJob {
        Assignment::new(Self::new(at))
    }
}

impl AssignmentBehavior for DropItem {
    fn label(&self) -> &'static str {
        "drop"
    }

    fn next_action(&mut self, ctx: &JobContext<'_>) -> Step {
        if ctx.worker.carrying().is_none() || !REACH.is_satisfied(ctx.location(), self.at) {
            return Step::Finish(JobStatus::Fail);
        }
        Step::Act(Action::Drop { at: self.at })
    }
}
