use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::ItemFilter;
use crate::grid::{Position, Positioning};
use crate::jobs::group::{AssignmentGroup, ChildFailure, GroupPlan, NextAssignment};
use crate::jobs::job::Job;
use crate::jobs::observer::ObservedJob;
use crate::jobs::status::JobStatus;
use crate::jobs::worker::JobContext;

use super::handling::{DropItem, PickUpItem};
use super::move_to::MoveTo;

const HANDLING_REACH: Positioning = Positioning::Planar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Stage {
    GoToItem,
    PickUp,
    GoToDestination,
    Drop,
    /// Carrying after a failed delivery; put the item down close by.
    Release,
    Finished,
}

/// Fetches an item and carries it to a destination cell.
///
/// If delivery fails after the pick-up, the item is dropped near the worker
/// before the haul finishes with the failure status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Haul {
    source: Position,
    filter: ItemFilter,
    destination: Position,
    stage: Stage,
    failure: Option<JobStatus>,
}

pub type HaulGroup = AssignmentGroup<Haul>;

impl Haul {
    pub fn new(source: Position, filter: ItemFilter, destination: Position) -> Self {
        Self {
            source,
            filter,
            destination,
            stage: Stage::GoToItem,
            failure: None,
        }
    }

    pub fn job(source: Position, filter: ItemFilter, destination: Position) -> HaulGroup {
        AssignmentGroup::new(Self::new(source, filter, destination))
    }

    pub fn source(&self) -> Position {
        self.source
    }

    /// First empty cell the worker can drop onto: its own, then its neighbours.
    fn release_cell(ctx: &JobContext<'_>) -> Option<Position> {
        HANDLING_REACH
            .cells_around(ctx.location())
            .find(|cell| ctx.environment.can_enter(*cell) && ctx.environment.item_at(*cell).is_none())
    }
}

impl GroupPlan for Haul {
    fn label(&self) -> &'static str {
        "haul"
    }

    fn prepare_next_assignment(&mut self, ctx: &JobContext<'_>) -> NextAssignment {
        let (next_stage, child): (Stage, Box<dyn Job>) = match self.stage {
            Stage::GoToItem => (
                Stage::PickUp,
                Box::new(MoveTo::job(self.source, HANDLING_REACH)),
            ),
            Stage::PickUp => (
                Stage::GoToDestination,
                Box::new(PickUpItem::job(self.source, self.filter)),
            ),
            Stage::GoToDestination => (
                Stage::Drop,
                Box::new(MoveTo::job(self.destination, HANDLING_REACH)),
            ),
            Stage::Drop => (Stage::Finished, Box::new(DropItem::job(self.destination))),
            Stage::Release => {
                let status = self.failure.unwrap_or(JobStatus::Fail);
                if ctx.worker.carrying().is_none() {
                    return NextAssignment::Finish(status);
                }
                let Some(cell) = Self::release_cell(ctx) else {
                    debug!(worker = ctx.worker.id().0, tick = ctx.tick, "haul_no_release_cell");
                    return NextAssignment::Finish(status);
                };
                debug!(worker = ctx.worker.id().0, tick = ctx.tick, ?cell, "haul_item_released");
                (Stage::Finished, Box::new(DropItem::job(cell)))
            }
            Stage::Finished => {
                return NextAssignment::Finish(self.failure.unwrap_or(JobStatus::Done))
            }
        };
        self.stage = next_stage;
        NextAssignment::Start(child)
    }

    fn on_child_failed(&mut self, _child: ObservedJob, status: JobStatus) -> ChildFailure {
        // Stage already points past the failed child, so Drop and Finished
        // mean the item was picked up.
        let holding = matches!(self.stage, Stage::Drop | Stage::Finished);
        if self.failure.is_some() || !holding {
            return ChildFailure::Propagate;
        }
        self.failure = Some(status);
        self.stage = Stage::Release;
        ChildFailure::Recover
    }
}
