use crate::grid::{Position, Positioning};
use crate::jobs::group::{AssignmentGroup, GroupPlan, NextAssignment};
use crate::jobs::observer::ObservedJob;
use crate::jobs::status::JobStatus;
use crate::jobs::worker::JobContext;

use super::move_to::MoveTo;

/// Visits waypoints in a loop for a fixed number of laps.
#[derive(Debug, Clone)]
pub struct Patrol {
    waypoints: Vec<Position>,
    laps: u32,
    cursor: usize,
    laps_started: u32,
    legs_started: u64,
    legs_completed: u32,
}

pub type PatrolGroup = AssignmentGroup<Patrol>;

impl Patrol {
    pub fn new(waypoints: Vec<Position>, laps: u32) -> Self {
        Self {
            waypoints,
            laps,
            cursor: 0,
            laps_started: 0,
            legs_started: 0,
            legs_completed: 0,
        }
    }

    pub fn job(waypoints: Vec<Position>, laps: u32) -> PatrolGroup {
        AssignmentGroup::new(Self::new(waypoints, laps))
    }

    pub fn legs_completed(&self) -> u32 {
        self.legs_completed
    }
}

impl GroupPlan for Patrol {
    fn label(&self) -> &'static str {
        "patrol"
    }

    fn prepare_next_assignment(&mut self, _ctx: &JobContext<'_>) -> NextAssignment {
        if self.waypoints.is_empty() {
            return NextAssignment::Finish(JobStatus::Done);
        }
        if self.cursor == 0 {
            if self.laps_started >= self.laps {
                return NextAssignment::Finish(JobStatus::Done);
            }
            self.laps_started += 1;
        }
        let waypoint = self.waypoints[self.cursor];
        self.cursor = (self.cursor + 1) % self.waypoints.len();
        self.legs_started += 1;
        NextAssignment::Start(Box::new(MoveTo::job(waypoint, Positioning::Exact)))
    }

    fn on_child_done(&mut self, _child: ObservedJob) {
        self.legs_completed += 1;
    }

    fn progress(&self) -> Option<u64> {
        Some(self.legs_started)
    }
}
