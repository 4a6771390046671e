use crate::grid::{Position, Positioning};
use crate::jobs::action::Action;
use crate::jobs::assignment::{Assignment, AssignmentBehavior, Step};
use crate::jobs::status::{ActionState, JobStatus};
use crate::jobs::worker::JobContext;

/// Strikes a tile until the environment no longer reports it as minable.
#[derive(Debug, Clone)]
pub struct Mine {
    target: Position,
    positioning: Positioning,
    strikes: u32,
}

pub type MineJob = Assignment<Mine>;

impl Mine {
    pub fn new(target: Position, positioning: Positioning) -> Self {
        Self {
            target,
            positioning,
            strikes: 0,
        }
    }

    pub fn job(target: Position, positioning: Positioning) -> MineJob {
        Assignment::new(Self::new(target, positioning))
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }
}

impl AssignmentBehavior for Mine {
    fn label(&self) -> &'static str {
        "mine"
    }

    fn next_action(&mut self, ctx: &JobContext<'_>) -> Step {
        if !ctx.environment.is_minable(self.target) {
            return Step::Finish(JobStatus::Done);
        }
        if !self.positioning.is_satisfied(ctx.location(), self.target) {
            return Step::Finish(JobStatus::Fail);
        }
        Step::Act(Action::Work {
            target: self.target,
        })
    }

    /// A finished strike only ends the job once the tile is actually gone.
    fn on_action_done(&mut self, result: ActionState, ctx: &JobContext<'_>) -> JobStatus {
        match result {
            ActionState::Done => {
                self.strikes += 1;
                if ctx.environment.is_minable(self.target) {
                    JobStatus::Ok
                } else {
                    JobStatus::Done
                }
            }
            other => other.to_job_status(),
        }
    }
}
