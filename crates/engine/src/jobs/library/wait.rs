use crate::jobs::action::Action;
use crate::jobs::assignment::{Assignment, AssignmentBehavior, Step};
use crate::jobs::status::JobStatus;
use crate::jobs::worker::JobContext;

/// Idles for a number of ticks. Zero ticks finishes without an action.
#[derive(Debug, Clone)]
pub struct Wait {
    ticks: u32,
    issued: bool,
}

pub type WaitJob = Assignment<Wait>;

impl Wait {
    pub fn new(ticks: u32) -> Self {
        Self {
            ticks,
            issued: false,
        }
    }

    pub fn job(ticks: u32) -> WaitJob {
        Assignment::new(Self::new(ticks))
    }
}

impl AssignmentBehavior for Wait {
    fn label(&self) -> &'static str {
        "wait"
    }

    fn next_action(&mut self, _ctx: &JobContext<'_>) -> Step {
        if self.ticks == 0 || self.issued {
            return Step::Finish(JobStatus::Done);
        }
        self.issued = true;
        Step::Act(Action::Wait { ticks: self.ticks })
    }
}
