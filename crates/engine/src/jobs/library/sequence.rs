use std::collections::VecDeque;

use crate::jobs::group::{AssignmentGroup, GroupPlan, NextAssignment};
use crate::jobs::job::Job;
use crate::jobs::status::JobStatus;
use crate::jobs::worker::JobContext;

/// Runs a fixed list of jobs in order.
pub struct Sequence {
    remaining: VecDeque<Box<dyn Job>>,
}

pub type SequenceGroup = AssignmentGroup<Sequence>;

impl Sequence {
    pub fn new(children: Vec<Box<dyn Job>>) -> Self {
        Self {
            remaining: children.into(),
        }
    }

    pub fn job(children: Vec<Box<dyn Job>>) -> SequenceGroup {
        AssignmentGroup::new(Self::new(children))
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl GroupPlan for Sequence {
    fn label(&self) -> &'static str {
        "sequence"
    }

    fn prepare_next_assignment(&mut self, _ctx: &JobContext<'_>) -> NextAssignment {
        match self.remaining.pop_front() {
            Some(child) => NextAssignment::Start(child),
            None => NextAssignment::Finish(JobStatus::Done),
        }
    }

    fn progress(&self) -> Option<u64> {
        Some(self.remaining.len() as u64)
    }
}
