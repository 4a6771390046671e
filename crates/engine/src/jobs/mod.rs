//! Hierarchical job state machines driven once per tick by the world.

mod action;
mod assignment;
mod group;
mod job;
pub mod library;
mod lifecycle;
mod observer;
mod status;
#[cfg(test)]
mod testing;
mod worker;

pub use action::Action;
pub use assignment::{Assignment, AssignmentBehavior, Step};
pub use group::{
    AssignmentGroup, ChildFailure, GroupPlan, NextAssignment, MAX_STALLED_CHILDREN,
};
pub use job::Job;
pub use lifecycle::JobCore;
pub use observer::{JobId, JobObserver, NullObserver, ObservedJob, StatusRecorder};
pub use status::{ActionState, JobStatus};
pub use worker::{JobConfig, JobContext, Worker, WorkerId, DEFAULT_MAX_CONSECUTIVE_FAILURES};
