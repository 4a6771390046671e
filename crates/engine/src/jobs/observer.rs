use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::status::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl JobId {
    pub(crate) fn next() -> Self {
        static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of the job that changed status, as seen by whoever holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservedJob {
    pub id: JobId,
    pub label: &'static str,
}

/// Receives exactly one call per terminal transition of an observed job.
///
/// Groups observe their active child; the top-level holder (usually the AI
/// policy) observes root jobs. Depth is unbounded since any implementor can
/// sit above any job.
pub trait JobObserver {
    fn on_observable_job_status_changed(&mut self, job: ObservedJob, status: JobStatus);
}

/// Observer for jobs nobody is waiting on.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl JobObserver for NullObserver {
    fn on_observable_job_status_changed(&mut self, _job: ObservedJob, _status: JobStatus) {}
}

#[derive(Debug, Clone, Default)]
pub struct StatusRecorder {
    pub events: Vec<(ObservedJob, JobStatus)>,
}

impl StatusRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<JobStatus> {
        self.events.iter().map(|(_, status)| *status).collect()
    }

    pub fn last_status(&self) -> Option<JobStatus> {
        self.events.last().map(|(_, status)| *status)
    }
}

impl JobObserver for StatusRecorder {
    fn on_observable_job_status_changed(&mut self, job: ObservedJob, status: JobStatus) {
        self.events.push((job, status));
    }
}
