use tracing::debug;

use super::observer::{JobId, JobObserver, ObservedJob};
use super::status::JobStatus;
use super::worker::WorkerId;

/// Identity, status and worker binding shared by every job kind.
#[derive(Debug)]
pub struct JobCore {
    id: JobId,
    label: &'static str,
    status: JobStatus,
    worker: Option<WorkerId>,
}

impl JobCore {
    pub fn new(label: &'static str) -> Self {
        Self {
            id: JobId::next(),
            label,
            status: JobStatus::Ok,
            worker: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn worker(&self) -> Option<WorkerId> {
        self.worker
    }

    pub fn is_assigned(&self) -> bool {
        self.worker.is_some()
    }

    pub fn observed(&self) -> ObservedJob {
        ObservedJob {
            id: self.id,
            label: self.label,
        }
    }

    pub fn bind(&mut self, worker: WorkerId) {
        assert!(
            !self.status.is_terminal(),
            "job {} ({}) assigned after it finished",
            self.id.0,
            self.label
        );
        assert!(
            self.worker.is_none(),
            "job {} ({}) assigned twice",
            self.id.0,
            self.label
        );
        self.worker = Some(worker);
    }

    /// Moves to a terminal status, unbinds the worker and tells `parent`.
    ///
    /// Returns false without notifying when the job had already finished.
    pub fn finish(&mut self, status: JobStatus, parent: &mut dyn JobObserver) -> bool {
        assert!(status.is_terminal(), "jobs can only finish with a terminal status");
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        let worker = self.worker.take();
        debug!(
            job = self.id.0,
            label = self.label,
            ?status,
            worker = worker.map(|worker| worker.0),
            "job_status_changed"
        );
        parent.on_observable_job_status_changed(self.observed(), status);
        true
    }
}
