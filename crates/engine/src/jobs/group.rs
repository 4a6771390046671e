use tracing::{debug, warn};

use super::action::Action;
use super::job::Job;
use super::lifecycle::JobCore;
use super::observer::{JobId, JobObserver, ObservedJob};
use super::status::{ActionState, JobStatus};
use super::worker::{JobContext, WorkerId};

/// Children a group may start inside one `prepare_next_action` without its
/// plan reporting progress before it gives up on the plan.
pub const MAX_STALLED_CHILDREN: usize = 256;

pub enum NextAssignment {
    Start(Box<dyn Job>),
    Finish(JobStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFailure {
    /// The group finishes with the child's status.
    Propagate,
    /// The group stays alive and asks its plan for another child.
    Recover,
}

/// Decides which child a group runs next and how it reacts to outcomes.
pub trait GroupPlan {
    fn label(&self) -> &'static str;

    fn prepare_next_assignment(&mut self, ctx: &JobContext<'_>) -> NextAssignment;

    fn on_child_done(&mut self, _child: ObservedJob) {}

    fn on_child_failed(&mut self, _child: ObservedJob, _status: JobStatus) -> ChildFailure {
        ChildFailure::Propagate
    }

    /// Sees every terminal notification from a child, aborts included.
    fn on_child_status(&mut self, _child: ObservedJob, _status: JobStatus) {}

    /// A counter that moves whenever the plan gets closer to finishing.
    ///
    /// Plans that return `None` are cut off after `MAX_STALLED_CHILDREN`
    /// zero-action children in one prepare; plans that report progress are
    /// only cut off once that many children start without it moving.
    fn progress(&self) -> Option<u64> {
        None
    }
}

/// Composite job: owns at most one live child and runs children one at a time.
pub struct AssignmentGroup<P> {
    core: JobCore,
    plan: P,
    child: Option<Box<dyn Job>>,
    child_outcome: Option<(ObservedJob, JobStatus)>,
    action_outstanding: bool,
}

impl<P: GroupPlan> AssignmentGroup<P> {
    pub fn new(plan: P) -> Self {
        Self {
            core: JobCore::new(plan.label()),
            plan,
            child: None,
            child_outcome: None,
            action_outstanding: false,
        }
    }

    pub fn boxed(plan: P) -> Box<Self> {
        Box::new(Self::new(plan))
    }

    pub fn plan(&self) -> &P {
        &self.plan
    }

    pub fn active_child(&self) -> Option<&dyn Job> {
        self.child.as_deref()
    }

    fn assert_live(&self, operation: &str) {
        assert!(
            self.core.is_assigned(),
            "{operation} on group {} ({}) that is unassigned or finished",
            self.core.id().0,
            self.core.label()
        );
    }

    /// Applies a finished child's outcome. Returns false once the group itself finished.
    fn settle_child(&mut self, parent: &mut dyn JobObserver) -> bool {
        let Some((child, status)) = self.child_outcome.take() else {
            return true;
        };
        match status {
            JobStatus::Ok => true,
            JobStatus::Done => {
                self.plan.on_child_done(child);
                true
            }
            JobStatus::Fail | JobStatus::Abort => match self.plan.on_child_failed(child, status) {
                ChildFailure::Recover => {
                    debug!(
                        group = self.core.id().0,
                        label = self.core.label(),
                        child = child.label,
                        ?status,
                        "group_child_recovered"
                    );
                    true
                }
                ChildFailure::Propagate => {
                    self.finish(status, parent);
                    false
                }
            },
        }
    }

    /// Puts a still-live child back, or settles a finished one.
    fn restore_or_settle(&mut self, child: Box<dyn Job>, parent: &mut dyn JobObserver) {
        if child.status().is_terminal() {
            self.action_outstanding = false;
            self.settle_child(parent);
        } else {
            self.action_outstanding = child.has_outstanding_action();
            self.child = Some(child);
        }
    }

    fn finish(&mut self, status: JobStatus, parent: &mut dyn JobObserver) {
        self.action_outstanding = false;
        self.core.finish(status, parent);
    }
}

impl<P: GroupPlan> JobObserver for AssignmentGroup<P> {
    fn on_observable_job_status_changed(&mut self, job: ObservedJob, status: JobStatus) {
        self.plan.on_child_status(job, status);
        self.child_outcome = Some((job, status));
    }
}

impl<P: GroupPlan> Job for AssignmentGroup<P> {
    fn id(&self) -> JobId {
        self.core.id()
    }

    fn label(&self) -> &'static str {
        self.core.label()
    }

    fn status(&self) -> JobStatus {
        self.core.status()
    }

    fn worker(&self) -> Option<WorkerId> {
        self.core.worker()
    }

    fn has_outstanding_action(&self) -> bool {
        self.action_outstanding
    }

    fn assign(&mut self, ctx: &JobContext<'_>) {
        self.core.bind(ctx.worker.id());
    }

    fn prepare_next_action(
        &mut self,
        ctx: &JobContext<'_>,
        parent: &mut dyn JobObserver,
    ) -> Option<Action> {
        self.assert_live("prepare_next_action");
        assert!(
            !self.action_outstanding,
            "prepare_next_action on group {} ({}) while an action is outstanding",
            self.core.id().0,
            self.core.label()
        );

        let mut progress = self.plan.progress();
        let mut stalled = 0;
        loop {
            let mut child = match self.child.take() {
                Some(child) => child,
                None => match self.plan.prepare_next_assignment(ctx) {
                    NextAssignment::Start(mut child) => {
                        let now = self.plan.progress();
                        if now.is_some() && now != progress {
                            progress = now;
                            stalled = 0;
                        }
                        stalled += 1;
                        if stalled > MAX_STALLED_CHILDREN {
                            warn!(
                                group = self.core.id().0,
                                label = self.core.label(),
                                limit = MAX_STALLED_CHILDREN,
                                tick = ctx.tick,
                                "group_child_limit_reached"
                            );
                            self.finish(JobStatus::Fail, parent);
                            return None;
                        }
                        child.assign(ctx);
                        debug!(
                            group = self.core.id().0,
                            label = self.core.label(),
                            child = child.label(),
                            tick = ctx.tick,
                            "group_child_started"
                        );
                        child
                    }
                    NextAssignment::Finish(status) => {
                        self.finish(status, parent);
                        return None;
                    }
                },
            };

            if let Some(action) = child.prepare_next_action(ctx, self) {
                self.child = Some(child);
                self.action_outstanding = true;
                return Some(action);
            }
            assert!(
                child.status().is_terminal(),
                "job {} ({}) yielded no action but is still live",
                child.id().0,
                child.label()
            );
            if !self.settle_child(parent) {
                return None;
            }
        }
    }

    fn action_progress(&mut self, ctx: &JobContext<'_>, parent: &mut dyn JobObserver) {
        self.assert_live("action_progress");
        let Some(mut child) = self.child.take() else {
            return;
        };
        child.action_progress(ctx, self);
        self.restore_or_settle(child, parent);
    }

    fn action_done(
        &mut self,
        result: ActionState,
        ctx: &JobContext<'_>,
        parent: &mut dyn JobObserver,
    ) {
        assert!(result.is_finished(), "action_done needs a finished action state");
        self.assert_live("action_done");
        assert!(
            self.action_outstanding,
            "action_done on group {} ({}) without an outstanding action",
            self.core.id().0,
            self.core.label()
        );
        self.action_outstanding = false;
        let Some(mut child) = self.child.take() else {
            return;
        };
        child.action_done(result, ctx, self);
        self.restore_or_settle(child, parent);
    }

    fn abort(&mut self, parent: &mut dyn JobObserver) {
        if self.core.status().is_terminal() {
            return;
        }
        if let Some(mut child) = self.child.take() {
            child.abort(self);
        }
        self.child_outcome = None;
        self.finish(JobStatus::Abort, parent);
    }
}
