use super::action::Action;
use super::job::Job;
use super::lifecycle::JobCore;
use super::observer::{JobId, JobObserver};
use super::status::{ActionState, JobStatus};
use super::worker::{JobContext, WorkerId};

/// What a leaf job does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Act(Action),
    Finish(JobStatus),
}

/// Per-kind logic of a leaf job; `Assignment` owns the lifecycle around it.
pub trait AssignmentBehavior {
    fn label(&self) -> &'static str;

    fn on_assign(&mut self, _ctx: &JobContext<'_>) {}

    fn next_action(&mut self, ctx: &JobContext<'_>) -> Step;

    /// Inspects an in-flight action. Returning a status finishes the job.
    fn on_progress(&mut self, _ctx: &JobContext<'_>, _action: &Action) -> Option<JobStatus> {
        None
    }

    /// Maps the finished action onto the job. Returning `Ok` keeps the job
    /// alive for another `next_action`.
    fn on_action_done(&mut self, result: ActionState, _ctx: &JobContext<'_>) -> JobStatus {
        result.to_job_status()
    }
}

/// Leaf job: drives exactly one primitive action at a time.
pub struct Assignment<B> {
    core: JobCore,
    behavior: B,
    current_action: Option<Action>,
}

impl<B: AssignmentBehavior> Assignment<B> {
    pub fn new(behavior: B) -> Self {
        Self {
            core: JobCore::new(behavior.label()),
            behavior,
            current_action: None,
        }
    }

    pub fn boxed(behavior: B) -> Box<Self> {
        Box::new(Self::new(behavior))
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn current_action(&self) -> Option<&Action> {
        self.current_action.as_ref()
    }

    fn finish(&mut self, status: JobStatus, parent: &mut dyn JobObserver) {
        self.current_action = None;
        self.core.finish(status, parent);
    }

    fn assert_live(&self, operation: &str) {
        assert!(
            self.core.is_assigned(),
            "{operation} on job {} ({}) that is unassigned or finished",
            self.core.id().0,
            self.core.label()
        );
    }
}

impl<B: AssignmentBehavior> Job for Assignment<B> {
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
        self.current_action.is_some()
    }

    fn assign(&mut self, ctx: &JobContext<'_>) {
        self.core.bind(ctx.worker.id());
        self.behavior.on_assign(ctx);
    }

    fn prepare_next_action(
        &mut self,
        ctx: &JobContext<'_>,
        parent: &mut dyn JobObserver,
    ) -> Option<Action> {
        self.assert_live("prepare_next_action");
        assert!(
            self.current_action.is_none(),
            "prepare_next_action on job {} ({}) while an action is outstanding",
            self.core.id().0,
            self.core.label()
        );
        match self.behavior.next_action(ctx) {
            Step::Act(action) => {
                self.current_action = Some(action);
                Some(action)
            }
            Step::Finish(status) => {
                self.finish(status, parent);
                None
            }
        }
    }

    fn action_progress(&mut self, ctx: &JobContext<'_>, parent: &mut dyn JobObserver) {
        self.assert_live("action_progress");
        let Some(action) = self.current_action else {
            return;
        };
        if let Some(status) = self.behavior.on_progress(ctx, &action) {
            self.finish(status, parent);
        }
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
            self.current_action.take().is_some(),
            "action_done on job {} ({}) without an outstanding action",
            self.core.id().0,
            self.core.label()
        );
        let status = self.behavior.on_action_done(result, ctx);
        if status.is_terminal() {
            self.finish(status, parent);
        }
    }

    fn abort(&mut self, parent: &mut dyn JobObserver) {
        self.finish(JobStatus::Abort, parent);
    }
}
