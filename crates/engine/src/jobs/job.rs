use super::action::Action;
use super::observer::{JobId, JobObserver};
use super::status::{ActionState, JobStatus};
use super::worker::{JobContext, WorkerId};

/// The lifecycle every job exposes to its holder.
///
/// The holder drives `prepare_next_action`, `action_progress` and
/// `action_done` at most once each per tick and never reentrantly. `parent`
/// is told about the terminal transition, exactly once.
pub trait Job {
    fn id(&self) -> JobId;
    fn label(&self) -> &'static str;
    fn status(&self) -> JobStatus;
    fn worker(&self) -> Option<WorkerId>;
    fn has_outstanding_action(&self) -> bool;

    fn is_assigned(&self) -> bool {
        self.worker().is_some()
    }

    /// Binds the context's worker. The job stays `Ok`.
    fn assign(&mut self, ctx: &JobContext<'_>);

    /// Next primitive action, or `None` once the job has reached a terminal status.
    ///
    /// # Panics
    /// When an action is still outstanding or the job is not assigned.
    fn prepare_next_action(
        &mut self,
        ctx: &JobContext<'_>,
        parent: &mut dyn JobObserver,
    ) -> Option<Action>;

    /// Called every tick the action is still in flight.
    fn action_progress(&mut self, ctx: &JobContext<'_>, parent: &mut dyn JobObserver);

    /// Reports the finished action; `result` must not be `ActionState::Ok`.
    fn action_done(
        &mut self,
        result: ActionState,
        ctx: &JobContext<'_>,
        parent: &mut dyn JobObserver,
    );

    /// Cancels the job unconditionally. No-op once terminal.
    fn abort(&mut self, parent: &mut dyn JobObserver);
}
