use std::collections::{HashMap, HashSet};

use engine::jobs::library::{Haul, MineTile, Wait};
use engine::{
    octile_distance, ItemFilter, ItemKind, Job, JobContext, JobId, JobObserver, JobStatus,
    ObservedJob, Position, Positioning, PredicateTarget,
};
use tracing::{debug, info};

use super::world::ColonyWorld;

/// Where a settler has to stand to pick up a loose item.
const PICKUP_REACH: Positioning = Positioning::Planar;

pub const IDLE_TICKS: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobTally {
    pub done: u32,
    pub failed: u32,
    pub aborted: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Designation(Position),
    Haul { source: Position, destination: Position },
}

/// Picks root jobs for idle settlers and observes how they end.
#[derive(Debug, Default)]
pub struct ColonyPolicy {
    claims: HashMap<JobId, Claim>,
    abandoned: HashSet<Position>,
    tally: JobTally,
}

impl ColonyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self) -> JobTally {
        self.tally
    }

    pub fn active_claims(&self) -> usize {
        self.claims.len()
    }

    /// Mining first, then hauling, otherwise a short wait.
    pub fn next_job(&mut self, world: &ColonyWorld, ctx: &JobContext<'_>) -> Box<dyn Job> {
        let settler = ctx.worker.id().0;
        if let Some(target) = self.pick_designation(world, ctx.location()) {
            let job = MineTile::job(target);
            debug!(settler, job = job.id().0, ?target, "mine_job_selected");
            self.claims.insert(job.id(), Claim::Designation(target));
            return Box::new(job);
        }
        if let Some((source, item, destination)) = self.pick_haul(world, ctx) {
            let job = Haul::job(source, ItemFilter::Kind(item), destination);
            debug!(
                settler,
                job = job.id().0,
                ?source,
                ?destination,
                "haul_job_selected"
            );
            self.claims.insert(
                job.id(),
                Claim::Haul {
                    source,
                    destination,
                },
            );
            return Box::new(job);
        }
        debug!(settler, ticks = IDLE_TICKS, "settler_idle");
        Box::new(Wait::job(IDLE_TICKS))
    }

    fn is_claimed(&self, position: Position) -> bool {
        self.claims.values().any(|claim| match claim {
            Claim::Designation(target) => *target == position,
            Claim::Haul {
                source,
                destination,
            } => *source == position || *destination == position,
        })
    }

    fn is_available(&self, position: Position) -> bool {
        !self.abandoned.contains(&position) && !self.is_claimed(position)
    }

    fn pick_designation(&self, world: &ColonyWorld, from: Position) -> Option<Position> {
        world
            .pending_designations()
            .filter(|target| self.is_available(*target))
            .min_by_key(|target| (octile_distance(from, *target), *target))
    }

    /// The loose item with the cheapest walk to it, and the stockpile cell closest to it.
    fn pick_haul(
        &self,
        world: &ColonyWorld,
        ctx: &JobContext<'_>,
    ) -> Option<(Position, ItemKind, Position)> {
        let candidates = world
            .loose_items()
            .into_iter()
            .filter(|(source, _)| self.is_available(*source))
            .collect::<HashMap<_, _>>();
        if candidates.is_empty() || world.free_stockpile_cells().is_empty() {
            return None;
        }
        let target = PredicateTarget::new(|cell: Position| {
            PICKUP_REACH
                .cells_around(cell)
                .any(|around| candidates.contains_key(&around))
        });
        let path = match ctx.path_to_target(&target) {
            Ok(path) => path,
            Err(error) => {
                debug!(
                    settler = ctx.worker.id().0,
                    candidates = candidates.len(),
                    %error,
                    "no_reachable_loose_item"
                );
                return None;
            }
        };
        let stand = path.end();
        let (source, item) = PICKUP_REACH
            .cells_around(stand)
            .filter_map(|cell| candidates.get(&cell).map(|item| (cell, *item)))
            .min_by_key(|(cell, _)| (octile_distance(stand, *cell), *cell))?;
        let destination = world
            .free_stockpile_cells()
            .into_iter()
            .filter(|cell| !self.is_claimed(*cell))
            .min_by_key(|cell| (octile_distance(source, *cell), *cell))?;
        Some((source, item, destination))
    }
}

impl JobObserver for ColonyPolicy {
    fn on_observable_job_status_changed(&mut self, job: ObservedJob, status: JobStatus) {
        match status {
            JobStatus::Ok => return,
            JobStatus::Done => self.tally.done += 1,
            JobStatus::Fail => self.tally.failed += 1,
            JobStatus::Abort => self.tally.aborted += 1,
        }
        let claim = self.claims.remove(&job.id);
        if status != JobStatus::Done {
            match claim {
                Some(Claim::Designation(target)) => {
                    self.abandoned.insert(target);
                }
                Some(Claim::Haul { source, .. }) => {
                    self.abandoned.insert(source);
                }
                None => {}
            }
        }
        if claim.is_some() {
            info!(job = job.id.0, label = job.label, ?status, "root_job_finished");
        }
    }
}
