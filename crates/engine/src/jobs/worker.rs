use serde::{Deserialize, Serialize};

use crate::environment::{Environment, ItemKind};
use crate::grid::{Position, Positioning};
use crate::pathfinding::{
    find_path, find_path_to, CancellationToken, Path, PathError, SearchConfig, Target,
};

pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

/// The agent a job is bound to. Owned by the world, only read by jobs.
pub trait Worker {
    fn id(&self) -> WorkerId;
    fn location(&self) -> Position;
    fn has_outstanding_action(&self) -> bool;
    fn carrying(&self) -> Option<ItemKind>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Failed movement steps in a row before a movement job gives up.
    pub max_consecutive_failures: u32,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }
}

/// Everything a job may look at while it is driven for one worker and one tick.
#[derive(Clone, Copy)]
pub struct JobContext<'a> {
    pub worker: &'a dyn Worker,
    pub environment: &'a dyn Environment,
    pub tick: u64,
    pub search: SearchConfig,
    pub jobs: JobConfig,
    pub cancel: &'a CancellationToken,
}

impl<'a> JobContext<'a> {
    pub fn location(&self) -> Position {
        self.worker.location()
    }

    pub fn path_to(&self, destination: Position, positioning: Positioning) -> Result<Path, PathError> {
        find_path_to(
            self.environment,
            self.worker.location(),
            destination,
            positioning,
            self.search,
            self.cancel,
        )
    }

    pub fn path_to_target(&self, target: &dyn Target) -> Result<Path, PathError> {
        find_path(
            self.environment,
            self.worker.location(),
            target,
            self.search,
            self.cancel,
        )
    }
}
