pub mod environment;
pub mod grid;
pub mod jobs;
pub mod pathfinding;

pub use environment::{Environment, ItemFilter, ItemKind};
pub use grid::{
    octile_distance, Cost, Direction, DirectionSet, GridError, Position, Positioning,
    StrikeOutcome, TileGrid, TileKind,
};
pub use jobs::{
    Action, ActionState, Assignment, AssignmentBehavior, AssignmentGroup, ChildFailure,
    GroupPlan, Job, JobConfig, JobContext, JobId, JobObserver, JobStatus, NextAssignment,
    NullObserver, ObservedJob, StatusRecorder, Step, Worker, WorkerId,
};
pub use pathfinding::{
    find_path, find_path_bidirectional, find_path_to, BoxTarget, CancellationToken, Path,
    PathError, PathSearch, PointTarget, PredicateTarget, SearchConfig, SearchResult,
    SearchStatus, Target,
};
