mod bidirectional;
mod node;
mod open_list;
mod path;
mod search;
mod target;

pub use bidirectional::find_path_bidirectional;
pub use node::{AStarNode, NodeId, NodeMap};
pub use open_list::OpenList;
pub use path::{Path, PathError};
pub use search::{
    seed_positions, CancellationToken, PathSearch, SearchConfig, SearchOrientation, SearchResult,
    SearchStatus, DEFAULT_MAX_NODE_COUNT,
};
pub use target::{BoxTarget, PointTarget, PredicateTarget, Target};

use crate::environment::Environment;
use crate::grid::{Position, Positioning};

pub fn find_path<E, T>(
    environment: &E,
    start: Position,
    target: &T,
    config: SearchConfig,
    cancel: &CancellationToken,
) -> Result<Path, PathError>
where
    E: Environment + ?Sized,
    T: Target + ?Sized,
{
    PathSearch::new(environment, config)
        .find(&[start], target, cancel)
        .path()
}

/// Path from `start` to anywhere `positioning` allows around `destination`,
/// searched from both ends when `config.bidirectional` is set.
pub fn find_path_to<E: Environment + ?Sized>(
    environment: &E,
    start: Position,
    destination: Position,
    positioning: Positioning,
    config: SearchConfig,
    cancel: &CancellationToken,
) -> Result<Path, PathError> {
    if config.bidirectional {
        return find_path_bidirectional(
            environment,
            start,
            destination,
            positioning,
            config,
            cancel,
        );
    }
    find_path(
        environment,
        start,
        &PointTarget::adjacent(destination, positioning),
        config,
        cancel,
    )
}
