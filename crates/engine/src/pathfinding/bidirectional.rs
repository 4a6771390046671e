use std::panic;
use std::thread;

use tracing::{debug, warn};

use crate::environment::Environment;
use crate::grid::{Position, Positioning};

use super::path::{Path, PathError};
use super::search::{
    seed_positions, CancellationToken, PathSearch, SearchConfig, SearchResult, SearchStatus,
};
use super::target::PointTarget;

/// Runs a forward search from `start` and a backward search from the cells
/// around `destination` at the same time.
///
/// The first side to reach a definite answer (found or unreachable) cancels
/// the other. Each side gets the full node budget.
pub fn find_path_bidirectional<E: Environment + ?Sized>(
    environment: &E,
    start: Position,
    destination: Position,
    positioning: Positioning,
    config: SearchConfig,
    cancel: &CancellationToken,
) -> Result<Path, PathError> {
    if positioning.is_satisfied(start, destination) {
        return Ok(Path::empty(start));
    }

    let forward_target = PointTarget::adjacent(destination, positioning);
    let backward_target = PointTarget::exact(start);
    let backward_seeds = seed_positions(environment, destination, positioning);
    let race = cancel.child();

    thread::scope(|scope| {
        let backward = thread::Builder::new()
            .name("path-backward".to_owned())
            .spawn_scoped(scope, || {
                let result = PathSearch::new(environment, config).backward().find(
                    &backward_seeds,
                    &backward_target,
                    &race,
                );
                settle_race(&result, &race);
                result
            });

        let backward = match backward {
            Ok(handle) => handle,
            Err(error) => {
                warn!(%error, "path_backward_spawn_failed");
                return PathSearch::new(environment, config)
                    .find(&[start], &forward_target, cancel)
                    .path();
            }
        };

        let forward = PathSearch::new(environment, config).find(&[start], &forward_target, &race);
        settle_race(&forward, &race);

        let backward = match backward.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        };
        resolve(&forward, &backward)
    })
}

fn settle_race(result: &SearchResult, race: &CancellationToken) {
    if matches!(result.status, SearchStatus::Found | SearchStatus::NotFound) {
        race.cancel();
    }
}

fn resolve(forward: &SearchResult, backward: &SearchResult) -> Result<Path, PathError> {
    debug!(
        forward = ?forward.status,
        backward = ?backward.status,
        forward_visited = forward.visited_count(),
        backward_visited = backward.visited_count(),
        "path_bidirectional_finished"
    );
    if forward.is_found() {
        return forward.path();
    }
    if backward.is_found() {
        return backward.path();
    }
    let statuses = [forward.status, backward.status];
    if statuses.contains(&SearchStatus::NotFound) {
        return Err(PathError::NotFound);
    }
    if forward.status == SearchStatus::LimitExceeded {
        return forward.path();
    }
    if backward.status == SearchStatus::LimitExceeded {
        return backward.path();
    }
    Err(PathError::Cancelled)
}
