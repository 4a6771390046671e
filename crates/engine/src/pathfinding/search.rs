use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::environment::Environment;
use crate::grid::{Cost, Direction, DirectionSet, Position, Positioning};

use super::node::{AStarNode, NodeId, NodeMap};
use super::open_list::OpenList;
use super::path::{Path, PathError};
use super::target::Target;

pub const DEFAULT_MAX_NODE_COUNT: usize = 200_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_node_count: usize,
    pub bidirectional: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_node_count: DEFAULT_MAX_NODE_COUNT,
            bidirectional: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Found,
    NotFound,
    LimitExceeded,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrientation {
    /// Expands the moves a worker could make from each cell.
    Forward,
    /// Expands the moves that lead into each cell; used from the destination side.
    Backward,
}

/// Cooperative cancellation flag, checked once per popped node.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    ancestors: Vec<Arc<AtomicBool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self
                .ancestors
                .iter()
                .any(|flag| flag.load(Ordering::Acquire))
    }

    /// A token that fires when either it or `self` is cancelled.
    pub fn child(&self) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(Arc::clone(&self.flag));
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            ancestors,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub status: SearchStatus,
    pub terminal: Option<NodeId>,
    pub nodes: NodeMap,
    pub orientation: SearchOrientation,
    max_node_count: usize,
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        self.status == SearchStatus::Found
    }

    pub fn visited_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn visited_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.nodes.positions()
    }

    pub fn terminal_position(&self) -> Option<Position> {
        self.terminal.map(|id| self.nodes.get(id).position)
    }

    pub fn path(&self) -> Result<Path, PathError> {
        match self.status {
            SearchStatus::Found => {
                let terminal = self.terminal.ok_or(PathError::NotFound)?;
                let path = match self.orientation {
                    SearchOrientation::Forward => Path::from_forward(&self.nodes, terminal),
                    SearchOrientation::Backward => Path::from_backward(&self.nodes, terminal),
                };
                path.ok_or(PathError::NotFound)
            }
            SearchStatus::NotFound => Err(PathError::NotFound),
            SearchStatus::LimitExceeded => Err(PathError::LimitExceeded {
                max_node_count: self.max_node_count,
            }),
            SearchStatus::Cancelled => Err(PathError::Cancelled),
        }
    }
}

/// Seeds for a search starting at `start`, or anywhere `positioning` allows around it.
pub fn seed_positions<E: Environment + ?Sized>(
    environment: &E,
    start: Position,
    positioning: Positioning,
) -> Vec<Position> {
    if positioning == Positioning::Exact {
        return vec![start];
    }
    positioning
        .cells_around(start)
        .filter(|cell| environment.can_enter(*cell))
        .collect()
}

/// One A* run over a private node map and open list.
pub struct PathSearch<'a, E: Environment + ?Sized> {
    environment: &'a E,
    config: SearchConfig,
    orientation: SearchOrientation,
    nodes: NodeMap,
    open: OpenList,
}

impl<'a, E: Environment + ?Sized> PathSearch<'a, E> {
    pub fn new(environment: &'a E, config: SearchConfig) -> Self {
        Self {
            environment,
            config,
            orientation: SearchOrientation::Forward,
            nodes: NodeMap::new(),
            open: OpenList::new(),
        }
    }

    pub fn backward(mut self) -> Self {
        self.orientation = SearchOrientation::Backward;
        self
    }

    pub fn find<T: Target + ?Sized>(
        mut self,
        seeds: &[Position],
        target: &T,
        cancel: &CancellationToken,
    ) -> SearchResult {
        for seed in seeds {
            if self.nodes.contains(*seed) {
                continue;
            }
            let id = self
                .nodes
                .insert(AStarNode::seed(*seed, target.heuristic(*seed)));
            self.open.push(&mut self.nodes, id);
        }

        let (status, terminal) = self.run(target, cancel);
        let visited = self.nodes.len();
        match status {
            SearchStatus::Found => {
                let cost = terminal.map(|id| self.nodes.get(id).g).unwrap_or(0);
                debug!(?status, orientation = ?self.orientation, visited, cost, "path_search_finished");
            }
            SearchStatus::LimitExceeded => {
                warn!(
                    ?status,
                    orientation = ?self.orientation,
                    visited,
                    max_node_count = self.config.max_node_count,
                    "path_search_finished"
                );
            }
            SearchStatus::NotFound | SearchStatus::Cancelled => {
                debug!(?status, orientation = ?self.orientation, visited, "path_search_finished");
            }
        }

        SearchResult {
            status,
            terminal,
            nodes: self.nodes,
            orientation: self.orientation,
            max_node_count: self.config.max_node_count,
        }
    }

    fn run<T: Target + ?Sized>(
        &mut self,
        target: &T,
        cancel: &CancellationToken,
    ) -> (SearchStatus, Option<NodeId>) {
        if self.nodes.len() > self.config.max_node_count {
            return (SearchStatus::LimitExceeded, None);
        }

        loop {
            if cancel.is_cancelled() {
                return (SearchStatus::Cancelled, None);
            }
            let Some(current) = self.open.pop_min(&mut self.nodes) else {
                return (SearchStatus::NotFound, None);
            };
            let node = self.nodes.get_mut(current);
            node.closed = true;
            let position = node.position;
            let current_g = node.g;

            if target.is_target(position) {
                return (SearchStatus::Found, Some(current));
            }

            for direction in self.neighbor_directions(position).iter() {
                let (neighbor, step_cost) = self.step(position, direction);
                let candidate_g = current_g.saturating_add(step_cost);
                match self.nodes.find(neighbor) {
                    None => {
                        let mut node = AStarNode::seed(neighbor, target.heuristic(neighbor));
                        node.parent = Some(current);
                        node.g = candidate_g;
                        let id = self.nodes.insert(node);
                        self.open.push(&mut self.nodes, id);
                        if self.nodes.len() > self.config.max_node_count {
                            return (SearchStatus::LimitExceeded, None);
                        }
                    }
                    Some(existing) => {
                        let node = self.nodes.get_mut(existing);
                        if candidate_g >= node.g {
                            continue;
                        }
                        node.parent = Some(current);
                        node.g = candidate_g;
                        if node.closed {
                            self.propagate_improvement(existing);
                        } else {
                            self.open.decrease_key(&mut self.nodes, existing);
                        }
                    }
                }
            }
        }
    }

    /// Pushes a cheaper G through nodes already reachable from `improved`.
    ///
    /// Closed nodes stay closed: they are re-parented and their G lowered in
    /// place, and open ones are repositioned in the heap. Every update strictly
    /// lowers a G value, so the worklist drains.
    fn propagate_improvement(&mut self, improved: NodeId) {
        let mut worklist = vec![improved];
        while let Some(id) = worklist.pop() {
            let node = self.nodes.get(id);
            let position = node.position;
            let base_g = node.g;
            for direction in self.neighbor_directions(position).iter() {
                let (neighbor, step_cost) = self.step(position, direction);
                let Some(neighbor_id) = self.nodes.find(neighbor) else {
                    continue;
                };
                let candidate_g = base_g.saturating_add(step_cost);
                let neighbor_node = self.nodes.get_mut(neighbor_id);
                if candidate_g >= neighbor_node.g {
                    continue;
                }
                neighbor_node.parent = Some(id);
                neighbor_node.g = candidate_g;
                if neighbor_node.closed {
                    worklist.push(neighbor_id);
                } else {
                    self.open.decrease_key(&mut self.nodes, neighbor_id);
                }
            }
        }
    }

    fn neighbor_directions(&self, position: Position) -> DirectionSet {
        match self.orientation {
            SearchOrientation::Forward => self.environment.valid_neighbor_directions(position),
            SearchOrientation::Backward => Direction::ALL
                .into_iter()
                .filter(|direction| {
                    self.environment
                        .can_move_between(position.step(*direction), direction.opposite())
                })
                .collect(),
        }
    }

    /// Neighbor reached by `direction` and the cost of the real move it stands for.
    fn step(&self, position: Position, direction: Direction) -> (Position, Cost) {
        let neighbor = position.step(direction);
        let entered = match self.orientation {
            SearchOrientation::Forward => neighbor,
            SearchOrientation::Backward => position,
        };
        let cost = direction
            .base_cost()
            .saturating_add(self.environment.tile_weight(entered));
        (neighbor, cost)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;
    use crate::grid::{octile_distance, TileGrid, TileKind};
    use crate::pathfinding::target::{BoxTarget, PointTarget, PredicateTarget};

    fn open_grid(width: u32, height: u32) -> TileGrid {
        TileGrid::filled(width, height, 1, TileKind::Floor).expect("grid")
    }

    fn search_exact(grid: &TileGrid, start: Position, goal: Position) -> SearchResult {
        PathSearch::new(grid, SearchConfig::default()).find(
            &[start],
            &PointTarget::exact(goal),
            &CancellationToken::new(),
        )
    }

    fn reachable_component(grid: &TileGrid, start: Position) -> HashSet<Position> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for direction in grid.valid_neighbor_directions(cell).iter() {
                let next = cell.step(direction);
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn open_grid_paths_match_the_analytic_optimum_for_all_pairs() {
        let grid = open_grid(6, 6);
        let cells = grid.positions().collect::<Vec<_>>();
        for start in &cells {
            for goal in &cells {
                let result = search_exact(&grid, *start, *goal);
                let path = result.path().expect("open grid path");
                assert_eq!(path.cost(), octile_distance(*start, *goal), "{start:?}->{goal:?}");
                let steps = start.x.abs_diff(goal.x).max(start.y.abs_diff(goal.y)) as usize;
                assert_eq!(path.len(), steps);
                assert_eq!(path.positions().len(), path.len() + 1);
                assert_eq!(path.end(), *goal);
                assert_eq!(path.replay_cost(&grid), Some(path.cost()));
            }
        }
    }

    #[test]
    fn ten_by_ten_corner_to_corner_goes_all_diagonal() {
        let grid = open_grid(10, 10);
        let path = search_exact(&grid, Position::planar(0, 0), Position::planar(9, 9))
            .path()
            .expect("path");
        assert_eq!(path.len(), 9);
        assert_eq!(path.cost(), 126);
        assert!(path.directions().iter().all(|direction| *direction == Direction::NorthEast));
    }

    #[test]
    fn ten_by_ten_without_diagonals_takes_eighteen_steps() {
        let grid = open_grid(10, 10).with_diagonals(false);
        let path = search_exact(&grid, Position::planar(0, 0), Position::planar(9, 9))
            .path()
            .expect("path");
        assert_eq!(path.len(), 18);
        assert_eq!(path.cost(), 180);
        assert!(path.directions().iter().all(|direction| !direction.is_diagonal()));
    }

    #[test]
    fn replayed_directions_land_on_the_target() {
        let mut grid = open_grid(12, 8);
        for y in 0..7 {
            grid.set_tile(Position::planar(5, y), TileKind::Wall);
        }
        let target = PointTarget::adjacent(Position::planar(10, 1), Positioning::Cardinal);
        let start = Position::planar(1, 1);
        let result = PathSearch::new(&grid, SearchConfig::default()).find(
            &[start],
            &target,
            &CancellationToken::new(),
        );
        let path = result.path().expect("path around wall");
        assert!(target.is_target(path.end()));
        assert!(path.positions().iter().all(|cell| grid.can_enter(*cell)));
        assert!(path.positions().contains(&Position::planar(5, 7)));
    }

    #[test]
    fn enclosed_target_reports_not_found_after_exhausting_the_component() {
        let mut grid = open_grid(9, 9);
        for x in 4..=6 {
            for y in 4..=6 {
                if (x, y) != (5, 5) {
                    grid.set_tile(Position::planar(x, y), TileKind::Wall);
                }
            }
        }
        let start = Position::planar(0, 0);
        let config = SearchConfig {
            max_node_count: 1_000,
            ..SearchConfig::default()
        };
        let result = PathSearch::new(&grid, config).find(
            &[start],
            &PointTarget::exact(Position::planar(5, 5)),
            &CancellationToken::new(),
        );
        assert_eq!(result.status, SearchStatus::NotFound);
        assert!(result.visited_count() <= config.max_node_count);
        let visited = result.visited_positions().collect::<HashSet<_>>();
        assert_eq!(visited, reachable_component(&grid, start));
        assert_eq!(visited.len(), 81 - 9);
        assert_eq!(result.path(), Err(PathError::NotFound));
    }

    #[test]
    fn node_budget_bounds_searches_on_huge_maps() {
        let grid = open_grid(300, 300);
        let config = SearchConfig {
            max_node_count: 500,
            ..SearchConfig::default()
        };
        let result = PathSearch::new(&grid, config).find(
            &[Position::planar(0, 0)],
            &PointTarget::exact(Position::planar(-5, -5)),
            &CancellationToken::new(),
        );
        assert_eq!(result.status, SearchStatus::LimitExceeded);
        assert_eq!(result.visited_count(), 501);
        assert_eq!(
            result.path(),
            Err(PathError::LimitExceeded {
                max_node_count: 500
            })
        );
    }

    #[test]
    fn cancelled_token_stops_before_expanding() {
        let grid = open_grid(10, 10);
        let parent = CancellationToken::new();
        let token = parent.child();
        parent.cancel();
        assert!(token.is_cancelled());
        let result = PathSearch::new(&grid, SearchConfig::default()).find(
            &[Position::planar(0, 0)],
            &PointTarget::exact(Position::planar(9, 9)),
            &token,
        );
        assert_eq!(result.status, SearchStatus::Cancelled);
        assert_eq!(result.visited_count(), 1);
    }

    #[test]
    fn positioning_seeds_start_next_to_a_solid_cell() {
        let mut grid = open_grid(5, 5);
        let rock = Position::planar(2, 2);
        grid.set_tile(rock, TileKind::Rock { hardness: 1 });
        let seeds = seed_positions(&grid, rock, Positioning::Cardinal);
        assert_eq!(seeds.len(), 4);
        assert!(!seeds.contains(&rock));

        let result = PathSearch::new(&grid, SearchConfig::default()).find(
            &seeds,
            &PointTarget::exact(Position::planar(2, 4)),
            &CancellationToken::new(),
        );
        let path = result.path().expect("path");
        assert_eq!(path.start(), Position::planar(2, 3));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn mud_is_avoided_when_a_detour_is_cheaper() {
        let mut grid = open_grid(5, 3);
        grid.set_tile(Position::planar(2, 1), TileKind::Mud);
        let path = search_exact(&grid, Position::planar(0, 1), Position::planar(4, 1))
            .path()
            .expect("path");
        assert!(!path.positions().contains(&Position::planar(2, 1)));
        assert_eq!(path.cost(), 48);
        assert_eq!(path.replay_cost(&grid), Some(48));
    }

    #[test]
    fn ladders_connect_levels() {
        let mut grid = TileGrid::filled(4, 1, 2, TileKind::Floor).expect("grid");
        grid.set_tile(Position::new(3, 0, 0), TileKind::Ladder);
        grid.set_tile(Position::new(3, 0, 1), TileKind::Ladder);
        let path = search_exact(&grid, Position::new(0, 0, 0), Position::new(0, 0, 1))
            .path()
            .expect("path");
        assert_eq!(path.len(), 7);
        assert!(path.directions().contains(&Direction::Up));
        assert_eq!(path.cost(), 70);
    }

    /// Admissible but inconsistent: it delays the cell on the cheap route.
    struct DelayedCellTarget {
        goal: Position,
        delayed: Position,
        delay: Cost,
    }

    impl Target for DelayedCellTarget {
        fn is_target(&self, position: Position) -> bool {
            position == self.goal
        }

        fn heuristic(&self, position: Position) -> Cost {
            if position == self.delayed {
                self.delay
            } else {
                0
            }
        }
    }

    #[test]
    fn improving_a_closed_node_relaxes_its_descendants_without_reopening_it() {
        let grid = open_grid(7, 3);
        let target = DelayedCellTarget {
            goal: Position::planar(5, 1),
            delayed: Position::planar(1, 1),
            delay: 20,
        };
        let result = PathSearch::new(&grid, SearchConfig::default()).find(
            &[Position::planar(0, 1)],
            &target,
            &CancellationToken::new(),
        );
        let path = result.path().expect("path");
        assert_eq!(path.cost(), 50);
        assert!(path.positions().contains(&Position::planar(1, 1)));
        assert!(path.positions().contains(&Position::planar(2, 1)));
        let relaxed = result
            .nodes
            .find(Position::planar(2, 1))
            .expect("relaxed node");
        assert!(result.nodes.get(relaxed).closed);
        assert_eq!(result.nodes.get(relaxed).g, 20);
    }

    #[test]
    fn box_target_stops_at_the_nearest_corner() {
        let grid = open_grid(10, 10);
        let target = BoxTarget::new(Position::planar(5, 5), Position::planar(7, 8));
        let result = PathSearch::new(&grid, SearchConfig::default()).find(
            &[Position::planar(0, 0)],
            &target,
            &CancellationToken::new(),
        );
        assert_eq!(result.terminal_position(), Some(Position::planar(5, 5)));
        let path = result.path().expect("path");
        assert_eq!(path.cost(), 70);
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn predicate_target_finds_the_cheapest_match_not_the_closest_one() {
        let mut grid = open_grid(7, 7);
        for y in 0..=5 {
            grid.set_tile(Position::planar(1, y), TileKind::Wall);
        }
        let behind_wall = Position::planar(2, 0);
        let down_the_column = Position::planar(0, 4);
        let target =
            PredicateTarget::new(move |cell: Position| cell == behind_wall || cell == down_the_column);
        let result = PathSearch::new(&grid, SearchConfig::default()).find(
            &[Position::planar(0, 0)],
            &target,
            &CancellationToken::new(),
        );
        assert_eq!(result.terminal_position(), Some(down_the_column));
        assert_eq!(result.path().expect("path").cost(), 40);
    }
}
