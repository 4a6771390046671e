use thiserror::Error;

use crate::environment::Environment;
use crate::grid::{Cost, Direction, Position};

use super::node::{NodeId, NodeMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("no path to target")]
    NotFound,
    #[error("path search exceeded its budget of {max_node_count} nodes")]
    LimitExceeded { max_node_count: usize },
    #[error("path search cancelled")]
    Cancelled,
}

/// A route as the sequence of single-cell steps taken from `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    start: Position,
    directions: Vec<Direction>,
    cost: Cost,
}

impl Path {
    pub fn empty(start: Position) -> Self {
        Self {
            start,
            directions: Vec::new(),
            cost: 0,
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Every cell visited, `start` included.
    pub fn positions(&self) -> Vec<Position> {
        let mut cells = Vec::with_capacity(self.directions.len() + 1);
        let mut cursor = self.start;
        cells.push(cursor);
        for direction in &self.directions {
            cursor = cursor.step(*direction);
            cells.push(cursor);
        }
        cells
    }

    pub fn end(&self) -> Position {
        self.directions
            .iter()
            .fold(self.start, |cursor, direction| cursor.step(*direction))
    }

    /// Re-walks the route against `environment`, returning the summed step cost
    /// or `None` if any step is no longer allowed.
    pub fn replay_cost<E: Environment + ?Sized>(&self, environment: &E) -> Option<Cost> {
        let mut cursor = self.start;
        let mut total: Cost = 0;
        for direction in &self.directions {
            if !environment.can_move_between(cursor, *direction) {
                return None;
            }
            cursor = cursor.step(*direction);
            total = total
                .saturating_add(direction.base_cost())
                .saturating_add(environment.tile_weight(cursor));
        }
        Some(total)
    }

    /// Path from the seed a forward search started at to `terminal`.
    pub(crate) fn from_forward(nodes: &NodeMap, terminal: NodeId) -> Option<Self> {
        let mut chain = nodes.ancestry(terminal);
        chain.reverse();
        Self::from_chain(nodes, &chain, nodes.get(terminal).g)
    }

    /// A backward search grows from the destination, so walking parents from the
    /// terminal (the mover's start) already yields the route in travel order.
    pub(crate) fn from_backward(nodes: &NodeMap, terminal: NodeId) -> Option<Self> {
        let chain = nodes.ancestry(terminal);
        Self::from_chain(nodes, &chain, nodes.get(terminal).g)
    }

    fn from_chain(nodes: &NodeMap, chain: &[NodeId], cost: Cost) -> Option<Self> {
        let start = nodes.get(*chain.first()?).position;
        let mut directions = Vec::with_capacity(chain.len().saturating_sub(1));
        for pair in chain.windows(2) {
            let from = nodes.get(pair[0]).position;
            let to = nodes.get(pair[1]).position;
            directions.push(from.direction_to(to)?);
        }
        Some(Self {
            start,
            directions,
            cost,
        })
    }
}
