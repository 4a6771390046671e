use crate::grid::{octile_distance, Cost, Position, Positioning};

/// What a search is looking for.
pub trait Target: Sync {
    fn is_target(&self, position: Position) -> bool;

    /// Estimated remaining cost. Must never overestimate for optimal paths.
    fn heuristic(&self, position: Position) -> Cost;
}

/// A single cell, reached when standing anywhere its positioning allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointTarget {
    pub position: Position,
    pub positioning: Positioning,
}

impl PointTarget {
    pub fn exact(position: Position) -> Self {
        Self {
            position,
            positioning: Positioning::Exact,
        }
    }

    pub fn adjacent(position: Position, positioning: Positioning) -> Self {
        Self {
            position,
            positioning,
        }
    }
}

impl Target for PointTarget {
    fn is_target(&self, position: Position) -> bool {
        self.positioning.is_satisfied(position, self.position)
    }

    fn heuristic(&self, position: Position) -> Cost {
        self.positioning
            .cells_around(self.position)
            .map(|cell| octile_distance(position, cell))
            .min()
            .unwrap_or(0)
    }
}

/// Axis-aligned box, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxTarget {
    min: Position,
    max: Position,
}

impl BoxTarget {
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(self.min.x, self.max.x),
            position.y.clamp(self.min.y, self.max.y),
            position.z.clamp(self.min.z, self.max.z),
        )
    }
}

impl Target for BoxTarget {
    fn is_target(&self, position: Position) -> bool {
        self.clamp(position) == position
    }

    fn heuristic(&self, position: Position) -> Cost {
        octile_distance(position, self.clamp(position))
    }
}

/// Any cell matching a predicate; used for "nearest matching tile" searches.
pub struct PredicateTarget<F> {
    predicate: F,
}

impl<F> PredicateTarget<F>
where
    F: Fn(Position) -> bool + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> Target for PredicateTarget<F>
where
    F: Fn(Position) -> bool + Sync,
{
    fn is_target(&self, position: Position) -> bool {
        (self.predicate)(position)
    }

    fn heuristic(&self, _position: Position) -> Cost {
        0
    }
}
