use serde::{Deserialize, Serialize};

/// Fixed-point path cost. A straight step is 10, a diagonal step 14.
pub type Cost = u32;

pub const STRAIGHT_COST: Cost = 10;
pub const DIAGONAL_COST: Cost = 14;
pub const VERTICAL_COST: Cost = 10;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn planar(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    pub fn offset_to(self, other: Position) -> (i32, i32, i32) {
        (
            other.x.saturating_sub(self.x),
            other.y.saturating_sub(self.y),
            other.z.saturating_sub(self.z),
        )
    }

    /// Direction of a single step from `self` to `other`, if they are neighbors.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::from_offset(self.offset_to(other))
    }
}

/// Admissible estimate under the 10/14 planar cost model plus 10 per level.
pub fn octile_distance(a: Position, b: Position) -> Cost {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    let dz = a.z.abs_diff(b.z);
    let diagonal = dx.min(dy);
    let straight = dx.max(dy) - diagonal;
    diagonal
        .saturating_mul(DIAGONAL_COST)
        .saturating_add(straight.saturating_mul(STRAIGHT_COST))
        .saturating_add(dz.saturating_mul(VERTICAL_COST))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Up,
        Direction::Down,
    ];

    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::North => (0, 1, 0),
            Self::NorthEast => (1, 1, 0),
            Self::East => (1, 0, 0),
            Self::SouthEast => (1, -1, 0),
            Self::South => (0, -1, 0),
            Self::SouthWest => (-1, -1, 0),
            Self::West => (-1, 0, 0),
            Self::NorthWest => (-1, 1, 0),
            Self::Up => (0, 0, 1),
            Self::Down => (0, 0, -1),
        }
    }

    pub fn from_offset(offset: (i32, i32, i32)) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.offset() == offset)
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    pub fn base_cost(self) -> Cost {
        if self.is_diagonal() {
            DIAGONAL_COST
        } else if self.is_vertical() {
            VERTICAL_COST
        } else {
            STRAIGHT_COST
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Compact set of directions, returned by environment neighbor queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u16);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);
    pub const ALL: DirectionSet = DirectionSet(0b11_1111_1111);
    pub const PLANAR: DirectionSet = DirectionSet(0b00_1111_1111);
    pub const CARDINAL: DirectionSet = DirectionSet(0b00_0101_0101);

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::EMPTY;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

/// Which offsets from a target count as "adjacent enough" to it.
///
/// Every variant includes the target cell itself; whether a worker can actually
/// stand there is up to the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Positioning {
    #[default]
    Exact,
    Planar,
    PlanarWithVertical,
    Cardinal,
    CardinalWithVertical,
}

const EXACT_OFFSETS: [(i32, i32, i32); 1] = [(0, 0, 0)];
const CARDINAL_OFFSETS: [(i32, i32, i32); 5] =
    [(0, 0, 0), (0, 1, 0), (1, 0, 0), (0, -1, 0), (-1, 0, 0)];
const CARDINAL_VERTICAL_OFFSETS: [(i32, i32, i32); 7] = [
    (0, 0, 0),
    (0, 1, 0),
    (1, 0, 0),
    (0, -1, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
];
const PLANAR_OFFSETS: [(i32, i32, i32); 9] = [
    (0, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (1, 0, 0),
    (1, -1, 0),
    (0, -1, 0),
    (-1, -1, 0),
    (-1, 0, 0),
    (-1, 1, 0),
];
const PLANAR_VERTICAL_OFFSETS: [(i32, i32, i32); 11] = [
    (0, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (1, 0, 0),
    (1, -1, 0),
    (0, -1, 0),
    (-1, -1, 0),
    (-1, 0, 0),
    (-1, 1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

impl Positioning {
    pub fn offsets(self) -> &'static [(i32, i32, i32)] {
        match self {
            Self::Exact => &EXACT_OFFSETS,
            Self::Planar => &PLANAR_OFFSETS,
            Self::PlanarWithVertical => &PLANAR_VERTICAL_OFFSETS,
            Self::Cardinal => &CARDINAL_OFFSETS,
            Self::CardinalWithVertical => &CARDINAL_VERTICAL_OFFSETS,
        }
    }

    /// True when standing at `at` satisfies this positioning relative to `target`.
    pub fn is_satisfied(self, at: Position, target: Position) -> bool {
        let offset = target.offset_to(at);
        self.offsets().contains(&offset)
    }

    pub fn cells_around(self, target: Position) -> impl Iterator<Item = Position> {
        self.offsets().iter().map(move |(dx, dy, dz)| Position {
            x: target.x.saturating_add(*dx),
            y: target.y.saturating_add(*dy),
            z: target.z.saturating_add(*dz),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_cancel_out() {
        let origin = Position::new(3, -2, 1);
        for direction in Direction::ALL {
            assert_eq!(origin.step(direction).step(direction.opposite()), origin);
            assert_eq!(origin.direction_to(origin.step(direction)), Some(direction));
        }
    }

    #[test]
    fn direction_set_masks_match_direction_kinds() {
        assert_eq!(DirectionSet::ALL.len(), 10);
        assert!(DirectionSet::PLANAR.iter().all(|direction| !direction.is_vertical()));
        let cardinal = DirectionSet::CARDINAL.iter().collect::<Vec<_>>();
        assert_eq!(
            cardinal,
            vec![
                Direction::North,
                Direction::East,
                Direction::South,
                Direction::West
            ]
        );
    }

    #[test]
    fn octile_distance_uses_diagonals_first() {
        assert_eq!(
            octile_distance(Position::planar(0, 0), Position::planar(9, 9)),
            126
        );
        assert_eq!(
            octile_distance(Position::planar(0, 0), Position::planar(5, 2)),
            2 * DIAGONAL_COST + 3 * STRAIGHT_COST
        );
        assert_eq!(
            octile_distance(Position::new(0, 0, 0), Position::new(0, 0, 2)),
            20
        );
    }

    #[test]
    fn positioning_adjacency_rules() {
        let target = Position::planar(5, 5);
        assert!(Positioning::Exact.is_satisfied(target, target));
        assert!(!Positioning::Exact.is_satisfied(Position::planar(5, 6), target));
        assert!(Positioning::Planar.is_satisfied(Position::planar(6, 6), target));
        assert!(!Positioning::Cardinal.is_satisfied(Position::planar(6, 6), target));
        assert!(Positioning::Cardinal.is_satisfied(Position::planar(4, 5), target));
        assert!(!Positioning::Planar.is_satisfied(Position::new(5, 5, 1), target));
        assert!(Positioning::PlanarWithVertical.is_satisfied(Position::new(5, 5, 1), target));
        assert_eq!(Positioning::CardinalWithVertical.cells_around(target).count(), 7);
    }
}
