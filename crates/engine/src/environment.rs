use serde::{Deserialize, Serialize};

use crate::grid::{Cost, Direction, DirectionSet, Position};

/// Interned item type id; the world owns the mapping to names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ItemKind(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemFilter {
    Kind(ItemKind),
}

impl ItemFilter {
    pub fn accepts(self, item: ItemKind) -> bool {
        match self {
            Self::Kind(kind) => kind == item,
        }
    }
}

/// Read-only terrain queries used by path search and job preconditions.
///
/// Implementations must be safe to share across the two halves of a
/// bidirectional search; the world does not mutate terrain while agents plan.
pub trait Environment: Sync {
    fn can_enter(&self, position: Position) -> bool;

    fn can_move_between(&self, from: Position, direction: Direction) -> bool;

    /// Extra pathing cost for stepping into `position`.
    fn tile_weight(&self, position: Position) -> Cost;

    fn valid_neighbor_directions(&self, position: Position) -> DirectionSet {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.can_move_between(position, *direction))
            .collect()
    }

    fn is_minable(&self, position: Position) -> bool;

    fn item_at(&self, position: Position) -> Option<ItemKind>;
}
