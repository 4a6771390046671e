use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::environment::{Environment, ItemKind};

use super::{Cost, Direction, Position};

const MUD_EXTRA_WEIGHT: Cost = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Floor,
    Mud,
    Ladder,
    Rock { hardness: u8 },
    Wall,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Mud | Self::Ladder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    Damaged { remaining: u8 },
    Cleared,
    NotMinable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("grid dimensions must be non-zero, got {width}x{height}x{depth}")]
    EmptyGrid { width: u32, height: u32, depth: u32 },
}

/// In-memory layered terrain.
///
/// Tile (x, y, z) lives at index `(z * height + y) * width + x`. Cells outside
/// the bounds behave like walls.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    depth: u32,
    tiles: Vec<TileKind>,
    items: HashMap<Position, ItemKind>,
    allow_diagonals: bool,
}

impl TileGrid {
    pub fn new(
        width: u32,
        height: u32,
        depth: u32,
        tiles: Vec<TileKind>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(GridError::EmptyGrid {
                width,
                height,
                depth,
            });
        }
        let expected = width as usize * height as usize * depth as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(GridError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            depth,
            tiles,
            items: HashMap::new(),
            allow_diagonals: true,
        })
    }

    pub fn filled(width: u32, height: u32, depth: u32, kind: TileKind) -> Result<Self, GridError> {
        let count = width as usize * height as usize * depth as usize;
        Self::new(width, height, depth, vec![kind; count])
    }

    pub fn with_diagonals(mut self, allow_diagonals: bool) -> Self {
        self.allow_diagonals = allow_diagonals;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn index_of(&self, position: Position) -> Option<usize> {
        let x = u32::try_from(position.x).ok()?;
        let y = u32::try_from(position.y).ok()?;
        let z = u32::try_from(position.z).ok()?;
        if x >= self.width || y >= self.height || z >= self.depth {
            return None;
        }
        Some((z as usize * self.height as usize + y as usize) * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, position: Position) -> Option<TileKind> {
        self.index_of(position)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn set_tile(&mut self, position: Position, kind: TileKind) -> bool {
        let Some(index) = self.index_of(position) else {
            return false;
        };
        self.tiles[index] = kind;
        true
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.depth as i32).flat_map(move |z| {
            (0..self.height as i32)
                .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y, z)))
        })
    }

    /// One mining strike against a rock tile; a cleared rock becomes floor.
    pub fn strike(&mut self, position: Position) -> StrikeOutcome {
        let Some(index) = self.index_of(position) else {
            return StrikeOutcome::NotMinable;
        };
        match self.tiles[index] {
            TileKind::Rock { hardness } if hardness > 1 => {
                let remaining = hardness - 1;
                self.tiles[index] = TileKind::Rock {
                    hardness: remaining,
                };
                StrikeOutcome::Damaged { remaining }
            }
            TileKind::Rock { .. } => {
                self.tiles[index] = TileKind::Floor;
                StrikeOutcome::Cleared
            }
            _ => StrikeOutcome::NotMinable,
        }
    }

    pub fn place_item(&mut self, position: Position, item: ItemKind) -> bool {
        if !self.can_enter(position) || self.items.contains_key(&position) {
            return false;
        }
        self.items.insert(position, item);
        true
    }

    pub fn take_item(&mut self, position: Position) -> Option<ItemKind> {
        self.items.remove(&position)
    }

    pub fn items(&self) -> impl Iterator<Item = (Position, ItemKind)> + '_ {
        self.items.iter().map(|(position, item)| (*position, *item))
    }

    fn is_walkable(&self, position: Position) -> bool {
        self.tile_at(position).is_some_and(TileKind::is_walkable)
    }

    fn is_ladder(&self, position: Position) -> bool {
        matches!(self.tile_at(position), Some(TileKind::Ladder))
    }
}

impl Environment for TileGrid {
    fn can_enter(&self, position: Position) -> bool {
        self.is_walkable(position)
    }

    fn can_move_between(&self, from: Position, direction: Direction) -> bool {
        let to = from.step(direction);
        if !self.is_walkable(from) || !self.is_walkable(to) {
            return false;
        }
        if direction.is_vertical() {
            return self.is_ladder(from) && self.is_ladder(to);
        }
        if direction.is_diagonal() {
            if !self.allow_diagonals {
                return false;
            }
            // No corner cutting: both orthogonal cells must be open.
            let (dx, dy, _) = direction.offset();
            let side_a = Position::new(from.x + dx, from.y, from.z);
            let side_b = Position::new(from.x, from.y + dy, from.z);
            return self.is_walkable(side_a) && self.is_walkable(side_b);
        }
        true
    }

    fn tile_weight(&self, position: Position) -> Cost {
        match self.tile_at(position) {
            Some(TileKind::Mud) => MUD_EXTRA_WEIGHT,
            _ => 0,
        }
    }

    fn is_minable(&self, position: Position) -> bool {
        matches!(self.tile_at(position), Some(TileKind::Rock { .. }))
    }

    fn item_at(&self, position: Position) -> Option<ItemKind> {
        self.items.get(&position).copied()
    }
}
