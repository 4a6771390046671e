use serde::{Deserialize, Serialize};

use crate::environment::ItemFilter;
use crate::grid::{Direction, Position};

/// A primitive action handed to the world for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move { direction: Direction },
    /// One strike against a tile next to the worker.
    Work { target: Position },
    PickUp { at: Position, filter: ItemFilter },
    Drop { at: Position },
    Wait { ticks: u32 },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Work { .. } => "work",
            Self::PickUp { .. } => "pick_up",
            Self::Drop { .. } => "drop",
            Self::Wait { .. } => "wait",
        }
    }
}
