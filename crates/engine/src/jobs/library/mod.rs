//! Concrete jobs built on `Assignment` and `AssignmentGroup`.

mod handling;
mod haul;
mod mine;
mod mine_tile;
mod move_to;
mod patrol;
mod sequence;
mod wait;

pub use handling::{DropItem, DropItemJob, PickUpItem, PickUpItemJob};
pub use haul::{Haul, HaulGroup};
pub use mine::{Mine, MineJob};
pub use mine_tile::{MineTile, MineTileGroup};
pub use move_to::{MoveTo, MoveToJob};
pub use patrol::{Patrol, PatrolGroup};
pub use sequence::{Sequence, SequenceGroup};
pub use wait::{Wait, WaitJob};
