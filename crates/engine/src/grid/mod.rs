mod position;
mod tile_grid;

pub use position::{
    octile_distance, Cost, Direction, DirectionSet, Position, Positioning, DIAGONAL_COST,
    STRAIGHT_COST, VERTICAL_COST,
};
pub use tile_grid::{GridError, StrikeOutcome, TileGrid, TileKind};
