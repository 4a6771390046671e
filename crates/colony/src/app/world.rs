use engine::{
    Action, Environment, ItemKind, Job, Position, Positioning, TileGrid, Worker, WorkerId,
};

use super::map::ColonyMap;

/// Cells around the stockpile marker that count as stockpile storage.
pub const STOCKPILE_AREA: Positioning = Positioning::Planar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub action: Action,
    pub remaining_ticks: u32,
}

impl InFlight {
    pub fn new(action: Action) -> Self {
        let remaining_ticks = match action {
            Action::Wait { ticks } => ticks.max(1),
            _ => 1,
        };
        Self {
            action,
            remaining_ticks,
        }
    }
}

pub struct Settler {
    pub id: WorkerId,
    pub location: Position,
    pub carrying: Option<ItemKind>,
    pub job: Option<Box<dyn Job>>,
    pub in_flight: Option<InFlight>,
}

impl Settler {
    pub fn view(&self) -> SettlerView {
        SettlerView {
            id: self.id,
            location: self.location,
            carrying: self.carrying,
            outstanding: self.in_flight.is_some(),
        }
    }
}

/// Copy of a settler's observable state, handed to jobs while the settler's
/// own job is checked out for driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlerView {
    pub id: WorkerId,
    pub location: Position,
    pub carrying: Option<ItemKind>,
    pub outstanding: bool,
}

impl Worker for SettlerView {
    fn id(&self) -> WorkerId {
        self.id
    }

    fn location(&self) -> Position {
        self.location
    }

    fn has_outstanding_action(&self) -> bool {
        self.outstanding
    }

    fn carrying(&self) -> Option<ItemKind> {
        self.carrying
    }
}

pub struct ColonyWorld {
    pub grid: TileGrid,
    pub settlers: Vec<Settler>,
    pub stockpile: Option<Position>,
    pub designations: Vec<Position>,
    pub tick: u64,
}

impl ColonyWorld {
    pub fn from_map(map: ColonyMap, settler_count: u32) -> Self {
        let fallback = map.grid.positions().find(|cell| map.grid.can_enter(*cell));
        let settlers = (0..settler_count)
            .filter_map(|index| {
                let location = if map.spawns.is_empty() {
                    fallback?
                } else {
                    map.spawns[index as usize % map.spawns.len()]
                };
                Some(Settler {
                    id: WorkerId(index + 1),
                    location,
                    carrying: None,
                    job: None,
                    in_flight: None,
                })
            })
            .collect();
        Self {
            grid: map.grid,
            settlers,
            stockpile: map.stockpile,
            designations: map.designations,
            tick: 0,
        }
    }

    pub fn in_stockpile(&self, position: Position) -> bool {
        self.stockpile
            .is_some_and(|stockpile| STOCKPILE_AREA.is_satisfied(position, stockpile))
    }

    /// Items lying outside the stockpile, in position order.
    pub fn loose_items(&self) -> Vec<(Position, ItemKind)> {
        let mut items = self
            .grid
            .items()
            .filter(|(position, _)| !self.in_stockpile(*position))
            .collect::<Vec<_>>();
        items.sort_by_key(|(position, _)| *position);
        items
    }

    pub fn stockpiled_count(&self) -> usize {
        self.grid
            .items()
            .filter(|(position, _)| self.in_stockpile(*position))
            .count()
    }

    /// Stockpile cells that can take another item.
    pub fn free_stockpile_cells(&self) -> Vec<Position> {
        let Some(stockpile) = self.stockpile else {
            return Vec::new();
        };
        STOCKPILE_AREA
            .cells_around(stockpile)
            .filter(|cell| self.grid.can_enter(*cell) && self.grid.item_at(*cell).is_none())
            .collect()
    }

    pub fn pending_designations(&self) -> impl Iterator<Item = Position> + '_ {
        self.designations
            .iter()
            .copied()
            .filter(|position| self.grid.is_minable(*position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::map::{parse_map, STONE};

    #[test]
    fn settlers_cycle_through_spawn_points() {
        let map = parse_map("s..\n..s\n").expect("map");
        let world = ColonyWorld::from_map(map, 3);
        let locations = world
            .settlers
            .iter()
            .map(|settler| settler.location)
            .collect::<Vec<_>>();
        assert_eq!(
            locations,
            vec![
                Position::planar(0, 0),
                Position::planar(2, 1),
                Position::planar(0, 0)
            ]
        );
        assert_eq!(world.settlers[2].id, WorkerId(3));
    }

    #[test]
    fn maps_without_spawns_use_the_first_walkable_cell() {
        let map = parse_map("#..\n...\n").expect("map");
        let world = ColonyWorld::from_map(map, 1);
        assert_eq!(world.settlers[0].location, Position::planar(1, 0));
    }

    #[test]
    fn stockpile_area_splits_items() {
        let map = parse_map("*...\n.P..\n...*\n").expect("map");
        let world = ColonyWorld::from_map(map, 0);
        assert_eq!(world.stockpiled_count(), 1);
        assert_eq!(world.loose_items(), vec![(Position::planar(3, 2), STONE)]);
        assert_eq!(world.free_stockpile_cells().len(), 8);
    }

    #[test]
    fn wait_actions_span_their_tick_count() {
        assert_eq!(InFlight::new(Action::Wait { ticks: 4 }).remaining_ticks, 4);
        assert_eq!(InFlight::new(Action::Wait { ticks: 0 }).remaining_ticks, 1);
        let work = Action::Work {
            target: Position::planar(1, 1),
        };
        assert_eq!(InFlight::new(work).remaining_ticks, 1);
    }
}
