use engine::{GridError, ItemKind, Position, TileGrid, TileKind};
use thiserror::Error;

pub const STONE: ItemKind = ItemKind(1);
const LEVEL_SEPARATOR: &str = "---";

/// Terrain plus the map's markers: settler spawns, loose items, the
/// stockpile and the rock designated for mining.
#[derive(Debug, Clone)]
pub struct ColonyMap {
    pub grid: TileGrid,
    pub spawns: Vec<Position>,
    pub stockpile: Option<Position>,
    pub designations: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map has no tiles")]
    Empty,
    #[error("line {line}: expected {expected} columns, found {actual}")]
    RaggedRow {
        line: usize,
        expected: usize,
        actual: usize,
    },
    #[error("level {level} has {actual} rows, expected {expected}")]
    LevelHeight {
        level: usize,
        expected: usize,
        actual: usize,
    },
    #[error("line {line}, column {column}: unknown glyph '{glyph}'")]
    UnknownGlyph {
        line: usize,
        column: usize,
        glyph: char,
    },
    #[error("more than one stockpile marker")]
    DuplicateStockpile,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Parses an ASCII map. Each text row is one y, levels are separated by `---`.
///
/// `.` floor, `,` mud, `H` ladder, `#` wall, `1`-`9` rock of that hardness
/// (designated for mining), `s` settler spawn, `*` stone, `P` stockpile.
pub fn parse_map(source: &str) -> Result<ColonyMap, MapError> {
    let mut levels: Vec<Vec<(usize, &str)>> = vec![Vec::new()];
    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim_end();
        if line.trim() == LEVEL_SEPARATOR {
            levels.push(Vec::new());
        } else if !line.is_empty() {
            if let Some(level) = levels.last_mut() {
                level.push((index + 1, line));
            }
        }
    }
    levels.retain(|rows| !rows.is_empty());

    let Some(first_level) = levels.first() else {
        return Err(MapError::Empty);
    };
    let height = first_level.len();
    let width = first_level
        .first()
        .map(|(_, row)| row.chars().count())
        .unwrap_or(0);

    let mut tiles = Vec::with_capacity(width * height * levels.len());
    let mut spawns = Vec::new();
    let mut items = Vec::new();
    let mut stockpile = None;
    let mut designations = Vec::new();

    for (z, rows) in levels.iter().enumerate() {
        if rows.len() != height {
            return Err(MapError::LevelHeight {
                level: z,
                expected: height,
                actual: rows.len(),
            });
        }
        for (y, (line, row)) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(MapError::RaggedRow {
                    line: *line,
                    expected: width,
                    actual,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let position = Position::new(x as i32, y as i32, z as i32);
                let tile = match glyph {
                    '.' => TileKind::Floor,
                    ',' => TileKind::Mud,
                    'H' => TileKind::Ladder,
                    '#' => TileKind::Wall,
                    's' => {
                        spawns.push(position);
                        TileKind::Floor
                    }
                    '*' => {
                        items.push(position);
                        TileKind::Floor
                    }
                    'P' => {
                        if stockpile.replace(position).is_some() {
                            return Err(MapError::DuplicateStockpile);
                        }
                        TileKind::Floor
                    }
                    '1'..='9' => {
                        designations.push(position);
                        TileKind::Rock {
                            hardness: glyph as u8 - b'0',
                        }
                    }
                    _ => {
                        return Err(MapError::UnknownGlyph {
                            line: *line,
                            column: x + 1,
                            glyph,
                        })
                    }
                };
                tiles.push(tile);
            }
        }
    }

    let mut grid = TileGrid::new(width as u32, height as u32, levels.len() as u32, tiles)?;
    for position in items {
        grid.place_item(position, STONE);
    }
    Ok(ColonyMap {
        grid,
        spawns,
        stockpile,
        designations,
    })
}
