use crate::direction::{Direction, CARDINALS};
use crate::error::LevelError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Marker stored in each grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellMarker {
    Wall,
    Open,
    /// Walkable cell that seeds ghost and collectible placement
    Spawn,
}

impl CellMarker {
    /// Parse a single level character
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' | '1' => Some(CellMarker::Wall),
            '.' | '0' | ' ' => Some(CellMarker::Open),
            'W' | 'S' => Some(CellMarker::Spawn),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            CellMarker::Wall => '#',
            CellMarker::Open => '.',
            CellMarker::Spawn => 'W',
        }
    }
}

/// A cell coordinate on the grid (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        CellCoord { x, y }
    }

    /// Manhattan distance to another cell
    pub fn manhattan(&self, other: &CellCoord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The adjacent cell in the given direction (self for `Direction::None`)
    pub fn offset(&self, dir: Direction) -> CellCoord {
        let (dx, dy) = dir.delta();
        CellCoord::new(self.x + dx, self.y + dy)
    }
}

/// Static maze for one level.
///
/// Cells are stored row-major. Wall coordinates are cached at load so the
/// collision test can walk them directly.
#[derive(Clone, Debug)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    pub cell_size: f32,
    cells: Vec<CellMarker>,
    walls: Vec<CellCoord>,
}

impl Grid {
    /// Build a grid from a rectangular matrix of markers
    pub fn load(markers: Vec<Vec<CellMarker>>, cell_size: f32) -> Result<Self, LevelError> {
        let expected = markers.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(LevelError::Empty);
        }

        let rows = markers.len() as i32;
        let cols = expected as i32;
        let mut cells = Vec::with_capacity(markers.len() * expected);
        let mut walls = Vec::new();

        for (y, row) in markers.into_iter().enumerate() {
            if row.len() != expected {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected,
                    found: row.len(),
                });
            }
            for (x, marker) in row.into_iter().enumerate() {
                if marker == CellMarker::Wall {
                    walls.push(CellCoord::new(x as i32, y as i32));
                }
                cells.push(marker);
            }
        }

        Ok(Grid {
            rows,
            cols,
            cell_size,
            cells,
            walls,
        })
    }

    /// Parse a text level.
    ///
    /// `#`/`1` is a wall, `.`/`0`/space is open and `W`/`S` is a spawn
    /// marker. Empty lines are ignored; a line of spaces is a row of open
    /// cells.
    pub fn parse(text: &str, cell_size: f32) -> Result<Self, LevelError> {
        let mut markers = Vec::new();
        for (row, line) in text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .enumerate()
        {
            let parsed = line
                .chars()
                .enumerate()
                .map(|(col, ch)| {
                    CellMarker::from_char(ch).ok_or(LevelError::UnknownMarker {
                        marker: ch,
                        row,
                        col,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            markers.push(parsed);
        }
        Self::load(markers, cell_size)
    }

    /// Read and parse a text level from disk
    pub fn from_file(path: impl AsRef<Path>, cell_size: f32) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents, cell_size)
    }

    /// Render the grid back into the text level format
    pub fn to_layout_string(&self) -> String {
        let mut result = String::new();
        for y in 0..self.rows {
            for x in 0..self.cols {
                result.push(self.cells[self.get_id(x, y) as usize].to_char());
            }
            result.push('\n');
        }
        result
    }

    /// Convert (x, y) coordinates to a cell ID
    pub fn get_id(&self, x: i32, y: i32) -> i32 {
        x + y * self.cols
    }

    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x >= 0 && cell.x < self.cols && cell.y >= 0 && cell.y < self.rows
    }

    /// Marker at a cell; out of bounds reads as a wall
    pub fn marker(&self, cell: CellCoord) -> CellMarker {
        if !self.in_bounds(cell) {
            return CellMarker::Wall;
        }
        self.cells[self.get_id(cell.x, cell.y) as usize]
    }

    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.marker(cell) != CellMarker::Wall
    }

    /// Walkable orthogonal neighbours, always in up, down, left, right order
    pub fn neighbors(&self, cell: CellCoord) -> Vec<CellCoord> {
        CARDINALS
            .iter()
            .map(|&dir| cell.offset(dir))
            .filter(|&n| self.is_walkable(n))
            .collect()
    }

    pub fn walls(&self) -> &[CellCoord] {
        &self.walls
    }

    /// Does a box of half-extent `radius` centred at (x, y) overlap any wall cell
    pub fn collides_with_wall(&self, x: f32, y: f32, radius: f32) -> bool {
        self.walls.iter().any(|wall| {
            let left = wall.x as f32 * self.cell_size;
            let right = left + self.cell_size;
            let top = wall.y as f32 * self.cell_size;
            let bottom = top + self.cell_size;

            x + radius > left && x - radius < right && y + radius > top && y - radius < bottom
        })
    }

    /// World position of a cell's centre
    pub fn cell_center(&self, cell: CellCoord) -> (f32, f32) {
        (
            cell.x as f32 * self.cell_size + self.cell_size / 2.0,
            cell.y as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Cell containing a world position (may be out of bounds)
    pub fn world_to_cell(&self, x: f32, y: f32) -> CellCoord {
        CellCoord::new(
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn world_width(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    pub fn world_height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Spawn markers in row-major order
    pub fn spawn_cells(&self) -> Vec<CellCoord> {
        self.cells_matching(CellMarker::Spawn)
    }

    /// First open cell in row-major order; the player's start
    pub fn first_open_cell(&self) -> Option<CellCoord> {
        self.cells_matching(CellMarker::Open).into_iter().next()
    }

    fn cells_matching(&self, wanted: CellMarker) -> Vec<CellCoord> {
        let mut found = Vec::new();
        for y in 0..self.rows {
            for x in 0..self.cols {
                if self.cells[self.get_id(x, y) as usize] == wanted {
                    found.push(CellCoord::new(x, y));
                }
            }
        }
        found
    }
}
