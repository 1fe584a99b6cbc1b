use crate::obstacle::MultiCellObstacle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A grid cell addressed by column `x` and row `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell { x, y }
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Client-side model of the warehouse floor.
///
/// Holds dimensions, the cached single-cell obstacle set, placed multi-cell
/// obstacles, start/end points, the displayed route and the robot position.
/// A grid with zero dimensions is uninitialized.
#[derive(Debug, Clone, Default)]
pub struct GridModel {
    width: i32,
    height: i32,
    obstacles: HashSet<Cell>,
    multi_cell: Vec<MultiCellObstacle>,
    start: Option<Cell>,
    end: Option<Cell>,
    route: Vec<Cell>,
    robot: Option<Cell>,
    /// Revision number - incremented whenever the model changes
    revision: u64,
}

impl GridModel {
    /// Create an initialized, empty grid
    pub fn new(width: i32, height: i32) -> Self {
        let mut model = GridModel::default();
        model.set_dimensions(width, height);
        model
    }

    /// Create a grid with specific blocked cells; out-of-bounds cells are dropped
    pub fn with_blocked(width: i32, height: i32, blocked: &[Cell]) -> Self {
        let mut model = Self::new(width, height);
        model.set_obstacle_set(blocked.iter().copied());
        model
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_initialized(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn obstacles(&self) -> &HashSet<Cell> {
        &self.obstacles
    }

    /// Single-cell obstacles in row-major order
    pub fn sorted_obstacles(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.obstacles.iter().copied().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    pub fn has_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    pub fn multi_cell_obstacles(&self) -> &[MultiCellObstacle] {
        &self.multi_cell
    }

    /// The multi-cell obstacle covering `cell`, if any
    pub fn multi_cell_at(&self, cell: Cell) -> Option<&MultiCellObstacle> {
        self.multi_cell.iter().find(|o| o.covers(cell))
    }

    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    pub fn end(&self) -> Option<Cell> {
        self.end
    }

    pub fn route(&self) -> &[Cell] {
        &self.route
    }

    pub fn robot_position(&self) -> Option<Cell> {
        self.robot
    }

    /// Get current model revision number
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the dimensions. Clears every occupant in the same step.
    pub fn set_dimensions(&mut self, width: i32, height: i32) {
        self.width = width.max(0);
        self.height = height.max(0);
        self.clear_occupants();
        self.revision += 1;
    }

    /// Replace the cached single-cell obstacle set wholesale
    pub fn set_obstacle_set<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        let (width, height) = (self.width, self.height);
        self.obstacles = cells
            .into_iter()
            .filter(|c| c.x >= 0 && c.x < width && c.y >= 0 && c.y < height)
            .collect();
        self.revision += 1;
    }

    /// Append a multi-cell obstacle. Placed obstacles are never moved.
    pub fn add_multi_cell_obstacle(&mut self, obstacle: MultiCellObstacle) {
        self.multi_cell.push(obstacle);
        self.revision += 1;
    }

    pub fn set_start(&mut self, cell: Option<Cell>) {
        self.start = cell;
        self.revision += 1;
    }

    pub fn set_end(&mut self, cell: Option<Cell>) {
        self.end = cell;
        self.revision += 1;
    }

    pub fn set_robot_position(&mut self, cell: Option<Cell>) {
        if self.robot != cell {
            self.robot = cell;
            self.revision += 1;
        }
    }

    pub fn set_route(&mut self, route: Vec<Cell>) {
        self.route = route;
        self.revision += 1;
    }

    /// Clear every occupant but keep the dimensions
    pub fn reset(&mut self) {
        self.clear_occupants();
        self.revision += 1;
    }

    fn clear_occupants(&mut self) {
        self.obstacles.clear();
        self.multi_cell.clear();
        self.start = None;
        self.end = None;
        self.route.clear();
        self.robot = None;
    }

    /// Render the layout as text, one row per line.
    ///
    /// `R` robot, `S` start, `E` end, `#` multi-cell obstacle, `X` single-cell
    /// obstacle, `*` route, `.` free.
    pub fn to_text(&self) -> String {
        let route: HashSet<Cell> = self.route.iter().copied().collect();
        let mut result = String::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                let symbol = if self.robot == Some(cell) {
                    'R'
                } else if self.start == Some(cell) {
                    'S'
                } else if self.end == Some(cell) {
                    'E'
                } else if self.multi_cell_at(cell).is_some() {
                    '#'
                } else if self.obstacles.contains(&cell) {
                    'X'
                } else if route.contains(&cell) {
                    '*'
                } else {
                    '.'
                };
                result.push(symbol);
            }
            result.push('\n');
        }

        result
    }
}
