//! Placement legality checks against the current grid model.

use crate::grid::{Cell, GridModel};

/// A candidate area: a single cell or a rectangle anchored at its top-left cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Cell(Cell),
    Rect { origin: Cell, width: i32, height: i32 },
}

impl Region {
    pub fn rect(x: i32, y: i32, width: i32, height: i32) -> Self {
        Region::Rect {
            origin: Cell::new(x, y),
            width,
            height,
        }
    }

    /// Every cell of the region; empty for a degenerate rectangle
    pub fn cells(&self) -> Vec<Cell> {
        match *self {
            Region::Cell(cell) => vec![cell],
            Region::Rect { origin, width, height } => {
                let mut cells = Vec::new();
                for i in 0..width.max(0) {
                    for j in 0..height.max(0) {
                        cells.push(Cell::new(origin.x + i, origin.y + j));
                    }
                }
                cells
            }
        }
    }
}

impl From<Cell> for Region {
    fn from(cell: Cell) -> Self {
        Region::Cell(cell)
    }
}

/// Why a cell cannot be occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    OutOfBounds(Cell),
    Obstacle(Cell),
    MultiCell(Cell),
    Start(Cell),
    End(Cell),
}

/// True if the cell is blocked by a single-cell or multi-cell obstacle
pub fn is_obstacle(model: &GridModel, cell: Cell) -> bool {
    model.has_obstacle(cell) || model.multi_cell_at(cell).is_some()
}

/// Check one cell against bounds, obstacles, footprints and start/end
pub fn check_cell(model: &GridModel, cell: Cell) -> Result<(), Conflict> {
    if !model.in_bounds(cell) {
        return Err(Conflict::OutOfBounds(cell));
    }
    if model.has_obstacle(cell) {
        return Err(Conflict::Obstacle(cell));
    }
    if model.multi_cell_at(cell).is_some() {
        return Err(Conflict::MultiCell(cell));
    }
    if model.start() == Some(cell) {
        return Err(Conflict::Start(cell));
    }
    if model.end() == Some(cell) {
        return Err(Conflict::End(cell));
    }
    Ok(())
}

/// Check every cell of the region and collect all conflicts.
///
/// An empty region has no cells to occupy and is rejected as out of bounds at its anchor.
pub fn check_region(model: &GridModel, region: Region) -> Result<(), Vec<Conflict>> {
    let cells = region.cells();
    if cells.is_empty() {
        let anchor = match region {
            Region::Cell(cell) => cell,
            Region::Rect { origin, .. } => origin,
        };
        return Err(vec![Conflict::OutOfBounds(anchor)]);
    }

    let conflicts: Vec<Conflict> = cells
        .into_iter()
        .filter_map(|cell| check_cell(model, cell).err())
        .collect();

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(conflicts)
    }
}

/// True only if every cell in the region may be occupied
pub fn can_place(region: impl Into<Region>, model: &GridModel) -> bool {
    check_region(model, region.into()).is_ok()
}
