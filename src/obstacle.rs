use crate::grid::Cell;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a placed obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    #[default]
    Crate,
    Shelf,
    Restricted,
    Wall,
    Human,
    Box,
}

impl ObstacleKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObstacleKind::Crate => "Crate",
            ObstacleKind::Shelf => "Shelf Unit",
            ObstacleKind::Restricted => "Restricted Zone",
            ObstacleKind::Wall => "Wall",
            ObstacleKind::Human => "Human",
            ObstacleKind::Box => "Box",
        }
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Axis-aligned obstacle covering `[origin.x, origin.x + width) x [origin.y, origin.y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiCellObstacle {
    pub origin: Cell,
    pub width: i32,
    pub height: i32,
    pub kind: ObstacleKind,
}

impl MultiCellObstacle {
    pub fn new(origin: Cell, width: i32, height: i32, kind: ObstacleKind) -> Self {
        MultiCellObstacle {
            origin,
            width,
            height,
            kind,
        }
    }

    pub fn covers(&self, cell: Cell) -> bool {
        cell.x >= self.origin.x
            && cell.x < self.origin.x + self.width
            && cell.y >= self.origin.y
            && cell.y < self.origin.y + self.height
    }

    /// Every covered cell, column by column
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity((self.width.max(0) * self.height.max(0)) as usize);
        for i in 0..self.width {
            for j in 0..self.height {
                cells.push(Cell::new(self.origin.x + i, self.origin.y + j));
            }
        }
        cells
    }
}

/// A named footprint size used when placing a multi-cell obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootprintTemplate {
    pub name: &'static str,
    pub width: i32,
    pub height: i32,
}

impl FootprintTemplate {
    pub const SMALL_SHELF: FootprintTemplate = FootprintTemplate { name: "small_shelf", width: 1, height: 3 };
    pub const LARGE_SHELF: FootprintTemplate = FootprintTemplate { name: "large_shelf", width: 2, height: 5 };
    pub const CRATE_STACK: FootprintTemplate = FootprintTemplate { name: "crate_stack", width: 3, height: 2 };
    pub const SMALL_CRATE: FootprintTemplate = FootprintTemplate { name: "small_crate", width: 1, height: 1 };
    pub const RESTRICTED_AREA: FootprintTemplate = FootprintTemplate { name: "restricted_area", width: 3, height: 3 };

    pub fn anchored(&self, origin: Cell, kind: ObstacleKind) -> MultiCellObstacle {
        MultiCellObstacle::new(origin, self.width, self.height, kind)
    }
}

/// Chooses a footprint for the active obstacle kind.
///
/// Shelves pick small/large and crates pick stack/single independently per
/// placement; restricted zones are always 3x3; anything else is 1x1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplatePolicy {
    /// Probability of the 1x3 shelf over the 2x5 one
    pub shelf_small_probability: f64,
    /// Probability of the 3x2 stack over a single crate
    pub crate_stack_probability: f64,
}

impl Default for TemplatePolicy {
    fn default() -> Self {
        TemplatePolicy {
            shelf_small_probability: 0.5,
            crate_stack_probability: 0.7,
        }
    }
}

impl TemplatePolicy {
    pub fn new(shelf_small_probability: f64, crate_stack_probability: f64) -> Self {
        TemplatePolicy {
            shelf_small_probability: clamp_probability(shelf_small_probability),
            crate_stack_probability: clamp_probability(crate_stack_probability),
        }
    }

    pub fn select<R: Rng + ?Sized>(&self, kind: ObstacleKind, rng: &mut R) -> FootprintTemplate {
        match kind {
            ObstacleKind::Shelf => {
                if rng.random_bool(clamp_probability(self.shelf_small_probability)) {
                    FootprintTemplate::SMALL_SHELF
                } else {
                    FootprintTemplate::LARGE_SHELF
                }
            }
            ObstacleKind::Crate => {
                if rng.random_bool(clamp_probability(self.crate_stack_probability)) {
                    FootprintTemplate::CRATE_STACK
                } else {
                    FootprintTemplate::SMALL_CRATE
                }
            }
            ObstacleKind::Restricted => FootprintTemplate::RESTRICTED_AREA,
            _ => FootprintTemplate::SMALL_CRATE,
        }
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
