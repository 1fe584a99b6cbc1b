use crate::error::ValidationError;
use crate::grid::{Cell, GridModel};
use crate::obstacle::{MultiCellObstacle, ObstacleKind};
use crate::occupancy::{check_region, is_obstacle, Region};
use serde::{Deserialize, Serialize};

/// A ready-made warehouse layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub start: Cell,
    pub end: Cell,
    /// Defaults to the start point
    #[serde(default)]
    pub robot: Option<Cell>,
    #[serde(default)]
    pub obstacles: Vec<MultiCellObstacle>,
}

impl Preset {
    pub fn robot_position(&self) -> Cell {
        self.robot.unwrap_or(self.start)
    }

    /// Every cell covered by the preset's obstacles, without duplicates, in placement order
    pub fn covered_cells(&self) -> Vec<Cell> {
        let mut seen = std::collections::HashSet::new();
        self.obstacles
            .iter()
            .flat_map(|o| o.cells())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Check the layout against the same rules interactive editing enforces.
    ///
    /// Dimensions must lie in `min_size..=max_size`, start and end must be
    /// distinct in-bounds cells, and every footprint must fit the grid without
    /// touching start, end or an earlier footprint.
    pub fn validate(&self, min_size: i32, max_size: i32) -> Result<(), ValidationError> {
        let sizes = min_size..=max_size;
        if !sizes.contains(&self.width) || !sizes.contains(&self.height) {
            return Err(ValidationError::InvalidDimensions {
                width: self.width,
                height: self.height,
                min: min_size,
                max: max_size,
            });
        }

        let mut scratch = GridModel::new(self.width, self.height);
        for cell in [self.start, self.end, self.robot_position()] {
            if !scratch.in_bounds(cell) {
                return Err(ValidationError::OutOfBounds(cell));
            }
        }
        if self.start == self.end {
            return Err(ValidationError::EndEqualsStart(self.end));
        }

        scratch.set_start(Some(self.start));
        scratch.set_end(Some(self.end));
        for obstacle in &self.obstacles {
            let region = Region::Rect {
                origin: obstacle.origin,
                width: obstacle.width,
                height: obstacle.height,
            };
            if check_region(&scratch, region).is_err() {
                return Err(ValidationError::FootprintBlocked {
                    origin: obstacle.origin,
                    width: obstacle.width,
                    height: obstacle.height,
                });
            }
            scratch.add_multi_cell_obstacle(*obstacle);
        }

        let robot = self.robot_position();
        if is_obstacle(&scratch, robot) {
            return Err(ValidationError::RobotOnObstacle(robot));
        }
        Ok(())
    }
}

fn obstacle(x: i32, y: i32, width: i32, height: i32, kind: ObstacleKind) -> MultiCellObstacle {
    MultiCellObstacle::new(Cell::new(x, y), width, height, kind)
}

/// The built-in presets
pub fn builtin_presets() -> Vec<Preset> {
    use ObstacleKind::*;

    vec![
        Preset {
            name: "Amazon Fulfilment Center 1".to_string(),
            width: 30,
            height: 20,
            start: Cell::new(1, 1),
            end: Cell::new(28, 18),
            robot: Some(Cell::new(1, 1)),
            obstacles: vec![
                obstacle(0, 5, 1, 10, Wall),
                obstacle(29, 5, 1, 10, Wall),
                obstacle(5, 0, 10, 1, Wall),
                obstacle(5, 19, 10, 1, Wall),
                obstacle(5, 2, 2, 5, Shelf),
                obstacle(8, 2, 2, 5, Shelf),
                obstacle(12, 8, 3, 3, Box),
                obstacle(16, 8, 1, 1, Human),
                obstacle(18, 12, 1, 1, Box),
                obstacle(22, 5, 1, 4, Shelf),
                obstacle(25, 15, 3, 1, Box),
            ],
        },
        Preset {
            name: "Nvidia GPU Farm".to_string(),
            width: 25,
            height: 25,
            start: Cell::new(0, 0),
            end: Cell::new(24, 24),
            robot: Some(Cell::new(0, 0)),
            obstacles: vec![
                obstacle(5, 5, 2, 7, Restricted),
                obstacle(5, 15, 2, 7, Restricted),
                obstacle(10, 5, 2, 7, Restricted),
                obstacle(10, 15, 2, 7, Restricted),
                obstacle(15, 8, 1, 1, Human),
                obstacle(18, 18, 3, 3, Box),
                obstacle(2, 10, 1, 1, Box),
                obstacle(20, 2, 4, 1, Wall),
            ],
        },
        Preset {
            name: "Tesla Gigafactory 2".to_string(),
            width: 40,
            height: 30,
            start: Cell::new(2, 2),
            end: Cell::new(38, 28),
            robot: Some(Cell::new(2, 2)),
            obstacles: vec![
                obstacle(5, 5, 1, 20, Wall),
                obstacle(15, 10, 10, 2, Shelf),
                obstacle(15, 15, 10, 2, Shelf),
                obstacle(30, 5, 5, 5, Restricted),
                obstacle(36, 8, 1, 1, Human),
                obstacle(8, 25, 3, 3, Box),
                obstacle(25, 25, 1, 1, Human),
                obstacle(20, 3, 1, 1, Box),
            ],
        },
    ]
}
