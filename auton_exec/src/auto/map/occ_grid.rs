//! # Occupancy grid
//!
//! A boolean grid over the field, `true` marking a cell blocked by an obstacle. Field positions
//! map onto cells linearly from the grid's [`FieldBounds`], the first cell of each axis sitting on
//! the lower bound and the last on the upper bound.
//!
//! The text format has one line per row of the grid, starting at row 0 (the lower Y bound), with
//! `0` for a free cell and `1` for an occupied one. Whitespace within a line is ignored so rows
//! may be spaced out for readability.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fs, path::Path};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use util::maths::lin_map;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Index of a cell in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

/// The area of the field covered by the grid.
///
/// Units: inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Static obstacle map of the field.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,

    /// Row major cells, `true` is occupied
    cells: Vec<bool>,

    bounds: FieldBounds,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Could not read the map file: {0}")]
    FileLoadError(std::io::Error),

    #[error("The map contains no cells")]
    Empty,

    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}, column {col}: '{found}' is not a valid cell, expected '0' or '1'")]
    InvalidCell { row: usize, col: usize, found: char },

    #[error("The field bounds are empty or inverted: {0:?}")]
    InvalidBounds(FieldBounds),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl FieldBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn is_valid(&self) -> bool {
        self.x_max > self.x_min && self.y_max > self.y_min
    }
}

impl Default for FieldBounds {
    /// A 12 ft square field with the origin in the corner
    fn default() -> Self {
        Self::new(0.0, 144.0, 0.0, 144.0)
    }
}

impl OccupancyGrid {
    /// Create a grid with every cell free.
    pub fn new(width: usize, height: usize, bounds: FieldBounds) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty);
        }
        if !bounds.is_valid() {
            return Err(MapError::InvalidBounds(bounds));
        }

        Ok(Self {
            width,
            height,
            cells: vec![false; width * height],
            bounds,
        })
    }

    /// Parse a grid from text, see the module documentation for the format.
    pub fn from_str_with_bounds(text: &str, bounds: FieldBounds) -> Result<Self, MapError> {
        let mut rows: Vec<Vec<bool>> = Vec::new();

        for line in text.lines() {
            let mut row = Vec::new();

            for (col, c) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                match c {
                    '0' => row.push(false),
                    '1' => row.push(true),
                    found => {
                        return Err(MapError::InvalidCell {
                            row: rows.len(),
                            col,
                            found,
                        })
                    }
                }
            }

            // Blank lines don't count as rows
            if row.is_empty() {
                continue;
            }

            if let Some(first) = rows.first() {
                if row.len() != first.len() {
                    return Err(MapError::RaggedRow {
                        row: rows.len(),
                        expected: first.len(),
                        found: row.len(),
                    });
                }
            }

            rows.push(row);
        }

        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut grid = Self::new(width, rows.len(), bounds)?;
        grid.cells = rows.into_iter().flatten().collect();

        Ok(grid)
    }

    /// Load a grid from a text file.
    pub fn load<P: AsRef<Path>>(path: P, bounds: FieldBounds) -> Result<Self, MapError> {
        let text = fs::read_to_string(path).map_err(MapError::FileLoadError)?;
        Self::from_str_with_bounds(&text, bounds)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> &FieldBounds {
        &self.bounds
    }

    /// Returns true if the cell is occupied. Cells outside the grid count as occupied.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        match self.flat_index(cell) {
            Some(i) => self.cells[i],
            None => true,
        }
    }

    /// Mark a cell occupied or free. Cells outside the grid are ignored.
    pub fn set_occupied(&mut self, cell: Cell, occupied: bool) {
        if let Some(i) = self.flat_index(cell) {
            self.cells[i] = occupied;
        }
    }

    /// Get the cell at the given signed offsets, or `None` if they're outside the grid.
    pub fn cell_at(&self, x: i64, y: i64) -> Option<Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some(Cell::new(x as usize, y as usize))
        }
    }

    /// Snap a field position to the nearest cell, clamping positions beyond the bounds onto the
    /// edge of the grid. Each axis is rounded and clamped independently.
    pub fn cell_of(&self, position: &Vector2<f64>) -> Cell {
        Cell::new(
            snap_axis(
                (self.bounds.x_min, self.bounds.x_max),
                self.width,
                position[0],
            ),
            snap_axis(
                (self.bounds.y_min, self.bounds.y_max),
                self.height,
                position[1],
            ),
        )
    }

    /// Field position of the given cell.
    pub fn position_of(&self, cell: Cell) -> Vector2<f64> {
        Vector2::new(
            cell_to_axis((self.bounds.x_min, self.bounds.x_max), self.width, cell.x),
            cell_to_axis((self.bounds.y_min, self.bounds.y_max), self.height, cell.y),
        )
    }

    fn flat_index(&self, cell: Cell) -> Option<usize> {
        if cell.x < self.width && cell.y < self.height {
            Some(cell.y * self.width + cell.x)
        } else {
            None
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Map a field coordinate onto a cell index along one axis.
fn snap_axis(range: (f64, f64), num_cells: usize, value: f64) -> usize {
    if num_cells <= 1 || value.is_nan() {
        return 0;
    }

    let max_index = (num_cells - 1) as f64;
    lin_map(range, (0.0, max_index), value)
        .round()
        .max(0.0)
        .min(max_index) as usize
}

/// Map a cell index back onto a field coordinate along one axis.
fn cell_to_axis(range: (f64, f64), num_cells: usize, index: usize) -> f64 {
    if num_cells <= 1 {
        return range.0;
    }

    lin_map((0.0, (num_cells - 1) as f64), range, index as f64)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    const MAP: &str = "
        0 0 0 0
        0 1 1 0
        0 0 0 0
    ";

    #[test]
    fn test_parse() {
        let grid = OccupancyGrid::from_str_with_bounds(MAP, FieldBounds::default()).unwrap();

        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(!grid.is_occupied(Cell::new(0, 0)));
        assert!(grid.is_occupied(Cell::new(1, 1)));
        assert!(grid.is_occupied(Cell::new(2, 1)));
        assert!(!grid.is_occupied(Cell::new(3, 1)));

        // Off the grid is never free
        assert!(grid.is_occupied(Cell::new(4, 0)));
        assert!(grid.is_occupied(Cell::new(0, 3)));
    }

    #[test]
    fn test_parse_errors() {
        let bounds = FieldBounds::default();

        assert!(matches!(
            OccupancyGrid::from_str_with_bounds("000\n00", bounds),
            Err(MapError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            OccupancyGrid::from_str_with_bounds("010\n0x0", bounds),
            Err(MapError::InvalidCell {
                row: 1,
                col: 1,
                found: 'x'
            })
        ));
        assert!(matches!(
            OccupancyGrid::from_str_with_bounds("\n\n", bounds),
            Err(MapError::Empty)
        ));
        assert!(matches!(
            OccupancyGrid::new(2, 2, FieldBounds::new(0.0, 0.0, 0.0, 1.0)),
            Err(MapError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_snapping() {
        // 13 cells over 144 in gives a cell every 12 in along X, 7 cells every 24 in along Y
        let grid = OccupancyGrid::new(13, 7, FieldBounds::default()).unwrap();

        assert_eq!(grid.cell_of(&Vector2::new(0.0, 0.0)), Cell::new(0, 0));
        assert_eq!(grid.cell_of(&Vector2::new(17.0, 37.0)), Cell::new(1, 2));
        assert_eq!(grid.cell_of(&Vector2::new(144.0, 144.0)), Cell::new(12, 6));

        // Each axis clamps against its own size
        assert_eq!(grid.cell_of(&Vector2::new(500.0, -20.0)), Cell::new(12, 0));
        assert_eq!(grid.cell_of(&Vector2::new(-20.0, 500.0)), Cell::new(0, 6));

        let pos = grid.position_of(Cell::new(3, 2));
        assert_relative_eq!(pos[0], 36.0);
        assert_relative_eq!(pos[1], 48.0);
    }
}
