use serde::{Deserialize, Serialize};

use super::Neighbors;
use crate::*;

/// Square cells in `height` rows of `width` columns, stored row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangular {
    width: Coord,
    height: Coord,
}

impl Rectangular {
    /// Full Moore neighbourhood as `(d_row, d_col)`.
    pub const NEIGHBOR_OFFSETS: [(Coord, Coord); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    pub(crate) const fn new(width: Coord, height: Coord) -> Self {
        Self { width, height }
    }

    pub const fn width(&self) -> Coord {
        self.width
    }

    pub const fn height(&self) -> Coord {
        self.height
    }

    pub(super) fn wide_cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn index_to_position(&self, index: usize) -> Position {
        let width = self.width as usize;
        ((index / width) as Coord, (index % width) as Coord)
    }

    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        let (row, col) = position;
        self.is_valid(position)
            .then(|| row as usize * self.width as usize + col as usize)
    }

    pub const fn is_valid(&self, (row, col): Position) -> bool {
        row >= 0 && row < self.height && col >= 0 && col < self.width
    }

    pub fn neighbors(&self, (row, col): Position) -> Neighbors {
        Self::NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(d_row, d_col)| Some((row.checked_add(d_row)?, col.checked_add(d_col)?)))
            .filter(|&position| self.is_valid(position))
            .collect()
    }

    pub fn are_neighbors(a: Position, b: Position) -> bool {
        a != b && a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
    }

    pub fn pixel_to_position((x, y): Pixel) -> Position {
        ((y / CELL_SIZE).floor() as Coord, (x / CELL_SIZE).floor() as Coord)
    }

    pub fn position_to_pixel((row, col): Position) -> Pixel {
        (
            (f64::from(col) + 0.5) * CELL_SIZE,
            (f64::from(row) + 0.5) * CELL_SIZE,
        )
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (
            f64::from(self.width) * CELL_SIZE,
            f64::from(self.height) * CELL_SIZE,
        )
    }
}
