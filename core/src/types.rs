use serde::{Deserialize, Serialize};

/// Single coordinate axis, signed so that pixel inverse mapping can land
/// outside the board.
pub type Coord = i32;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Logical `(row, column)` position of a cell.
///
/// The meaning depends on the tiling: for hexagonal boards the column is an
/// offset-row column, so positions from different tilings must never be
/// mixed arithmetically.
pub type Position = (Coord, Coord);

/// Canvas pixel `(x, y)`.
pub type Pixel = (f64, f64);

/// Side of a rectangular cell and width of a hexagonal cell, in pixels.
pub const CELL_SIZE: f64 = 24.0;

/// The two supported tilings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tiling {
    #[default]
    Rectangular,
    Hexagonal,
}
