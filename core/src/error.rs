use thiserror::Error;

use crate::{CellCount, Coord};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid field dimensions {width}x{height}")]
    InvalidDimensions { width: Coord, height: Coord },
    #[error("Field too large")]
    FieldTooLarge,
    #[error("Too many mines: {mines} requested for {cells} cells")]
    TooManyMines { mines: CellCount, cells: CellCount },
    #[error("Layout with {mines} mines on {cells} cells does not fit the field")]
    InvalidLayout { cells: usize, mines: CellCount },
}

pub type Result<T> = core::result::Result<T, GameError>;
