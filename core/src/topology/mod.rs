use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;
pub use hexagonal::*;
pub use rectangular::*;

mod hexagonal;
mod rectangular;

/// In-bounds neighbours of a cell, never more than eight.
pub type Neighbors = SmallVec<[Position; 8]>;

/// Cell layout of one match: counting, indexing, adjacency and the pixel
/// geometry used by renderers.
///
/// All operations are pure functions of the board size and their arguments.
/// The linear index is the storage key of a [`Field`]; it is contiguous in
/// `0..cell_count()` and is a bijection with the valid positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Rectangular(Rectangular),
    Hexagonal(Hexagonal),
}

impl Topology {
    /// Builds the layout for `tiling`, rejecting empty boards and boards whose
    /// cell count does not fit [`CellCount`].
    pub fn try_new(tiling: Tiling, width: Coord, height: Coord) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(GameError::InvalidDimensions { width, height });
        }

        let topology = match tiling {
            Tiling::Rectangular => Self::Rectangular(Rectangular::new(width, height)),
            Tiling::Hexagonal => Self::Hexagonal(Hexagonal::new(width, height)),
        };

        if topology.wide_cell_count() > u64::from(CellCount::MAX) {
            return Err(GameError::FieldTooLarge);
        }
        Ok(topology)
    }

    pub const fn tiling(&self) -> Tiling {
        match self {
            Self::Rectangular(_) => Tiling::Rectangular,
            Self::Hexagonal(_) => Tiling::Hexagonal,
        }
    }

    pub const fn width(&self) -> Coord {
        match self {
            Self::Rectangular(rect) => rect.width(),
            Self::Hexagonal(hex) => hex.width(),
        }
    }

    pub const fn height(&self) -> Coord {
        match self {
            Self::Rectangular(rect) => rect.height(),
            Self::Hexagonal(hex) => hex.height(),
        }
    }

    fn wide_cell_count(&self) -> u64 {
        match self {
            Self::Rectangular(rect) => rect.wide_cell_count(),
            Self::Hexagonal(hex) => hex.wide_cell_count(),
        }
    }

    pub fn cell_count(&self) -> CellCount {
        // fits, checked in try_new
        self.wide_cell_count() as CellCount
    }

    /// Upper bound of the neighbour count of any cell.
    pub const fn max_neighbors(&self) -> usize {
        match self {
            Self::Rectangular(_) => Rectangular::NEIGHBOR_OFFSETS.len(),
            Self::Hexagonal(_) => Hexagonal::NEIGHBOR_OFFSETS.len(),
        }
    }

    pub fn index_to_position(&self, index: usize) -> Position {
        debug_assert!(
            index < self.cell_count() as usize,
            "index {index} out of range"
        );
        match self {
            Self::Rectangular(rect) => rect.index_to_position(index),
            Self::Hexagonal(hex) => hex.index_to_position(index),
        }
    }

    /// Linear index of `position`, `None` when it is out of bounds.
    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        match self {
            Self::Rectangular(rect) => rect.position_to_index(position),
            Self::Hexagonal(hex) => hex.position_to_index(position),
        }
    }

    pub fn is_valid(&self, position: Position) -> bool {
        match self {
            Self::Rectangular(rect) => rect.is_valid(position),
            Self::Hexagonal(hex) => hex.is_valid(position),
        }
    }

    /// In-bounds neighbours of `position`, in the fixed offset order of the
    /// tiling.
    pub fn neighbors(&self, position: Position) -> Neighbors {
        match self {
            Self::Rectangular(rect) => rect.neighbors(position),
            Self::Hexagonal(hex) => hex.neighbors(position),
        }
    }

    /// Adjacency test that needs no cells, usable before mines exist.
    pub fn are_neighbors(&self, a: Position, b: Position) -> bool {
        match self {
            Self::Rectangular(_) => Rectangular::are_neighbors(a, b),
            Self::Hexagonal(_) => Hexagonal::are_neighbors(a, b),
        }
    }

    /// Whether `position` is `anchor` or one of its neighbours.
    pub fn within_reach(&self, anchor: Position, position: Position) -> bool {
        anchor == position || self.are_neighbors(anchor, position)
    }

    /// Inverse of [`Topology::position_to_pixel`]: the cell whose drawn shape
    /// contains `pixel`.
    ///
    /// Every pixel inside [`Topology::canvas_size`] yields a valid position.
    /// Pixels outside the canvas may not, check with [`Topology::is_valid`]
    /// before use.
    pub fn pixel_to_position(&self, pixel: Pixel) -> Position {
        match self {
            Self::Rectangular(_) => Rectangular::pixel_to_position(pixel),
            Self::Hexagonal(hex) => hex.pixel_to_position(pixel),
        }
    }

    /// Centre of the cell at `position`.
    pub fn position_to_pixel(&self, position: Position) -> Pixel {
        match self {
            Self::Rectangular(_) => Rectangular::position_to_pixel(position),
            Self::Hexagonal(_) => Hexagonal::position_to_pixel(position),
        }
    }

    /// Size `(width, height)` of the canvas that fits every cell.
    pub fn canvas_size(&self) -> (f64, f64) {
        match self {
            Self::Rectangular(rect) => rect.canvas_size(),
            Self::Hexagonal(hex) => hex.canvas_size(),
        }
    }

    /// Iterates over every valid position in index order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cell_count() as usize).map(|index| self.index_to_position(index))
    }
}
