use core::ops::Add;
use serde::{Deserialize, Serialize};

use super::Neighbors;
use crate::*;

/// Fractional pixel inputs are clamped to this magnitude before rounding so
/// the integer cube arithmetic cannot overflow.
const AXIS_LIMIT: f64 = (1u64 << 32) as f64;

/// Cube coordinates of a hex, always satisfying `x + y + z == 0`.
///
/// `x` runs along a row and `z` equals the row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cube {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Cube {
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, y: -x - z, z }
    }

    /// Converts an odd-row offset position, odd rows shifted half a cell right.
    pub fn from_offset((row, col): Position) -> Self {
        let (row, col) = (i64::from(row), i64::from(col));
        Self::new(col - (row - (row & 1)) / 2, row)
    }

    pub fn to_offset(self) -> Position {
        let col = self.x + (self.z - (self.z & 1)) / 2;
        (saturate(self.z), saturate(col))
    }

    pub fn distance(self, other: Self) -> u64 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }

    /// Rounds fractional cube coordinates to the nearest hex.
    ///
    /// Rounding each axis on its own can break `x + y + z == 0`, so the axis
    /// with the largest rounding error is rebuilt from the other two.
    pub fn round(x: f64, y: f64, z: f64) -> Self {
        let (mut rx, mut ry, mut rz) = (x.round(), y.round(), z.round());
        let (dx, dy, dz) = ((rx - x).abs(), (ry - y).abs(), (rz - z).abs());

        if dx > dy && dx > dz {
            rx = -ry - rz;
        } else if dy > dz {
            ry = -rx - rz;
        } else {
            rz = -rx - ry;
        }

        let cube = Self {
            x: rx as i64,
            y: ry as i64,
            z: rz as i64,
        };
        debug_assert_eq!(cube.x + cube.y + cube.z, 0, "unbalanced cube {cube:?}");
        cube
    }
}

impl Add for Cube {
    type Output = Cube;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

fn saturate(value: i64) -> Coord {
    value.clamp(Coord::MIN.into(), Coord::MAX.into()) as Coord
}

/// Pointy-top hexes in offset rows.
///
/// Even rows hold `width` cells, odd rows are shifted half a cell to the right
/// and hold `width - 1` cells so the board keeps a straight right edge. Cells
/// are stored row by row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hexagonal {
    width: Coord,
    height: Coord,
}

impl Hexagonal {
    /// E, NE, NW, W, SW, SE.
    pub const NEIGHBOR_OFFSETS: [Cube; 6] = [
        Cube { x: 1, y: -1, z: 0 },
        Cube { x: 1, y: 0, z: -1 },
        Cube { x: 0, y: 1, z: -1 },
        Cube { x: -1, y: 1, z: 0 },
        Cube { x: -1, y: 0, z: 1 },
        Cube { x: 0, y: -1, z: 1 },
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

    /// Number of cells in `row`.
    pub const fn row_len(&self, row: Coord) -> Coord {
        if row & 1 == 0 {
            self.width
        } else {
            self.width - 1
        }
    }

    pub(super) fn wide_cell_count(&self) -> u64 {
        let width = self.width as u64;
        let height = self.height as u64;
        height.div_ceil(2) * width + height / 2 * (width - 1)
    }

    /// Cells in one even row plus the odd row below it.
    fn stride(&self) -> usize {
        2 * self.width as usize - 1
    }

    pub fn index_to_position(&self, index: usize) -> Position {
        let width = self.width as usize;
        let pair = index / self.stride();
        let rest = index % self.stride();
        if rest < width {
            ((2 * pair) as Coord, rest as Coord)
        } else {
            ((2 * pair + 1) as Coord, (rest - width) as Coord)
        }
    }

    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        if !self.is_valid(position) {
            return None;
        }
        let (row, col) = (position.0 as usize, position.1 as usize);
        let row_start = row / 2 * self.stride() + (row % 2) * self.width as usize;
        Some(row_start + col)
    }

    pub const fn is_valid(&self, (row, col): Position) -> bool {
        row >= 0 && row < self.height && col >= 0 && col < self.row_len(row)
    }

    pub fn neighbors(&self, position: Position) -> Neighbors {
        let center = Cube::from_offset(position);
        Self::NEIGHBOR_OFFSETS
            .iter()
            .map(|&offset| (center + offset).to_offset())
            .filter(|&neighbor| self.is_valid(neighbor))
            .collect()
    }

    pub fn are_neighbors(a: Position, b: Position) -> bool {
        Cube::from_offset(a).distance(Cube::from_offset(b)) == 1
    }

    /// Distance from a hex centre to its corners.
    fn radius() -> f64 {
        CELL_SIZE / 3f64.sqrt()
    }

    /// Hex under `pixel`.
    ///
    /// The canvas rectangle also covers the margins left by the shifted odd
    /// rows and the notches above and below the outer rows. Pixels there are
    /// given the valid cell with the closest centre, so every pixel inside
    /// `canvas_size()` yields a valid position. Pixels outside the canvas may
    /// not.
    pub fn pixel_to_position(&self, pixel: Pixel) -> Position {
        let rounded = Self::round_pixel(pixel);
        if self.is_valid(rounded) || !self.canvas_contains(pixel) {
            return rounded;
        }

        let center = Cube::from_offset(rounded);
        self.nearby(center)
            .chain([self.clamp(rounded)])
            .min_by(|&a, &b| {
                Self::squared_distance(pixel, a).total_cmp(&Self::squared_distance(pixel, b))
            })
            .unwrap_or(rounded)
    }

    fn round_pixel((x, y): Pixel) -> Position {
        let radius = Self::radius();
        let px = x - CELL_SIZE / 2.0;
        let py = y - radius;

        let q = ((px * 3f64.sqrt() / 3.0 - py / 3.0) / radius).clamp(-AXIS_LIMIT, AXIS_LIMIT);
        let r = (py * 2.0 / 3.0 / radius).clamp(-AXIS_LIMIT, AXIS_LIMIT);

        Cube::round(q, -q - r, r).to_offset()
    }

    fn canvas_contains(&self, (x, y): Pixel) -> bool {
        let (width, height) = self.canvas_size();
        (0.0..width).contains(&x) && (0.0..height).contains(&y)
    }

    /// Valid cells within two steps of `center`.
    fn nearby(&self, center: Cube) -> impl Iterator<Item = Position> + use<'_> {
        (-2i64..=2)
            .flat_map(|dx| (-2i64..=2).map(move |dz| Cube::new(dx, dz)))
            .filter(|offset| offset.distance(Cube::new(0, 0)) <= 2)
            .map(move |offset| (center + offset).to_offset())
            .filter(|&position| self.is_valid(position))
    }

    /// Closest valid position by clamping the row, then the column.
    fn clamp(&self, (row, col): Position) -> Position {
        let mut row = row.clamp(0, self.height - 1);
        if self.row_len(row) == 0 {
            // only odd rows of a single-column board are empty
            row -= 1;
        }
        (row, col.clamp(0, self.row_len(row) - 1))
    }

    fn squared_distance((x, y): Pixel, position: Position) -> f64 {
        let (cx, cy) = Self::position_to_pixel(position);
        (x - cx).powi(2) + (y - cy).powi(2)
    }

    pub fn position_to_pixel((row, col): Position) -> Pixel {
        let shift = f64::from(row & 1) / 2.0;
        (
            CELL_SIZE * (f64::from(col) + 0.5 + shift),
            Self::radius() * (1.0 + 1.5 * f64::from(row)),
        )
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (
            CELL_SIZE * f64::from(self.width),
            Self::radius() * (2.0 + 1.5 * f64::from(self.height - 1)),
        )
    }
}
