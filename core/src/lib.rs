use core::ops::BitOr;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use error::*;
pub use field::*;
pub use generator::*;
pub use manager::*;
pub use topology::*;
pub use types::*;

mod cell;
mod error;
mod field;
mod generator;
mod manager;
mod topology;
mod types;

/// Shape of a match: tiling, board size and mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldParams {
    #[serde(default)]
    pub tiling: Tiling,
    pub width: Coord,
    pub height: Coord,
    pub mines_count: CellCount,
}

impl FieldParams {
    pub const fn new(tiling: Tiling, width: Coord, height: Coord, mines_count: CellCount) -> Self {
        Self {
            tiling,
            width,
            height,
            mines_count,
        }
    }

    pub const fn rectangular(width: Coord, height: Coord, mines_count: CellCount) -> Self {
        Self::new(Tiling::Rectangular, width, height, mines_count)
    }

    pub const fn hexagonal(width: Coord, height: Coord, mines_count: CellCount) -> Self {
        Self::new(Tiling::Hexagonal, width, height, mines_count)
    }

    /// Checks the parameters and builds the matching topology.
    ///
    /// At least one cell must stay free of mines.
    pub fn validate(&self) -> Result<Topology> {
        let topology = Topology::try_new(self.tiling, self.width, self.height)?;
        let cells = topology.cell_count();
        if self.mines_count >= cells {
            return Err(GameError::TooManyMines {
                mines: self.mines_count,
                cells,
            });
        }
        Ok(topology)
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Level::Rookie.field_params(Tiling::Rectangular)
    }
}

/// Preset difficulties.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Rookie,
    Veteran,
    Warrior,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Rookie, Level::Veteran, Level::Warrior];

    pub const fn field_params(self, tiling: Tiling) -> FieldParams {
        let (width, height, mines) = match self {
            Self::Rookie => (10, 10, 10),
            Self::Veteran => (16, 16, 40),
            Self::Warrior => (30, 16, 99),
        };
        FieldParams::new(tiling, width, height, mines)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Rookie => "Rookie",
            Self::Veteran => "Veteran",
            Self::Warrior => "Warrior",
        }
    }
}

/// Outcome of a reveal or chord on the field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

/// Used to merge outcomes when one action opens several cells
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            // hitting a mine has priority
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}
