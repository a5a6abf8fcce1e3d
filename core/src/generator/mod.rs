use core::fmt;
use core::ops::Index;
use serde::{Deserialize, Serialize};

use crate::*;
pub use preset::*;
pub use random::*;

mod preset;
mod random;

/// Strategy that decides where the mines go once the anchor is known.
pub trait MinePlacer: fmt::Debug {
    /// Places `mines` mines on `topology`, keeping `anchor` and, where the
    /// count allows it, its neighbours free.
    fn place(&mut self, topology: &Topology, mines: CellCount, anchor: Position) -> MineLayout;

    /// Rejects a placer that cannot serve a field of this shape, called once
    /// when the field is created.
    fn check(&self, _topology: &Topology, _mines: CellCount) -> Result<()> {
        Ok(())
    }
}

/// Mine mask over the linear cell indices of a topology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Vec<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Vec<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    /// Layout with mines at `positions`, invalid positions are rejected.
    pub fn from_positions(topology: &Topology, positions: &[Position]) -> Result<Self> {
        let mut mine_mask = vec![false; topology.cell_count() as usize];
        for &position in positions {
            let index = topology
                .position_to_index(position)
                .ok_or(GameError::InvalidCoords)?;
            mine_mask[index] = true;
        }
        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn len(&self) -> usize {
        self.mine_mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mine_mask.is_empty()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, index: usize) -> bool {
        self[index]
    }
}

impl Index<usize> for MineLayout {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        &self.mine_mask[index]
    }
}
