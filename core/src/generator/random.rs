use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Uniform rejection sampling: draw indices with replacement and drop any
/// that already hold a mine or lie next to the anchor, until the requested
/// count is placed.
#[derive(Clone, Debug)]
pub struct RandomMinePlacer {
    rng: SmallRng,
}

impl RandomMinePlacer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MinePlacer for RandomMinePlacer {
    fn place(&mut self, topology: &Topology, mines: CellCount, anchor: Position) -> MineLayout {
        let total_cells = topology.cell_count();

        // the anchor is never mined
        let mines = if mines < total_cells {
            mines
        } else {
            log::warn!("{mines} mines requested on {total_cells} cells, placing {}", total_cells - 1);
            total_cells - 1
        };

        let reserved = topology.neighbors(anchor).len() as CellCount + 1;
        let clear_neighbors = if mines.saturating_add(reserved) <= total_cells {
            true
        } else {
            log::warn!("Cannot keep the neighbors of {anchor:?} clear, only the anchor stays safe");
            false
        };

        let mut mine_mask = vec![false; total_cells as usize];
        let mut mines_placed = 0;
        let mut draws = 0u64;
        while mines_placed < mines {
            let index = self.rng.random_range(0..mine_mask.len());
            draws += 1;
            if mine_mask[index] {
                continue;
            }

            let position = topology.index_to_position(index);
            let keep_free = if clear_neighbors {
                topology.within_reach(anchor, position)
            } else {
                position == anchor
            };
            if keep_free {
                continue;
            }

            mine_mask[index] = true;
            mines_placed += 1;
        }
        log::trace!("Placed {mines} mines in {draws} draws");

        MineLayout::from_mine_mask(mine_mask)
    }
}
