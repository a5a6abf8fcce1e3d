use super::*;

/// Hands out a fixed layout regardless of the anchor, for replays and
/// scripted boards.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetMinePlacer {
    layout: MineLayout,
}

impl PresetMinePlacer {
    pub fn new(layout: MineLayout) -> Self {
        Self { layout }
    }
}

impl MinePlacer for PresetMinePlacer {
    fn place(&mut self, topology: &Topology, mines: CellCount, _anchor: Position) -> MineLayout {
        debug_assert!(self.check(topology, mines).is_ok(), "unchecked preset layout");
        self.layout.clone()
    }

    fn check(&self, topology: &Topology, mines: CellCount) -> Result<()> {
        if self.layout.len() != topology.cell_count() as usize || self.layout.mine_count() != mines {
            log::debug!(
                "Preset layout ({} cells, {} mines) rejected for {topology:?} with {mines} mines",
                self.layout.len(),
                self.layout.mine_count()
            );
            return Err(GameError::InvalidLayout {
                cells: self.layout.len(),
                mines: self.layout.mine_count(),
            });
        }
        Ok(())
    }
}
