use smallvec::SmallVec;
use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Linear indices of the cells whose status changed during one action.
pub type ChangeSet = BTreeSet<usize>;

/// The cells of one match and the rules that connect them.
///
/// A field starts with placeholder cells only. The first reveal asks the
/// placer for a layout that keeps the revealed cell and its neighbours free,
/// rebuilds the whole cell collection from it and then performs the reveal on
/// the rebuilt cell, so the first move can never lose.
#[derive(Debug)]
pub struct Field {
    topology: Topology,
    mines_count: CellCount,
    cells: Vec<Cell>,
    placer: Box<dyn MinePlacer>,
    generated: bool,
    safe_opened_count: CellCount,
    safe_total_count: CellCount,
}

impl Field {
    pub fn new(params: &FieldParams, placer: Box<dyn MinePlacer>) -> Result<Self> {
        let topology = params.validate()?;
        placer.check(&topology, params.mines_count)?;
        let cells: Vec<_> = topology.positions().map(Cell::placeholder).collect();
        debug_assert_eq!(cells.len(), topology.cell_count() as usize);

        Ok(Self {
            topology,
            mines_count: params.mines_count,
            cells,
            placer,
            generated: false,
            safe_opened_count: 0,
            safe_total_count: topology.cell_count() - params.mines_count,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn mines_count(&self) -> CellCount {
        self.mines_count
    }

    /// Whether the mines have been placed yet.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn safe_opened_count(&self) -> CellCount {
        self.safe_opened_count
    }

    pub fn safe_total_count(&self) -> CellCount {
        self.safe_total_count
    }

    /// All cells in linear index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.topology
            .position_to_index(position)
            .map(|index| &self.cells[index])
    }

    /// Opens the cell at `position`, flooding through zero-count cells.
    pub fn reveal(&mut self, position: Position, changes: &mut ChangeSet) -> RevealOutcome {
        let Some(index) = self.topology.position_to_index(position) else {
            return RevealOutcome::NoChange;
        };
        self.reveal_from([index], changes)
    }

    /// Opens every neighbour of an opened cell whose count is matched by the
    /// flags around it.
    pub fn chord(&mut self, position: Position, changes: &mut ChangeSet) -> RevealOutcome {
        let Some(index) = self.topology.position_to_index(position) else {
            return RevealOutcome::NoChange;
        };
        let Some(target) = self.cells[index].chord_target() else {
            return RevealOutcome::NoChange;
        };

        let neighbors: SmallVec<[usize; 8]> = self.neighbor_indices(position).collect();
        let flagged = neighbors
            .iter()
            .filter(|&&neighbor| self.cells[neighbor].status() == CellStatus::FlaggedAsMine)
            .count();
        if flagged != usize::from(target) {
            log::trace!("Chord at {position:?} ignored, {flagged} flags for {target} mines");
            return RevealOutcome::NoChange;
        }

        self.reveal_from(neighbors, changes)
    }

    /// Cycles the mark of the cell at `position`.
    pub fn cycle_mark(&mut self, position: Position, changes: &mut ChangeSet) -> MarkOutcome {
        let Some(index) = self.topology.position_to_index(position) else {
            return MarkOutcome::NoChange;
        };

        let outcome = self.cells[index].cycle_mark();
        if outcome.has_update() {
            changes.insert(index);
        }
        outcome
    }

    /// Settles every cell for display once the match is over.
    pub fn set_final_status(&mut self, user_won: bool, changes: &mut ChangeSet) {
        for index in 0..self.cells.len() {
            self.ensure_count(index);
            if self.cells[index].set_final_status(user_won) {
                changes.insert(index);
            }
        }
    }

    /// Worklist reveal. A cell is marked opened before its neighbours are
    /// queued, and only closed cells react to a reveal, so every cell is
    /// opened at most once and the walk ends.
    fn reveal_from(
        &mut self,
        start: impl IntoIterator<Item = usize>,
        changes: &mut ChangeSet,
    ) -> RevealOutcome {
        let mut pending: VecDeque<usize> = start.into_iter().collect();
        let mut outcome = RevealOutcome::NoChange;

        while let Some(index) = pending.pop_front() {
            self.ensure_count(index);
            let position = self.cells[index].position();

            match self.cells[index].reveal() {
                RevealEffect::Unchanged => {}
                RevealEffect::Generate => {
                    self.generate(position);
                    pending.push_front(index);
                }
                RevealEffect::Detonated => {
                    log::debug!("Mine detonated at {position:?}");
                    changes.insert(index);
                    outcome = outcome | RevealOutcome::HitMine;
                }
                RevealEffect::Opened(count) => {
                    changes.insert(index);
                    outcome = outcome | self.safe_cell_opened();

                    if count == 0 {
                        log::trace!("Flood-fill from {position:?}");
                        let closed: SmallVec<[usize; 8]> = self
                            .neighbor_indices(position)
                            .filter(|&neighbor| self.cells[neighbor].status() == CellStatus::Closed)
                            .collect();
                        pending.extend(closed);
                    }
                }
            }
        }

        outcome
    }

    fn safe_cell_opened(&mut self) -> RevealOutcome {
        self.safe_opened_count += 1;
        debug_assert!(self.safe_opened_count <= self.safe_total_count);
        if self.safe_opened_count == self.safe_total_count {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Replaces every placeholder with a safe or mined cell, keeping statuses.
    fn generate(&mut self, anchor: Position) {
        debug_assert!(!self.generated, "field generated twice");

        let layout = self.placer.place(&self.topology, self.mines_count, anchor);
        debug_assert_eq!(layout.len(), self.cells.len(), "layout size mismatch");
        debug_assert_eq!(layout.mine_count(), self.mines_count, "mine count mismatch");

        self.cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(index, previous)| Cell::generated(layout[index], previous))
            .collect();
        self.safe_total_count = self.topology.cell_count() - layout.mine_count();
        self.generated = true;

        log::debug!(
            "Generated {} mines on {} cells around {:?}",
            layout.mine_count(),
            self.cells.len(),
            anchor
        );
    }

    /// Computes the neighbour count of a closed safe cell on first need.
    fn ensure_count(&mut self, index: usize) {
        if self.cells[index].needs_count() {
            let count = self.count_mined_neighbors(self.cells[index].position());
            self.cells[index].set_mined_neighbors(count);
        }
    }

    fn count_mined_neighbors(&self, position: Position) -> u8 {
        self.neighbor_indices(position)
            .filter(|&neighbor| self.cells[neighbor].is_mine())
            .count() as u8
    }

    fn neighbor_indices(&self, position: Position) -> impl Iterator<Item = usize> + use<'_> {
        self.topology
            .neighbors(position)
            .into_iter()
            .filter_map(|neighbor| self.topology.position_to_index(neighbor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset_field(params: FieldParams, mines: &[Position]) -> Field {
        let topology = params.validate().unwrap();
        let layout = MineLayout::from_positions(&topology, mines).unwrap();
        Field::new(&params, Box::new(PresetMinePlacer::new(layout))).unwrap()
    }

    fn status_at(field: &Field, position: Position) -> CellStatus {
        field.cell_at(position).unwrap().status()
    }

    #[test]
    fn new_field_holds_only_placeholders() {
        let field = Field::new(&FieldParams::hexagonal(5, 4, 3), Box::new(RandomMinePlacer::new(1))).unwrap();

        assert!(!field.is_generated());
        assert_eq!(field.cells().len(), 18);
        assert!(field.cells().iter().all(|cell| cell.kind() == CellKind::Placeholder
            && cell.status() == CellStatus::Closed));
        assert_eq!(field.safe_total_count(), 15);
    }

    #[test]
    fn first_reveal_generates_clear_neighborhood() {
        for params in [FieldParams::rectangular(9, 9, 30), FieldParams::hexagonal(9, 9, 30)] {
            for seed in 0..10 {
                let mut field = Field::new(&params, Box::new(RandomMinePlacer::new(seed))).unwrap();
                let mut changes = ChangeSet::new();
                let anchor = (4, 4);

                let outcome = field.reveal(anchor, &mut changes);

                assert!(field.is_generated());
                assert!(matches!(outcome, RevealOutcome::Revealed | RevealOutcome::Won));
                assert_eq!(field.cells().iter().filter(|cell| cell.is_mine()).count(), 30);
                assert!(field.cells().iter().all(|cell| cell.kind() != CellKind::Placeholder));
                for cell in field.cells() {
                    if field.topology().within_reach(anchor, cell.position()) {
                        assert!(!cell.is_mine(), "{params:?} seed {seed}");
                    }
                }
                assert_eq!(field.cell_at(anchor).unwrap().mined_neighbors(), Some(0));
                assert!(changes.len() > 1, "zero anchor must cascade");
            }
        }
    }

    #[test]
    fn marks_survive_generation() {
        let mut field = preset_field(FieldParams::rectangular(5, 5, 1), &[(4, 4)]);
        let mut changes = ChangeSet::new();

        assert_eq!(field.cycle_mark((0, 4), &mut changes), MarkOutcome::Flagged);
        assert_eq!(field.cycle_mark((4, 4), &mut changes), MarkOutcome::Flagged);
        field.reveal((0, 0), &mut changes);

        assert_eq!(status_at(&field, (0, 4)), CellStatus::FlaggedAsMine);
        assert_eq!(field.cell_at((0, 4)).unwrap().kind(), CellKind::Safe);
        assert_eq!(status_at(&field, (4, 4)), CellStatus::FlaggedAsMine);
        assert!(field.cell_at((4, 4)).unwrap().is_mine());
    }

    #[test]
    fn reveal_on_marked_placeholder_does_not_generate() {
        let mut field = preset_field(FieldParams::rectangular(3, 3, 1), &[(2, 2)]);
        let mut changes = ChangeSet::new();

        field.cycle_mark((0, 0), &mut changes);
        changes.clear();

        assert_eq!(field.reveal((0, 0), &mut changes), RevealOutcome::NoChange);
        assert!(!field.is_generated());
        assert!(changes.is_empty());
    }

    #[test]
    fn flood_fill_stops_at_numbered_cells() {
        // a wall of mines down column 3 splits the board
        let wall: Vec<Position> = (0..5).map(|row| (row, 3)).collect();
        let mut field = preset_field(FieldParams::rectangular(7, 5, 5), &wall);
        let mut changes = ChangeSet::new();

        let outcome = field.reveal((2, 6), &mut changes);

        assert_eq!(outcome, RevealOutcome::Revealed);
        assert_eq!(changes.len(), 15);
        assert_eq!(field.safe_opened_count(), 15);
        for row in 0..5 {
            for col in 4..7 {
                assert_eq!(status_at(&field, (row, col)), CellStatus::Opened);
            }
            for col in 0..4 {
                assert_eq!(status_at(&field, (row, col)), CellStatus::Closed);
            }
        }
        assert_eq!(field.cell_at((0, 4)).unwrap().mined_neighbors(), Some(2));
        assert_eq!(field.cell_at((2, 4)).unwrap().mined_neighbors(), Some(3));
        assert_eq!(field.cell_at((2, 5)).unwrap().mined_neighbors(), Some(0));
        // counts are only computed on reveal
        assert_eq!(field.cell_at((2, 2)).unwrap().mined_neighbors(), None);
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let mut field = preset_field(FieldParams::rectangular(4, 1, 0), &[]);
        let mut changes = ChangeSet::new();

        field.cycle_mark((0, 2), &mut changes);
        let outcome = field.reveal((0, 0), &mut changes);

        assert_eq!(outcome, RevealOutcome::Revealed);
        assert_eq!(status_at(&field, (0, 1)), CellStatus::Opened);
        assert_eq!(status_at(&field, (0, 2)), CellStatus::FlaggedAsMine);
        assert_eq!(status_at(&field, (0, 3)), CellStatus::Closed);
    }

    #[test]
    fn empty_hex_board_opens_completely() {
        let mut field = preset_field(FieldParams::hexagonal(6, 5, 0), &[]);
        let mut changes = ChangeSet::new();

        assert_eq!(field.reveal((4, 5), &mut changes), RevealOutcome::Won);
        assert_eq!(changes.len(), field.cells().len());
        assert!(field.cells().iter().all(|cell| cell.status() == CellStatus::Opened));
    }

    #[test]
    fn chord_requires_matching_flags() {
        let mut field = preset_field(FieldParams::rectangular(3, 3, 2), &[(0, 0), (0, 2)]);
        let mut changes = ChangeSet::new();

        assert_eq!(field.reveal((1, 1), &mut changes), RevealOutcome::Revealed);
        assert_eq!(field.cell_at((1, 1)).unwrap().mined_neighbors(), Some(2));

        field.cycle_mark((0, 0), &mut changes);
        changes.clear();
        assert_eq!(field.chord((1, 1), &mut changes), RevealOutcome::NoChange);
        assert!(changes.is_empty());

        field.cycle_mark((0, 2), &mut changes);
        changes.clear();
        assert_eq!(field.chord((1, 1), &mut changes), RevealOutcome::Won);
        assert_eq!(changes.len(), 6);
        assert_eq!(status_at(&field, (0, 0)), CellStatus::FlaggedAsMine);
    }

    #[test]
    fn chord_with_too_many_flags_is_ignored() {
        let mut field = preset_field(FieldParams::rectangular(3, 3, 2), &[(0, 0), (0, 2)]);
        let mut changes = ChangeSet::new();

        field.reveal((1, 1), &mut changes);
        for position in [(0, 0), (0, 2), (2, 2)] {
            field.cycle_mark(position, &mut changes);
        }
        changes.clear();

        assert_eq!(field.chord((1, 1), &mut changes), RevealOutcome::NoChange);
        assert!(changes.is_empty());
    }

    #[test]
    fn chord_with_misplaced_flag_detonates() {
        let mut field = preset_field(FieldParams::rectangular(3, 3, 2), &[(0, 0), (0, 2)]);
        let mut changes = ChangeSet::new();

        field.reveal((1, 1), &mut changes);
        field.cycle_mark((0, 0), &mut changes);
        field.cycle_mark((2, 2), &mut changes);

        assert_eq!(field.chord((1, 1), &mut changes), RevealOutcome::HitMine);
        assert_eq!(status_at(&field, (0, 2)), CellStatus::DetonatedMine);
    }

    #[test]
    fn chord_on_closed_or_zero_cell_is_ignored() {
        let mut field = preset_field(FieldParams::rectangular(3, 3, 1), &[(2, 2)]);
        let mut changes = ChangeSet::new();

        assert_eq!(field.chord((0, 0), &mut changes), RevealOutcome::NoChange);
        field.reveal((0, 0), &mut changes);
        changes.clear();
        assert_eq!(field.chord((0, 0), &mut changes), RevealOutcome::NoChange);
        assert!(changes.is_empty());
    }

    #[test]
    fn out_of_bounds_positions_are_ignored() {
        let mut field = preset_field(FieldParams::hexagonal(4, 4, 1), &[(0, 0)]);
        let mut changes = ChangeSet::new();

        assert_eq!(field.reveal((1, 3), &mut changes), RevealOutcome::NoChange);
        assert_eq!(field.chord((-1, 0), &mut changes), RevealOutcome::NoChange);
        assert_eq!(field.cycle_mark((4, 0), &mut changes), MarkOutcome::NoChange);
        assert!(changes.is_empty());
        assert!(!field.is_generated());
    }

    #[test]
    fn preset_for_another_board_is_rejected() {
        let small = FieldParams::rectangular(3, 3, 1);
        let layout = MineLayout::from_positions(&small.validate().unwrap(), &[(1, 1)]).unwrap();

        let result = Field::new(
            &FieldParams::rectangular(4, 4, 1),
            Box::new(PresetMinePlacer::new(layout)),
        );
        assert_eq!(
            result.map(|_| ()),
            Err(GameError::InvalidLayout { cells: 9, mines: 1 })
        );
    }

    #[test]
    fn final_status_reports_changed_cells() {
        let mut field = preset_field(FieldParams::rectangular(4, 1, 1), &[(0, 1)]);
        let mut changes = ChangeSet::new();

        field.reveal((0, 0), &mut changes);
        field.cycle_mark((0, 2), &mut changes);
        changes.clear();

        field.set_final_status(false, &mut changes);

        assert_eq!(changes.into_iter().collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(status_at(&field, (0, 0)), CellStatus::Opened);
        assert_eq!(status_at(&field, (0, 1)), CellStatus::PassiveMine);
        assert_eq!(status_at(&field, (0, 2)), CellStatus::MisflaggedSafe);
        assert_eq!(status_at(&field, (0, 3)), CellStatus::Opened);
        assert_eq!(field.cell_at((0, 3)).unwrap().mined_neighbors(), Some(0));
        // shown, not played
        assert_eq!(field.safe_opened_count(), 1);
    }
}
