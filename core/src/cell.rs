use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible state of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellStatus {
    #[default]
    Closed,
    FlaggedAsMine,
    FlaggedAsQuestion,
    Opened,
    DetonatedMine,
    // these are only used to show the result after the match ends:
    PassiveMine,
    MisflaggedSafe,
}

impl CellStatus {
    pub const fn is_marked(self) -> bool {
        matches!(self, Self::FlaggedAsMine | Self::FlaggedAsQuestion)
    }

    const fn next_mark(self) -> Option<Self> {
        use CellStatus::*;
        match self {
            Closed => Some(FlaggedAsMine),
            FlaggedAsMine => Some(FlaggedAsQuestion),
            FlaggedAsQuestion => Some(Closed),
            _ => None,
        }
    }
}

/// What a cell hides. Every cell starts as a placeholder and becomes safe or
/// mined exactly once, when the field is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Placeholder,
    Safe,
    Mine,
}

/// Outcome of cycling the mark of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    /// `Closed` to `FlaggedAsMine`.
    Flagged,
    /// `FlaggedAsMine` to `FlaggedAsQuestion`.
    Questioned,
    /// `FlaggedAsQuestion` back to `Closed`.
    Cleared,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    /// Change of the number of cells flagged as mines.
    pub const fn flag_delta(self) -> i64 {
        match self {
            Self::Flagged => 1,
            Self::Questioned => -1,
            Self::NoChange | Self::Cleared => 0,
        }
    }
}

/// Effect of a primary reveal on a single cell, consumed by the field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealEffect {
    Unchanged,
    /// A placeholder was hit: the field must be generated first.
    Generate,
    Opened(u8),
    Detonated,
}

/// One grid unit.
///
/// Cells hold no links to their neighbours; the field looks them up through
/// its topology whenever a count is needed, so replacing the whole cell
/// collection at generation time leaves nothing stale behind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    position: Position,
    status: CellStatus,
    kind: CellKind,
    mined_neighbors: Option<u8>,
}

impl Cell {
    pub const fn placeholder(position: Position) -> Self {
        Self::new(CellKind::Placeholder, position, CellStatus::Closed)
    }

    /// Builds a generated cell that keeps the status of the placeholder it
    /// replaces, so marks placed before the first reveal survive.
    pub(crate) const fn generated(is_mine: bool, previous: &Cell) -> Self {
        let kind = if is_mine {
            CellKind::Mine
        } else {
            CellKind::Safe
        };
        Self::new(kind, previous.position, previous.status)
    }

    const fn new(kind: CellKind, position: Position, status: CellStatus) -> Self {
        Self {
            position,
            status,
            kind,
            mined_neighbors: None,
        }
    }

    pub const fn position(&self) -> Position {
        self.position
    }

    pub const fn status(&self) -> CellStatus {
        self.status
    }

    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    pub const fn is_mine(&self) -> bool {
        matches!(self.kind, CellKind::Mine)
    }

    /// Number of mined neighbours, known once the cell has been opened.
    pub const fn mined_neighbors(&self) -> Option<u8> {
        self.mined_neighbors
    }

    /// Whether opening this cell now requires its neighbour count.
    pub(crate) const fn needs_count(&self) -> bool {
        matches!(self.kind, CellKind::Safe)
            && matches!(self.status, CellStatus::Closed)
            && self.mined_neighbors.is_none()
    }

    pub(crate) fn set_mined_neighbors(&mut self, count: u8) {
        debug_assert_eq!(self.kind, CellKind::Safe, "count on {:?}", self.kind);
        self.mined_neighbors = Some(count);
    }

    /// Moves one step along `Closed -> FlaggedAsMine -> FlaggedAsQuestion ->
    /// Closed`. No-op once the cell is open.
    pub fn cycle_mark(&mut self) -> MarkOutcome {
        let Some(next) = self.status.next_mark() else {
            return MarkOutcome::NoChange;
        };

        self.status = next;
        match next {
            CellStatus::FlaggedAsMine => MarkOutcome::Flagged,
            CellStatus::FlaggedAsQuestion => MarkOutcome::Questioned,
            _ => MarkOutcome::Cleared,
        }
    }

    /// Primary reveal. Only a `Closed` cell reacts.
    ///
    /// Safe cells must have their neighbour count set beforehand, see
    /// [`Cell::needs_count`].
    pub(crate) fn reveal(&mut self) -> RevealEffect {
        if self.status != CellStatus::Closed {
            return RevealEffect::Unchanged;
        }

        match self.kind {
            CellKind::Placeholder => RevealEffect::Generate,
            CellKind::Mine => {
                self.status = CellStatus::DetonatedMine;
                RevealEffect::Detonated
            }
            CellKind::Safe => {
                debug_assert!(self.mined_neighbors.is_some(), "uncounted {self:?}");
                self.status = CellStatus::Opened;
                RevealEffect::Opened(self.mined_neighbors.unwrap_or_default())
            }
        }
    }

    /// Neighbour count a chord must match, `None` unless this is an opened
    /// safe cell.
    pub(crate) const fn chord_target(&self) -> Option<u8> {
        match (self.kind, self.status) {
            (CellKind::Safe, CellStatus::Opened) => self.mined_neighbors,
            _ => None,
        }
    }

    /// Settles the displayed state once the match is over, without any
    /// further game effects. Returns whether the status changed.
    ///
    /// Closed safe cells are shown opened, so their count must be set first.
    pub(crate) fn set_final_status(&mut self, user_won: bool) -> bool {
        use CellStatus::*;

        let next = match (self.kind, self.status) {
            (CellKind::Mine, Closed | FlaggedAsQuestion) if user_won => FlaggedAsMine,
            (CellKind::Mine, Closed | FlaggedAsQuestion) => PassiveMine,
            (CellKind::Safe, Closed) => Opened,
            (CellKind::Safe, status) if status.is_marked() && !user_won => MisflaggedSafe,
            _ => return false,
        };

        self.status = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safe(count: u8) -> Cell {
        let mut cell = Cell::generated(false, &Cell::placeholder((0, 0)));
        cell.set_mined_neighbors(count);
        cell
    }

    fn mine() -> Cell {
        Cell::generated(true, &Cell::placeholder((0, 0)))
    }

    #[test]
    fn mark_cycle_wraps_after_three_steps() {
        let mut cell = Cell::placeholder((1, 2));
        let outcomes: Vec<_> = (0..3).map(|_| cell.cycle_mark()).collect();

        assert_eq!(
            outcomes,
            [
                MarkOutcome::Flagged,
                MarkOutcome::Questioned,
                MarkOutcome::Cleared
            ]
        );
        assert_eq!(outcomes.iter().map(|o| o.flag_delta()).sum::<i64>(), 0);
        assert_eq!(cell.status(), CellStatus::Closed);
    }

    #[test]
    fn opened_cell_ignores_marks_and_reveals() {
        let mut cell = safe(2);
        assert_eq!(cell.reveal(), RevealEffect::Opened(2));
        assert_eq!(cell.cycle_mark(), MarkOutcome::NoChange);
        assert_eq!(cell.reveal(), RevealEffect::Unchanged);
        assert_eq!(cell.chord_target(), Some(2));
    }

    #[test]
    fn placeholder_asks_for_generation() {
        let mut cell = Cell::placeholder((0, 0));
        assert_eq!(cell.reveal(), RevealEffect::Generate);
        assert_eq!(cell.status(), CellStatus::Closed);
        assert_eq!(cell.chord_target(), None);
    }

    #[test]
    fn flagged_cells_are_not_revealed() {
        let mut cell = mine();
        cell.cycle_mark();
        assert_eq!(cell.reveal(), RevealEffect::Unchanged);

        cell.cycle_mark();
        assert_eq!(cell.status(), CellStatus::FlaggedAsQuestion);
        assert_eq!(cell.reveal(), RevealEffect::Unchanged);
    }

    #[test]
    fn generated_cell_keeps_placeholder_status() {
        let mut placeholder = Cell::placeholder((3, 4));
        placeholder.cycle_mark();

        let cell = Cell::generated(true, &placeholder);
        assert_eq!(cell.kind(), CellKind::Mine);
        assert_eq!(cell.position(), (3, 4));
        assert_eq!(cell.status(), CellStatus::FlaggedAsMine);
    }

    #[test]
    fn mine_detonates() {
        let mut cell = mine();
        assert_eq!(cell.reveal(), RevealEffect::Detonated);
        assert_eq!(cell.status(), CellStatus::DetonatedMine);
        assert!(!cell.set_final_status(false));
    }

    #[test]
    fn final_status_on_loss() {
        let mut closed_mine = mine();
        assert!(closed_mine.set_final_status(false));
        assert_eq!(closed_mine.status(), CellStatus::PassiveMine);

        let mut flagged_mine = mine();
        flagged_mine.cycle_mark();
        assert!(!flagged_mine.set_final_status(false));
        assert_eq!(flagged_mine.status(), CellStatus::FlaggedAsMine);

        let mut flagged_safe = safe(0);
        flagged_safe.cycle_mark();
        assert!(flagged_safe.set_final_status(false));
        assert_eq!(flagged_safe.status(), CellStatus::MisflaggedSafe);

        let mut closed_safe = safe(3);
        assert!(closed_safe.set_final_status(false));
        assert_eq!(closed_safe.status(), CellStatus::Opened);
    }

    #[test]
    fn question_marked_safe_cell_is_misflagged_on_loss() {
        let mut cell = safe(1);
        cell.cycle_mark();
        cell.cycle_mark();
        assert!(cell.status().is_marked());

        assert!(cell.set_final_status(false));
        assert_eq!(cell.status(), CellStatus::MisflaggedSafe);
    }

    #[test]
    fn marks_on_safe_cells_stay_after_a_win() {
        let mut cell = safe(1);
        cell.cycle_mark();
        assert!(!cell.set_final_status(true));
        assert_eq!(cell.status(), CellStatus::FlaggedAsMine);
    }

    #[test]
    fn final_status_on_win_flags_remaining_mines() {
        let mut questioned = mine();
        questioned.cycle_mark();
        questioned.cycle_mark();
        assert!(questioned.set_final_status(true));
        assert_eq!(questioned.status(), CellStatus::FlaggedAsMine);

        let mut placeholder = Cell::placeholder((0, 0));
        assert!(!placeholder.set_final_status(true));
    }
}
