use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::{Instant, SystemTime};

use crate::*;

/// Input requested by the player on one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Reveal,
    Chord,
    ToggleFlag,
}

/// How a finished match ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// Valid transitions:
/// - Active -> Won
/// - Active -> Lost
///
/// Both finished states last until the next `new_game`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    #[default]
    Active,
    Won,
    Lost,
}

impl MatchState {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Active => None,
            Self::Won => Some(Outcome::Won),
            Self::Lost => Some(Outcome::Lost),
        }
    }
}

/// Snapshot for status displays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub elapsed_seconds: u64,
    /// Configured mines minus placed flags, negative when over-flagged.
    pub mines_remaining: i64,
    pub active: bool,
    pub outcome: Option<Outcome>,
}

/// Owns the current match and is the entry point for UI code.
#[derive(Debug)]
pub struct GameManager {
    params: FieldParams,
    field: Field,
    state: MatchState,
    flag_count: i64,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    rng: SmallRng,
}

impl GameManager {
    /// Starts a match with mines drawn from `seed`.
    pub fn new(params: FieldParams, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let placer = RandomMinePlacer::new(rng.random());
        let field = Field::new(&params, Box::new(placer))?;

        Ok(Self {
            params,
            field,
            state: MatchState::Active,
            flag_count: 0,
            started_at: None,
            finished_at: None,
            rng,
        })
    }

    /// Like [`GameManager::new`], seeded from the wall clock.
    pub fn with_clock_seed(params: FieldParams) -> Result<Self> {
        let seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|since| since.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(params, seed)
    }

    /// Throws the current match away and starts over in the placeholder phase.
    ///
    /// Invalid parameters are rejected and leave the current match untouched.
    pub fn new_game(&mut self, params: FieldParams) -> Result<()> {
        let placer = RandomMinePlacer::new(self.rng.random());
        self.new_game_with(params, Box::new(placer))
    }

    /// Starts a preset level on the current tiling.
    pub fn new_level(&mut self, level: Level) -> Result<()> {
        self.new_game(level.field_params(self.params.tiling))
    }

    /// Starts a match whose mines come from `placer`.
    pub fn new_game_with(&mut self, params: FieldParams, placer: Box<dyn MinePlacer>) -> Result<()> {
        let field = Field::new(&params, placer)?;

        self.params = params;
        self.field = field;
        self.state = MatchState::Active;
        self.flag_count = 0;
        self.started_at = None;
        self.finished_at = None;
        log::debug!("New game: {params:?}");
        Ok(())
    }

    /// Applies `action` on `position` and returns the positions whose status
    /// changed, in index order.
    ///
    /// Finished matches and invalid positions ignore input.
    pub fn handle_action(&mut self, position: Position, action: Action) -> Vec<Position> {
        if !self.state.is_active() {
            log::trace!("{action:?} at {position:?} ignored, match is over");
            return Vec::new();
        }
        if !self.field.topology().is_valid(position) {
            log::trace!("{action:?} at {position:?} ignored, out of bounds");
            return Vec::new();
        }

        let mut changes = ChangeSet::new();
        match action {
            Action::Reveal => {
                let outcome = self.field.reveal(position, &mut changes);
                self.after_reveal(outcome, &mut changes);
            }
            Action::Chord => {
                let outcome = self.field.chord(position, &mut changes);
                self.after_reveal(outcome, &mut changes);
            }
            Action::ToggleFlag => {
                let outcome = self.field.cycle_mark(position, &mut changes);
                self.flag_count += outcome.flag_delta();
            }
        }

        let topology = self.field.topology();
        changes
            .into_iter()
            .map(|index| topology.index_to_position(index))
            .collect()
    }

    fn after_reveal(&mut self, outcome: RevealOutcome, changes: &mut ChangeSet) {
        if self.started_at.is_none() && self.field.safe_opened_count() > 0 {
            self.started_at = Some(Instant::now());
        }

        match outcome {
            RevealOutcome::HitMine => self.finish(false, changes),
            RevealOutcome::Won => self.finish(true, changes),
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
    }

    fn finish(&mut self, user_won: bool, changes: &mut ChangeSet) {
        debug_assert!(self.state.is_active(), "match finished twice");

        self.state = if user_won {
            MatchState::Won
        } else {
            MatchState::Lost
        };
        self.finished_at = Some(Instant::now());
        self.field.set_final_status(user_won, changes);
        log::debug!("Match over: {:?}", self.state);
    }

    pub fn query_status(&self) -> GameStatus {
        GameStatus {
            elapsed_seconds: self.elapsed_seconds(),
            mines_remaining: self.mines_remaining(),
            active: self.is_active(),
            outcome: self.outcome(),
        }
    }

    /// Seconds since the first safe cell was opened, rounded, 0 before that.
    pub fn elapsed_seconds(&self) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let until = self.finished_at.unwrap_or_else(Instant::now);
        until.duration_since(started_at).as_secs_f64().round() as u64
    }

    pub fn mines_remaining(&self) -> i64 {
        i64::from(self.params.mines_count) - self.flag_count
    }

    /// Cell under `pixel`, which may be invalid for pixels outside the drawn
    /// cells.
    pub fn logical_position_for_pixel(&self, pixel: Pixel) -> Position {
        self.field.topology().pixel_to_position(pixel)
    }

    pub fn params(&self) -> FieldParams {
        self.params
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome()
    }

    pub fn flag_count(&self) -> i64 {
        self.flag_count
    }
}
