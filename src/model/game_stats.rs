use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

/// Every this many counted moves a milestone is reported.
pub const MOVE_MILESTONE_INTERVAL: u64 = 50;

/// The smallest tile a board ever starts with.
pub const STARTING_TILE: u32 = 2;

/// Lifetime play statistics for one player/device.
///
/// Serialized as a flat JSON object using the camelCase field names
/// (`gamesPlayed`, `gamesWon`, ...). On deserialization a missing field takes
/// its default and an ill-typed field falls back to zero, so one corrupt value
/// never discards the rest of the record. Call [`Statistics::normalized`]
/// after restoring to re-establish the invariants.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    #[serde_as(as = "DefaultOnError")]
    pub games_played: u32,
    #[serde_as(as = "DefaultOnError")]
    pub games_won: u32,
    #[serde_as(as = "DefaultOnError")]
    pub total_moves: u64,
    #[serde_as(as = "DefaultOnError")]
    pub highest_tile: u32,
    #[serde_as(as = "DefaultOnError")]
    pub total_score: u64,
    #[serde_as(as = "DefaultOnError")]
    pub best_score: u64,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            games_played: 0,
            games_won: 0,
            total_moves: 0,
            highest_tile: STARTING_TILE,
            total_score: 0,
            best_score: 0,
        }
    }
}

impl Statistics {
    /// Folds one completed game into the record. Must be called exactly once
    /// per finished game.
    pub fn apply_game_ended(&mut self, won: bool, final_score: u64) {
        self.games_played = self.games_played.saturating_add(1);
        if won {
            self.games_won = self.games_won.saturating_add(1);
        }
        self.total_score = self.total_score.saturating_add(final_score);
        self.best_score = self.best_score.max(final_score);
    }

    /// Counts a move if it changed the board. Returns true when the new total
    /// lands on a multiple of [`MOVE_MILESTONE_INTERVAL`].
    pub fn apply_move(&mut self, moved: bool) -> bool {
        if !moved {
            return false;
        }
        self.total_moves = self.total_moves.saturating_add(1);
        self.total_moves % MOVE_MILESTONE_INTERVAL == 0
    }

    /// Raises the running maximum tile. Returns true only on a strict increase.
    pub fn apply_tile_created(&mut self, value: u32) -> bool {
        if value > self.highest_tile {
            self.highest_tile = value;
            true
        } else {
            false
        }
    }

    /// Win rate as a percentage with one decimal, `"0.0"` before the first game.
    pub fn win_rate_percent(&self) -> String {
        if self.games_played == 0 {
            return "0.0".to_string();
        }
        let tenths = rounded_ratio(u64::from(self.games_won) * 1000, u64::from(self.games_played));
        format!("{}.{}", tenths / 10, tenths % 10)
    }

    /// Mean score per game rounded to an integer, `"0"` before the first game.
    pub fn average_score(&self) -> String {
        if self.games_played == 0 {
            return "0".to_string();
        }
        rounded_ratio(self.total_score, u64::from(self.games_played)).to_string()
    }

    /// Restores the record invariants after loading untrusted data.
    pub fn normalized(mut self) -> Self {
        self.highest_tile = self.highest_tile.max(STARTING_TILE);
        self.games_won = self.games_won.min(self.games_played);
        self.total_score = self.total_score.max(self.best_score);
        self
    }

    pub fn is_consistent(&self) -> bool {
        self.games_won <= self.games_played
            && self.best_score <= self.total_score
            && self.highest_tile >= STARTING_TILE
    }
}

// Round-half-up integer division.
fn rounded_ratio(numerator: u64, denominator: u64) -> u64 {
    let numerator = u128::from(numerator);
    let denominator = u128::from(denominator);
    ((numerator * 2 + denominator) / (denominator * 2)) as u64
}

/// What the statistics panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsView {
    pub games_played: u32,
    pub total_moves: u64,
    pub highest_tile: u32,
    pub win_rate_percent: String,
    pub average_score: String,
}

impl From<&Statistics> for StatisticsView {
    fn from(stats: &Statistics) -> Self {
        Self {
            games_played: stats.games_played,
            total_moves: stats.total_moves,
            highest_tile: stats.highest_tile,
            win_rate_percent: stats.win_rate_percent(),
            average_score: stats.average_score(),
        }
    }
}
