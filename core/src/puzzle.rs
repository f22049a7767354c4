//! Daily puzzle records produced by the daily system.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Difficulty, GridCell, Objective, PieceShape, Rewards};

/// Identity of a daily puzzle: the calendar date and the seed derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PuzzleId {
    date: NaiveDate,
    seed: u64,
}

impl PuzzleId {
    /// Creates a new puzzle identifier.
    #[must_use]
    pub const fn new(date: NaiveDate, seed: u64) -> Self {
        Self { date, seed }
    }

    /// Calendar date the puzzle belongs to.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Seed derived from the date.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:016x}", self.date.format("%Y%m%d"), self.seed)
    }
}

/// Closed set of daily puzzle categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PuzzleCategory {
    /// Clear a nearly complete line within a handful of moves.
    ClearInOne,
    /// Build a named board shape.
    PatternMatch,
    /// Reach a score around scattered obstacles.
    BlockBreaker,
    /// Land a multi-line clear.
    ComboBuilder,
    /// Outlast the countdown.
    Survival,
    /// Clear lines with a restricted piece set.
    Constraint,
}

impl PuzzleCategory {
    /// Every category in draw order.
    pub const ALL: [PuzzleCategory; 6] = [
        PuzzleCategory::ClearInOne,
        PuzzleCategory::PatternMatch,
        PuzzleCategory::BlockBreaker,
        PuzzleCategory::ComboBuilder,
        PuzzleCategory::Survival,
        PuzzleCategory::Constraint,
    ];
}

/// Difficulty tier of a daily puzzle, fixed per weekday.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PuzzleDifficulty {
    /// Midweek tier.
    Easy,
    /// Shoulder-day tier.
    Medium,
    /// Friday tier.
    Hard,
    /// Weekend tier.
    Expert,
}

impl PuzzleDifficulty {
    /// Zero-based rank used to index per-tier tables.
    #[must_use]
    pub const fn rank(&self) -> usize {
        match self {
            PuzzleDifficulty::Easy => 0,
            PuzzleDifficulty::Medium => 1,
            PuzzleDifficulty::Hard => 2,
            PuzzleDifficulty::Expert => 3,
        }
    }

    /// Obstacle difficulty fed to the pattern generator for this tier.
    #[must_use]
    pub const fn pattern_difficulty(&self) -> Difficulty {
        match self {
            PuzzleDifficulty::Easy => Difficulty::new(3),
            PuzzleDifficulty::Medium => Difficulty::new(6),
            PuzzleDifficulty::Hard => Difficulty::new(9),
            PuzzleDifficulty::Expert => Difficulty::new(12),
        }
    }
}

/// Immutable daily puzzle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Date and seed identity.
    pub id: PuzzleId,
    /// Category drawn from the seeded stream.
    pub category: PuzzleCategory,
    /// Weekday-derived difficulty tier.
    pub difficulty: PuzzleDifficulty,
    /// Side length of the square board.
    pub grid_size: u32,
    /// Cells placed on the board before the first move.
    pub prefill: Vec<GridCell>,
    /// Win condition.
    pub objective: Objective,
    /// Pieces the engine may deal.
    pub available_pieces: Vec<PieceShape>,
    /// Maximum number of placements, or `None` when unlimited.
    pub move_limit: Option<u32>,
    /// Countdown length in whole seconds, or `None` when untimed.
    pub time_limit_secs: Option<u32>,
    /// Move count a strong player completes the puzzle in.
    pub par_moves: u32,
    /// Seconds a strong player completes the puzzle in.
    pub par_time_secs: u32,
    /// Rewards granted on completion.
    pub rewards: Rewards,
}
