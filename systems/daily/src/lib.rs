#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Offline daily puzzle generation.
//!
//! A puzzle is a pure function of its calendar date. The date string is hashed
//! into a seed, the seed drives a [`SplitMix64`] stream, and every choice after
//! that is drawn from the stream. No network access or stored state is needed
//! to reproduce any day's puzzle on any device.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use gridlock_core::{
    CellCoord, Difficulty, GridCell, Objective, ObjectiveKind, PatternKind, PieceShape, Puzzle,
    PuzzleCategory, PuzzleDifficulty, PuzzleId, Rewards, ShapePattern, SplitMix64, BLOCK_PALETTE,
};
use gridlock_system_patterns::generate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the gap left in a clear-in-one row.
const CLEAR_IN_ONE_GAP: u32 = 3;

/// Seconds a strong player spends per move, used for par times.
const SECONDS_PER_PAR_MOVE: u32 = 6;

/// Tuning data for daily puzzles. Per-tier tables are indexed by
/// [`PuzzleDifficulty::rank`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyConfig {
    /// Side length of every puzzle board.
    pub grid_size: u32,
    /// Number of trailing days kept in the archive.
    pub archive_days: u32,
    /// Move budgets of clear-in-one puzzles.
    pub clear_in_one_moves: [u32; 4],
    /// Move budgets of pattern-match puzzles.
    pub pattern_match_moves: [u32; 4],
    /// Score targets of block-breaker puzzles.
    pub block_breaker_scores: [u32; 4],
    /// Move budgets of block-breaker puzzles.
    pub block_breaker_moves: [u32; 4],
    /// Combo targets of combo-builder puzzles.
    pub combo_targets: [u32; 4],
    /// Move budgets of combo-builder puzzles.
    pub combo_moves: [u32; 4],
    /// Countdown lengths of survival puzzles.
    pub survival_secs: [u32; 4],
    /// Line targets of constraint puzzles.
    pub constraint_lines: [u32; 4],
    /// Number of piece shapes dealt in constraint puzzles.
    pub constraint_pieces: usize,
    /// Experience per tier rank, starting from one.
    pub xp_per_rank: u32,
    /// Coins per tier rank, starting from one.
    pub coins_per_rank: u32,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            archive_days: 7,
            clear_in_one_moves: [3, 2, 1, 1],
            pattern_match_moves: [20, 16, 12, 10],
            block_breaker_scores: [150, 250, 400, 400],
            block_breaker_moves: [20, 25, 30, 30],
            combo_targets: [2, 3, 3, 4],
            combo_moves: [10, 12, 12, 14],
            survival_secs: [60, 90, 120, 150],
            constraint_lines: [3, 4, 5, 6],
            constraint_pieces: 3,
            xp_per_rank: 50,
            coins_per_rank: 20,
        }
    }
}

/// Signed 64-bit hash of the date's `yyyyMMdd` form.
///
/// The hash is the first eight bytes of the SHA-256 digest read as a
/// little-endian `i64`. SHA-256 does not depend on the process, platform or
/// compiler version, so every device derives the same value.
#[must_use]
pub fn signed_date_hash(date: NaiveDate) -> i64 {
    let key = date.format("%Y%m%d").to_string();
    let digest = Sha256::digest(key.as_bytes());
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    i64::from_le_bytes(bytes)
}

/// Seed of the date's puzzle stream.
///
/// Negative hashes are reinterpreted bit for bit. Taking the magnitude instead
/// would map `h` and `-h` onto the same seed.
#[must_use]
pub fn date_seed(date: NaiveDate) -> u64 {
    signed_date_hash(date) as u64
}

/// Difficulty tier of the date: easiest midweek, hardest on the weekend.
#[must_use]
pub fn difficulty_for(date: NaiveDate) -> PuzzleDifficulty {
    match date.weekday() {
        Weekday::Tue | Weekday::Wed => PuzzleDifficulty::Easy,
        Weekday::Mon | Weekday::Thu => PuzzleDifficulty::Medium,
        Weekday::Fri => PuzzleDifficulty::Hard,
        Weekday::Sat | Weekday::Sun => PuzzleDifficulty::Expert,
    }
}

/// Generates one puzzle per calendar day.
#[derive(Clone, Debug, Default)]
pub struct DailyPuzzleGenerator {
    config: DailyConfig,
}

struct Layout {
    objective: Objective,
    prefill: Vec<GridCell>,
    available_pieces: Vec<PieceShape>,
    move_limit: Option<u32>,
    time_limit_secs: Option<u32>,
}

impl DailyPuzzleGenerator {
    /// Creates a generator with the provided tuning data.
    #[must_use]
    pub fn new(config: DailyConfig) -> Self {
        Self { config }
    }

    /// Tuning data the generator was created with.
    #[must_use]
    pub fn config(&self) -> &DailyConfig {
        &self.config
    }

    /// Generates the puzzle of the given date.
    #[must_use]
    pub fn puzzle_for(&self, date: NaiveDate) -> Puzzle {
        let seed = date_seed(date);
        let mut rng = SplitMix64::new(seed);
        let difficulty = difficulty_for(date);
        let rank = difficulty.rank();
        let category_count = PuzzleCategory::ALL.len() as u32;
        let category = PuzzleCategory::ALL[rng.next_below(category_count) as usize];
        debug!("daily seed for {date}: {seed:#018x}");

        let layout = match category {
            PuzzleCategory::ClearInOne => self.clear_in_one(rank, &mut rng),
            PuzzleCategory::PatternMatch => self.pattern_match(rank, &mut rng),
            PuzzleCategory::BlockBreaker => self.block_breaker(difficulty, &mut rng),
            PuzzleCategory::ComboBuilder => self.combo_builder(rank, &mut rng),
            PuzzleCategory::Survival => self.survival(difficulty, &mut rng),
            PuzzleCategory::Constraint => self.constraint(rank, &mut rng),
        };

        let par_moves = match category {
            PuzzleCategory::ClearInOne => 1,
            _ => layout.move_limit.map_or(0, |limit| limit.div_ceil(2)),
        };
        let par_time_secs = layout
            .time_limit_secs
            .unwrap_or(par_moves * SECONDS_PER_PAR_MOVE);
        let tier = rank as u32 + 1;

        let puzzle = Puzzle {
            id: PuzzleId::new(date, seed),
            category,
            difficulty,
            grid_size: self.config.grid_size,
            prefill: layout.prefill,
            objective: layout.objective,
            available_pieces: layout.available_pieces,
            move_limit: layout.move_limit,
            time_limit_secs: layout.time_limit_secs,
            par_moves,
            par_time_secs,
            rewards: Rewards {
                xp: self.config.xp_per_rank.saturating_mul(tier),
                coins: self.config.coins_per_rank.saturating_mul(tier),
                unlock_token: None,
            },
        };
        info!(
            "daily puzzle {}: {:?} {:?}",
            puzzle.id, puzzle.category, puzzle.difficulty
        );
        puzzle
    }

    /// Puzzles of the trailing days strictly before `today`, newest first.
    #[must_use]
    pub fn archive(&self, today: NaiveDate) -> Vec<Puzzle> {
        (1..=u64::from(self.config.archive_days))
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| self.puzzle_for(date))
            .collect()
    }

    /// A single row filled except for a three-cell gap.
    fn clear_in_one(&self, rank: usize, rng: &mut SplitMix64) -> Layout {
        let size = self.config.grid_size;
        let row = rng.next_below(size);
        let gap_start = rng.next_below(size.saturating_sub(CLEAR_IN_ONE_GAP) + 1);
        let gap = gap_start..gap_start + CLEAR_IN_ONE_GAP;
        let prefill = (0..size)
            .filter(|column| !gap.contains(column))
            .map(|column| {
                let color = BLOCK_PALETTE[column as usize % BLOCK_PALETTE.len()];
                GridCell::block(CellCoord::new(row, column), color)
            })
            .collect();
        Layout {
            objective: Objective::new(ObjectiveKind::ClearLines, 1),
            prefill,
            available_pieces: vec![PieceShape::Single, PieceShape::Domino, PieceShape::TriLine],
            move_limit: Some(self.config.clear_in_one_moves[rank]),
            time_limit_secs: None,
        }
    }

    fn pattern_match(&self, rank: usize, rng: &mut SplitMix64) -> Layout {
        let shape_count = ShapePattern::ALL.len() as u32;
        let shape = ShapePattern::ALL[rng.next_below(shape_count) as usize];
        let target = match shape {
            ShapePattern::ParityCount => 6 + 2 * rank as u32,
            _ => 1,
        };
        Layout {
            objective: Objective::create_pattern(shape, target),
            prefill: Vec::new(),
            available_pieces: PieceShape::ALL.to_vec(),
            move_limit: Some(self.config.pattern_match_moves[rank]),
            time_limit_secs: None,
        }
    }

    fn block_breaker(&self, difficulty: PuzzleDifficulty, rng: &mut SplitMix64) -> Layout {
        let rank = difficulty.rank();
        let obstacles = generate(
            self.config.grid_size,
            difficulty.pattern_difficulty(),
            PatternKind::Scattered,
            rng,
        );
        Layout {
            objective: Objective::new(
                ObjectiveKind::ReachScore,
                self.config.block_breaker_scores[rank],
            ),
            prefill: obstacles.to_locked_cells(),
            available_pieces: PieceShape::ALL.to_vec(),
            move_limit: Some(self.config.block_breaker_moves[rank]),
            time_limit_secs: None,
        }
    }

    /// Loose clearable blocks that reward multi-line placements.
    fn combo_builder(&self, rank: usize, rng: &mut SplitMix64) -> Layout {
        let density = Difficulty::new(2 * rank as u8 + 1);
        let blocks = generate(self.config.grid_size, density, PatternKind::Scattered, rng);
        Layout {
            objective: Objective::new(ObjectiveKind::AchieveCombo, self.config.combo_targets[rank]),
            prefill: blocks.to_block_cells(),
            available_pieces: PieceShape::ALL.to_vec(),
            move_limit: Some(self.config.combo_moves[rank]),
            time_limit_secs: None,
        }
    }

    fn survival(&self, difficulty: PuzzleDifficulty, rng: &mut SplitMix64) -> Layout {
        let seconds = self.config.survival_secs[difficulty.rank()];
        let obstacles = generate(
            self.config.grid_size,
            difficulty.pattern_difficulty(),
            PatternKind::Clusters,
            rng,
        );
        Layout {
            objective: Objective::new(ObjectiveKind::SurviveTime, seconds),
            prefill: obstacles.to_locked_cells(),
            available_pieces: PieceShape::ALL.to_vec(),
            move_limit: None,
            time_limit_secs: Some(seconds),
        }
    }

    /// Line clearing with a small shuffled piece subset. Harder tiers get less
    /// slack over three moves per line.
    fn constraint(&self, rank: usize, rng: &mut SplitMix64) -> Layout {
        let lines = self.config.constraint_lines[rank];
        let slack = 2 * (3u32.saturating_sub(rank as u32));
        let mut pieces = PieceShape::ALL.to_vec();
        rng.shuffle(&mut pieces);
        pieces.truncate(self.config.constraint_pieces.max(1));
        pieces.sort_unstable();
        Layout {
            objective: Objective::new(ObjectiveKind::ClearLines, lines),
            prefill: Vec::new(),
            available_pieces: pieces,
            move_limit: Some(lines * 3 + slack),
            time_limit_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use gridlock_core::PuzzleDifficulty;

    use super::{date_seed, difficulty_for, signed_date_hash};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn neighbouring_days_get_distinct_seeds() {
        assert_ne!(date_seed(date(2025, 1, 1)), date_seed(date(2025, 1, 2)));
    }

    #[test]
    fn negative_hashes_are_bit_reinterpreted() {
        let start = date(2025, 1, 1);
        let negative = start
            .iter_days()
            .take(256)
            .find(|day| signed_date_hash(*day) < 0)
            .expect("some date hashes negative");
        let hash = signed_date_hash(negative);
        let seed = date_seed(negative);
        assert_eq!(seed, hash as u64);
        assert!(seed > i64::MAX as u64);
        assert_ne!(seed, hash.unsigned_abs());
    }

    #[test]
    fn weekday_sets_difficulty() {
        // 2025-01-06 is a Monday.
        let expected = [
            PuzzleDifficulty::Medium,
            PuzzleDifficulty::Easy,
            PuzzleDifficulty::Easy,
            PuzzleDifficulty::Medium,
            PuzzleDifficulty::Hard,
            PuzzleDifficulty::Expert,
            PuzzleDifficulty::Expert,
        ];
        for (offset, difficulty) in expected.into_iter().enumerate() {
            let day = date(2025, 1, 6 + offset as u32);
            assert_eq!(difficulty_for(day), difficulty, "{day}");
        }
    }
}
