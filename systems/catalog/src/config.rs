use gridlock_core::{Difficulty, LevelType, LEVELS_PER_PACK, STARS_PER_LEVEL};
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Tuning data driving catalog construction.
///
/// Every field has a default, so a partial TOML `[catalog]` table only needs
/// to name the values it overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Number of worlds (packs) in the campaign.
    pub worlds: u32,
    /// Side length of every level board.
    pub grid_size: u32,
    /// Base difficulty added per world after the first.
    pub world_difficulty_step: u8,
    /// Move budgets indexed by difficulty minus one. Clamped to the last entry.
    pub move_limits: Vec<u32>,
    /// Countdown lengths of timed levels indexed by difficulty minus one.
    pub time_limits_secs: Vec<u32>,
    /// Share of the budget that must remain for two stars, in percent.
    pub two_star_percent: u32,
    /// Share of the budget that must remain for three stars, in percent.
    pub three_star_percent: u32,
    /// Score expected per move when deriving score targets.
    pub score_per_move: u32,
    /// Score expected per second when deriving timed targets.
    pub points_per_second: u32,
    /// Experience per difficulty point awarded by a level.
    pub level_xp: u32,
    /// Coins per difficulty point awarded by a level.
    pub level_coins: u32,
    /// Multiplier applied to boss level rewards.
    pub boss_reward_multiplier: u32,
    /// Experience per world number awarded on pack completion.
    pub pack_xp: u32,
    /// Coins per world number awarded on pack completion.
    pub pack_coins: u32,
    /// Stars required per completed world to open the next one.
    pub world_star_gate: u32,
    /// Weighted distribution of level types.
    pub type_weights: TypeWeights,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            worlds: 10,
            grid_size: 8,
            world_difficulty_step: 1,
            move_limits: vec![12, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32, 35],
            time_limits_secs: vec![60, 70, 80, 90, 100, 110, 120, 130, 140, 150, 165, 180],
            two_star_percent: 30,
            three_star_percent: 60,
            score_per_move: 10,
            points_per_second: 5,
            level_xp: 10,
            level_coins: 5,
            boss_reward_multiplier: 3,
            pack_xp: 250,
            pack_coins: 100,
            world_star_gate: 30,
            type_weights: TypeWeights::default(),
        }
    }
}

impl CatalogConfig {
    /// Rejects tuning data that cannot produce a coherent campaign.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| Err(CatalogError::InvalidConfig(reason.to_owned()));

        if self.worlds == 0 {
            return invalid("at least one world is required");
        }
        if self.grid_size < 4 {
            return invalid("grid size must be at least 4");
        }
        if self.move_limits.is_empty() || self.move_limits.contains(&0) {
            return invalid("move limit table must be non-empty and positive");
        }
        if self.move_limits.windows(2).any(|pair| pair[0] > pair[1]) {
            return invalid("move limit table must be ascending");
        }
        if self.time_limits_secs.is_empty() || self.time_limits_secs.contains(&0) {
            return invalid("time limit table must be non-empty and positive");
        }
        if self.two_star_percent == 0
            || self.two_star_percent >= self.three_star_percent
            || self.three_star_percent > 100
        {
            return invalid("star fractions must satisfy 0 < two < three <= 100");
        }
        if self.score_per_move == 0 || self.points_per_second == 0 {
            return invalid("score rates must be positive");
        }
        let pack_stars = u32::from(LEVELS_PER_PACK) * u32::from(STARS_PER_LEVEL);
        if self.world_star_gate == 0 || self.world_star_gate > pack_stars {
            return invalid("world star gate must be between 1 and the stars of one pack");
        }
        if self.type_weights.total() != 100 {
            return invalid("level type weights must sum to 100");
        }
        Ok(())
    }

    /// Base difficulty of the world's first level.
    #[must_use]
    pub fn world_base_difficulty(&self, world: u32) -> Difficulty {
        let steps = world.saturating_sub(1) * u32::from(self.world_difficulty_step);
        Difficulty::new(1u32.saturating_add(steps).min(u32::from(u8::MAX)) as u8)
    }

    /// Move budget for the difficulty, clamped to the table bounds.
    #[must_use]
    pub fn move_limit(&self, difficulty: Difficulty) -> u32 {
        table_lookup(&self.move_limits, difficulty)
    }

    /// Countdown length for the difficulty, clamped to the table bounds.
    #[must_use]
    pub fn time_limit_secs(&self, difficulty: Difficulty) -> u32 {
        table_lookup(&self.time_limits_secs, difficulty)
    }
}

fn table_lookup(table: &[u32], difficulty: Difficulty) -> u32 {
    let index = usize::from(difficulty.get().saturating_sub(1));
    table
        .get(index)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(0)
}

/// Percent weights of each level type. Must sum to 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeWeights {
    /// Share of obstacle levels.
    pub obstacle: u32,
    /// Share of clear-target levels.
    pub clear_target: u32,
    /// Share of timed levels.
    pub timed: u32,
    /// Share of limited-pieces levels.
    pub limited_pieces: u32,
    /// Share of score-target levels.
    pub score_target: u32,
}

impl Default for TypeWeights {
    fn default() -> Self {
        Self {
            obstacle: 40,
            clear_target: 25,
            timed: 15,
            limited_pieces: 10,
            score_target: 10,
        }
    }
}

impl TypeWeights {
    fn total(&self) -> u32 {
        self.obstacle + self.clear_target + self.timed + self.limited_pieces + self.score_target
    }

    /// Maps a roll in `0..100` onto the cumulative bands.
    #[must_use]
    pub fn pick(&self, roll: u32) -> LevelType {
        let bands = [
            (self.obstacle, LevelType::Obstacle),
            (self.clear_target, LevelType::ClearTarget),
            (self.timed, LevelType::Timed),
            (self.limited_pieces, LevelType::LimitedPieces),
        ];
        let mut ceiling = 0;
        for (weight, level_type) in bands {
            ceiling += weight;
            if roll < ceiling {
                return level_type;
            }
        }
        LevelType::ScoreTarget
    }
}
