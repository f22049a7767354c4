#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic campaign construction.
//!
//! The builder turns a [`CatalogConfig`] into worlds of fifteen levels each.
//! Every level draws its obstacle layout from a seed derived from its world and
//! in-pack index, so two builds with the same configuration are identical.

mod config;

use gridlock_core::{
    Difficulty, Level, LevelConstraints, LevelId, LevelPack, LevelType, Objective, ObjectiveKind,
    PackId, PackTheme, PatternKind, PieceShape, ProgressBook, Rewards, SplitMix64, StarKind,
    StarRequirement, UnlockRequirement, BLOCK_PALETTE, BOSS_LEVEL_INDEX, LEVELS_PER_PACK,
};
use gridlock_system_patterns::generate;
use log::{debug, info};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use config::{CatalogConfig, TypeWeights};

/// Pattern kinds assigned round-robin to regular levels.
pub const LEVEL_PATTERNS: [PatternKind; 10] = [
    PatternKind::Empty,
    PatternKind::Corners,
    PatternKind::Borders,
    PatternKind::Checkerboard,
    PatternKind::Cross,
    PatternKind::Diagonal,
    PatternKind::LShape,
    PatternKind::Scattered,
    PatternKind::Frame,
    PatternKind::Clusters,
];

/// Pattern kinds reserved for boss levels, indexed by world.
pub const BOSS_PATTERNS: [PatternKind; 3] =
    [PatternKind::Spiral, PatternKind::Maze, PatternKind::Symmetrical];

/// Difficulty steps a boss sits above its world's base difficulty.
pub const BOSS_DIFFICULTY_STEPS: u8 = 5;

const PACK_TITLES: [&str; 10] = [
    "First Steps",
    "Corner Stones",
    "Crossroads",
    "Checkered Plains",
    "Diagonal Drift",
    "Frameworks",
    "Spiral Hills",
    "Maze Gardens",
    "Mirror Lake",
    "Cluster Peaks",
];

/// Errors raised while building or checking a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Tuning data cannot produce a coherent campaign.
    #[error("invalid catalog configuration: {0}")]
    InvalidConfig(String),
    /// A pack does not hold exactly one level per index.
    #[error("pack {pack} holds {found} levels, expected {expected}")]
    PackSize {
        /// Offending pack.
        pack: u32,
        /// Number of levels found.
        found: usize,
        /// Number of levels required.
        expected: usize,
    },
    /// A regular level is harder than its pack's boss.
    #[error("level {level} is harder than the boss of pack {pack}")]
    BossNotHardest {
        /// Offending pack.
        pack: u32,
        /// Level that outranks the boss.
        level: u32,
    },
    /// A star requirement is looser than the one before it.
    #[error("level {level} star requirement {position} is looser than its predecessor")]
    StarOrdering {
        /// Offending level.
        level: u32,
        /// One-based position of the looser requirement.
        position: usize,
    },
}

/// Immutable campaign of level packs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    packs: Vec<LevelPack>,
}

impl Catalog {
    /// Wraps already constructed packs, for instance hydrated from a file.
    #[must_use]
    pub fn from_packs(packs: Vec<LevelPack>) -> Self {
        Self { packs }
    }

    /// Packs in world order.
    #[must_use]
    pub fn packs(&self) -> &[LevelPack] {
        &self.packs
    }

    /// Retrieves a pack by identifier.
    #[must_use]
    pub fn pack(&self, id: PackId) -> Option<&LevelPack> {
        self.packs.iter().find(|pack| pack.id == id)
    }

    /// Retrieves a level by identifier.
    #[must_use]
    pub fn level(&self, id: LevelId) -> Option<&Level> {
        let ordinal = id.get().checked_sub(1)?;
        let per_pack = u32::from(LEVELS_PER_PACK);
        let pack = self.pack(PackId::new(ordinal / per_pack + 1))?;
        let index = u8::try_from(ordinal % per_pack + 1).ok()?;
        pack.level(index).filter(|level| level.id == id)
    }

    /// Iterates over every level in campaign order.
    pub fn levels(&self) -> impl Iterator<Item = &Level> + '_ {
        self.packs.iter().flat_map(|pack| pack.levels.iter())
    }

    /// Level that follows `id` in campaign order, crossing pack boundaries.
    #[must_use]
    pub fn next_level(&self, id: LevelId) -> Option<&Level> {
        self.level(LevelId::new(id.get().checked_add(1)?))
    }

    /// Number of levels across every pack.
    #[must_use]
    pub fn total_levels(&self) -> usize {
        self.packs.iter().map(|pack| pack.levels.len()).sum()
    }

    /// Maximum number of stars the campaign can award.
    #[must_use]
    pub fn max_stars(&self) -> u32 {
        self.packs.iter().map(LevelPack::max_stars).sum()
    }

    /// Reports whether the level's unlock requirement is met by the progress.
    ///
    /// Unknown levels are never unlocked.
    #[must_use]
    pub fn is_unlocked(&self, id: LevelId, progress: &ProgressBook) -> bool {
        let Some(level) = self.level(id) else {
            return false;
        };
        match level.unlock {
            UnlockRequirement::None => true,
            UnlockRequirement::PriorLevel(prior) => progress.is_completed(prior),
            UnlockRequirement::TotalStars(stars) => progress.total_stars() >= stars,
            UnlockRequirement::PackCompleted(pack) => self.pack(pack).map_or(false, |pack| {
                pack.levels
                    .iter()
                    .all(|level| progress.is_completed(level.id))
            }),
        }
    }
}

/// Builds the campaign from tuning data.
#[derive(Clone, Debug, Default)]
pub struct LevelCatalogBuilder {
    config: CatalogConfig,
}

impl LevelCatalogBuilder {
    /// Creates a builder after validating the configuration.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration the builder was created with.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Builds every world and checks the pack shape and star ordering.
    pub fn build(&self) -> Result<Catalog, CatalogError> {
        let packs = (1..=self.config.worlds)
            .map(|world| self.build_pack(PackId::new(world)))
            .collect::<Vec<_>>();
        for pack in &packs {
            verify_pack_shape(pack)?;
        }

        let catalog = Catalog::from_packs(packs);
        verify_star_ordering(&catalog)?;
        info!(
            "built catalog: {} worlds, {} levels, {} stars",
            catalog.packs().len(),
            catalog.total_levels(),
            catalog.max_stars()
        );
        Ok(catalog)
    }

    /// Builds a single world.
    #[must_use]
    pub fn build_pack(&self, world: PackId) -> LevelPack {
        let number = world.get();
        let levels = (1..=LEVELS_PER_PACK)
            .map(|index| self.build_level(world, index))
            .collect();
        LevelPack {
            id: world,
            title: pack_title(number),
            theme: PackTheme {
                accent: BLOCK_PALETTE[number.saturating_sub(1) as usize % BLOCK_PALETTE.len()],
                icon: format!("pack-{number}"),
            },
            xp_reward: self.config.pack_xp.saturating_mul(number),
            coin_reward: self.config.pack_coins.saturating_mul(number),
            completion_reward: Rewards {
                xp: 0,
                coins: 0,
                unlock_token: Some(format!("theme-{number}")),
            },
            levels,
        }
    }

    /// Builds the level at the one-based index of the world.
    #[must_use]
    pub fn build_level(&self, world: PackId, index: u8) -> Level {
        let config = &self.config;
        let number = world.get();
        let boss = index == BOSS_LEVEL_INDEX;
        let base = config.world_base_difficulty(number);
        let difficulty = if boss {
            base.raised(BOSS_DIFFICULTY_STEPS)
        } else {
            base.raised(index.saturating_sub(1) / 3)
        };

        let pattern = if boss {
            BOSS_PATTERNS[number.saturating_sub(1) as usize % BOSS_PATTERNS.len()]
        } else {
            let slot = number.wrapping_mul(u32::from(LEVELS_PER_PACK)) + u32::from(index);
            LEVEL_PATTERNS[slot as usize % LEVEL_PATTERNS.len()]
        };

        let roll = (number.wrapping_mul(17) + u32::from(index) * 7) % 100;
        let mut level_type = config.type_weights.pick(roll);
        if level_type == LevelType::ClearTarget && pattern == PatternKind::Empty {
            // Nothing to clear on an empty board.
            level_type = LevelType::Obstacle;
        }

        let seed = level_seed(world, index);
        let mut rng = SplitMix64::new(seed);
        let layout = generate(config.grid_size, difficulty, pattern, &mut rng);
        let move_limit = config.move_limit(difficulty);
        let lines = 2 + u32::from(difficulty.get()) / 2;

        let moves_only = LevelConstraints {
            move_limit: Some(move_limit),
            ..LevelConstraints::default()
        };
        let (objective, constraints, prefill) = match level_type {
            LevelType::Obstacle => (
                Objective::new(ObjectiveKind::ClearLines, lines),
                moves_only,
                layout.to_locked_cells(),
            ),
            LevelType::ClearTarget => (
                Objective::new(ObjectiveKind::ClearAllBlocks, 1),
                moves_only,
                layout.to_block_cells(),
            ),
            LevelType::Timed => {
                let seconds = config.time_limit_secs(difficulty);
                (
                    Objective::new(
                        ObjectiveKind::ReachScore,
                        seconds.saturating_mul(config.points_per_second),
                    ),
                    LevelConstraints {
                        time_limit_secs: Some(seconds),
                        ..LevelConstraints::default()
                    },
                    layout.to_locked_cells(),
                )
            }
            LevelType::LimitedPieces => (
                Objective::new(ObjectiveKind::ClearLines, lines),
                LevelConstraints {
                    allowed_pieces: Some(allowed_pieces(difficulty, &mut rng)),
                    ..moves_only
                },
                layout.to_locked_cells(),
            ),
            LevelType::ScoreTarget => (
                Objective::new(
                    ObjectiveKind::ReachScore,
                    move_limit.saturating_mul(config.score_per_move),
                ),
                moves_only,
                layout.to_locked_cells(),
            ),
        };

        let mut rewards = Rewards {
            xp: config.level_xp.saturating_mul(u32::from(difficulty.get())),
            coins: config.level_coins.saturating_mul(u32::from(difficulty.get())),
            unlock_token: None,
        };
        if boss {
            rewards.xp = rewards.xp.saturating_mul(config.boss_reward_multiplier);
            rewards.coins = rewards.coins.saturating_mul(config.boss_reward_multiplier);
            rewards.unlock_token = Some(format!("boss-{number}"));
        }

        let unlock = match (index, number) {
            (1, 1) => UnlockRequirement::None,
            (1, _) => UnlockRequirement::TotalStars(
                number.saturating_sub(1).saturating_mul(config.world_star_gate),
            ),
            _ => UnlockRequirement::PriorLevel(LevelId::from_position(world, index - 1)),
        };

        let id = LevelId::from_position(world, index);
        debug!(
            "level {}: world={} index={} type={:?} pattern={} difficulty={} seed={:#018x}",
            id.get(),
            number,
            index,
            level_type,
            pattern.as_str(),
            difficulty.get(),
            seed
        );

        Level {
            id,
            pack_id: world,
            index_in_pack: index,
            title: level_title(number, index, boss),
            description: describe(&objective, &constraints),
            level_type,
            pattern,
            difficulty,
            difficulty_band: difficulty.band(),
            grid_size: config.grid_size,
            objective,
            star_requirements: star_requirements(&constraints, config),
            constraints,
            prefill,
            rewards,
            unlock,
        }
    }
}

/// Seed of a level's pattern stream: the first eight bytes of
/// `sha256(world, index)` read as little-endian.
#[must_use]
pub fn level_seed(world: PackId, index: u8) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(world.get().to_le_bytes());
    hasher.update(u32::from(index).to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

/// Checks that every star requirement of every level is at least as strict as
/// the one before it.
pub fn verify_star_ordering(catalog: &Catalog) -> Result<(), CatalogError> {
    for level in catalog.levels() {
        for (offset, pair) in level.star_requirements.windows(2).enumerate() {
            if !pair[1].is_at_least_as_strict_as(&pair[0]) {
                return Err(CatalogError::StarOrdering {
                    level: level.id.get(),
                    position: offset + 2,
                });
            }
        }
    }
    Ok(())
}

fn verify_pack_shape(pack: &LevelPack) -> Result<(), CatalogError> {
    let expected = usize::from(LEVELS_PER_PACK);
    let indices_match = pack
        .levels
        .iter()
        .zip(1..=LEVELS_PER_PACK)
        .all(|(level, index)| level.index_in_pack == index);
    if pack.levels.len() != expected || !indices_match {
        return Err(CatalogError::PackSize {
            pack: pack.id.get(),
            found: pack.levels.len(),
            expected,
        });
    }

    let boss_difficulty = pack.boss().map_or(Difficulty::MIN, |boss| boss.difficulty);
    if let Some(level) = pack
        .levels
        .iter()
        .find(|level| level.difficulty > boss_difficulty)
    {
        return Err(CatalogError::BossNotHardest {
            pack: pack.id.get(),
            level: level.id.get(),
        });
    }
    Ok(())
}

fn star_requirements(constraints: &LevelConstraints, config: &CatalogConfig) -> [StarRequirement; 3] {
    let (kind, budget) = match (constraints.time_limit_secs, constraints.move_limit) {
        (Some(seconds), _) => (StarKind::TimeRemaining, seconds),
        (None, Some(moves)) => (StarKind::MovesRemaining, moves),
        (None, None) => (StarKind::MovesRemaining, 0),
    };
    let share = |percent: u32| (budget.saturating_mul(percent) + 99) / 100;
    [
        StarRequirement::objective_completed(),
        StarRequirement::new(kind, share(config.two_star_percent)),
        StarRequirement::new(kind, share(config.three_star_percent)),
    ]
}

/// Shuffled subset of pieces that shrinks as difficulty rises.
fn allowed_pieces(difficulty: Difficulty, rng: &mut SplitMix64) -> Vec<PieceShape> {
    let count = 7usize
        .saturating_sub(usize::from(difficulty.get()) / 2)
        .max(3);
    let mut pieces = PieceShape::ALL.to_vec();
    rng.shuffle(&mut pieces);
    pieces.truncate(count);
    pieces.sort_unstable();
    pieces
}

fn pack_title(number: u32) -> String {
    number
        .checked_sub(1)
        .and_then(|slot| PACK_TITLES.get(slot as usize))
        .map_or_else(|| format!("World {number}"), |title| (*title).to_owned())
}

fn level_title(number: u32, index: u8, boss: bool) -> String {
    if boss {
        format!("{} Boss", pack_title(number))
    } else {
        format!("{} {}-{}", pack_title(number), number, index)
    }
}

fn describe(objective: &Objective, constraints: &LevelConstraints) -> String {
    let goal = match objective.kind {
        ObjectiveKind::ClearLines => format!("Clear {} lines", objective.target),
        ObjectiveKind::ClearAllBlocks => "Clear every block".to_owned(),
        ObjectiveKind::ReachScore => format!("Score {} points", objective.target),
        other => format!("Complete {other:?} {}", objective.target),
    };
    match (constraints.move_limit, constraints.time_limit_secs) {
        (_, Some(seconds)) => format!("{goal} within {seconds} seconds."),
        (Some(moves), None) => format!("{goal} in {moves} moves."),
        (None, None) => format!("{goal}."),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe, level_seed, star_requirements, CatalogConfig};
    use gridlock_core::{
        LevelConstraints, Objective, ObjectiveKind, PackId, StarKind, StarRequirement,
    };

    #[test]
    fn level_seeds_differ_by_position() {
        let first = level_seed(PackId::new(1), 1);
        assert_eq!(first, level_seed(PackId::new(1), 1));
        assert_ne!(first, level_seed(PackId::new(1), 2));
        assert_ne!(first, level_seed(PackId::new(2), 1));
    }

    #[test]
    fn star_thresholds_round_budget_shares_up() {
        let constraints = LevelConstraints {
            move_limit: Some(5),
            ..LevelConstraints::default()
        };
        let stars = star_requirements(&constraints, &CatalogConfig::default());
        assert_eq!(
            stars,
            [
                StarRequirement::objective_completed(),
                StarRequirement::new(StarKind::MovesRemaining, 2),
                StarRequirement::new(StarKind::MovesRemaining, 3),
            ]
        );
    }

    #[test]
    fn timed_levels_rate_remaining_time() {
        let constraints = LevelConstraints {
            time_limit_secs: Some(90),
            ..LevelConstraints::default()
        };
        let stars = star_requirements(&constraints, &CatalogConfig::default());
        assert_eq!(stars[1], StarRequirement::new(StarKind::TimeRemaining, 27));
        assert_eq!(stars[2], StarRequirement::new(StarKind::TimeRemaining, 54));
    }

    #[test]
    fn descriptions_mention_budgets() {
        let constraints = LevelConstraints {
            move_limit: Some(14),
            ..LevelConstraints::default()
        };
        let objective = Objective::new(ObjectiveKind::ClearLines, 3);
        assert_eq!(describe(&objective, &constraints), "Clear 3 lines in 14 moves.");
    }
}
