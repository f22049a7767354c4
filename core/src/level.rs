//! Campaign level records produced by the catalog system.

use serde::{Deserialize, Serialize};

use crate::{
    BlockColor, Difficulty, GridCell, PatternKind, PieceShape, BOSS_LEVEL_INDEX, LEVELS_PER_PACK,
};

/// Maximum number of stars a single level can award.
pub const STARS_PER_LEVEL: u8 = 3;

/// Unique identifier assigned to a level across the whole campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Derives the campaign-wide identifier from a pack and in-pack index.
    ///
    /// Identifiers are dense and ordered: pack 1 holds ids 1..=15, pack 2 holds
    /// 16..=30 and so on.
    #[must_use]
    pub const fn from_position(pack: PackId, index_in_pack: u8) -> Self {
        let pack_offset = pack.get().saturating_sub(1) * LEVELS_PER_PACK as u32;
        Self(pack_offset + index_in_pack as u32)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a level pack (world).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackId(u32);

impl PackId {
    /// Creates a new pack identifier. Packs are numbered from one.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Coarse presentation band derived from a [`Difficulty`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DifficultyBand {
    /// Difficulty 1–2.
    Beginner,
    /// Difficulty 3–4.
    Easy,
    /// Difficulty 5–6.
    Medium,
    /// Difficulty 7–8.
    Hard,
    /// Difficulty 9–10.
    Expert,
    /// Difficulty 11–12.
    Master,
}

/// Gameplay archetype assigned to a catalog level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelType {
    /// Clear lines around locked obstacles.
    Obstacle,
    /// Clear every prefilled block.
    ClearTarget,
    /// Reach a score before the clock runs out.
    Timed,
    /// Clear lines with a restricted piece set.
    LimitedPieces,
    /// Reach a score within the move budget.
    ScoreTarget,
}

/// Win-condition types understood by the validator and the session runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveKind {
    /// External score must reach the target.
    ReachScore,
    /// Total cleared lines must reach the target.
    ClearLines,
    /// The grid must become empty.
    ClearAllBlocks,
    /// Perfect clears must reach the target.
    PerfectClear,
    /// Largest single-placement clear must reach the target.
    AchieveCombo,
    /// A named board shape must appear.
    CreatePattern,
    /// The grid must become empty within the target number of moves.
    ClearWithMoves,
    /// The player must last until the countdown ends.
    SurviveTime,
    /// The player must last for the target number of moves.
    SurviveMoves,
    /// The target number of prefilled cells must be cleared.
    ClearCells,
}

/// Board shapes a [`ObjectiveKind::CreatePattern`] objective can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapePattern {
    /// Any fully occupied 2×2 block.
    Square,
    /// All four grid corners occupied.
    Corners,
    /// The 2×2 block at the grid center occupied.
    CenterSquare,
    /// Every cell on the main diagonal occupied.
    Diagonal,
    /// Occupied cells on even-parity squares reach the objective target.
    ParityCount,
}

impl ShapePattern {
    /// Every shape pattern in declaration order.
    pub const ALL: [ShapePattern; 5] = [
        ShapePattern::Square,
        ShapePattern::Corners,
        ShapePattern::CenterSquare,
        ShapePattern::Diagonal,
        ShapePattern::ParityCount,
    ];
}

/// Win condition of a level or puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Objective {
    /// Type of the objective.
    pub kind: ObjectiveKind,
    /// Numeric target interpreted according to `kind`.
    pub target: u32,
    /// Shape required by [`ObjectiveKind::CreatePattern`] objectives.
    pub pattern: Option<ShapePattern>,
}

impl Objective {
    /// Creates an objective without a shape reference.
    #[must_use]
    pub const fn new(kind: ObjectiveKind, target: u32) -> Self {
        Self {
            kind,
            target,
            pattern: None,
        }
    }

    /// Creates a [`ObjectiveKind::CreatePattern`] objective.
    #[must_use]
    pub const fn create_pattern(pattern: ShapePattern, target: u32) -> Self {
        Self {
            kind: ObjectiveKind::CreatePattern,
            target,
            pattern: Some(pattern),
        }
    }
}

/// Optional limits applied to a play session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelConstraints {
    /// Maximum number of placements, or `None` when unlimited.
    pub move_limit: Option<u32>,
    /// Countdown length in whole seconds, or `None` when untimed.
    pub time_limit_secs: Option<u32>,
    /// Subset of pieces the engine may deal, or `None` for every piece.
    pub allowed_pieces: Option<Vec<PieceShape>>,
}

/// Measured quantity a [`StarRequirement`] compares against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StarKind {
    /// Final score at least the threshold.
    Score,
    /// Unused moves at least the threshold.
    MovesRemaining,
    /// Unused seconds at least the threshold.
    TimeRemaining,
    /// Holds used at most the threshold.
    NoHoldsUsed,
    /// Undos used at most the threshold.
    NoUndosUsed,
    /// Perfect clears at least the threshold.
    PerfectClears,
    /// Largest combo at least the threshold.
    ComboAchieved,
    /// The objective was completed. The threshold is ignored.
    ObjectiveCompleted,
}

/// One of the three ordered performance thresholds of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StarRequirement {
    /// Quantity that is measured.
    pub kind: StarKind,
    /// Threshold the quantity is compared with.
    pub threshold: u32,
}

impl StarRequirement {
    /// Creates a new star requirement.
    #[must_use]
    pub const fn new(kind: StarKind, threshold: u32) -> Self {
        Self { kind, threshold }
    }

    /// Requirement satisfied by completing the objective.
    #[must_use]
    pub const fn objective_completed() -> Self {
        Self::new(StarKind::ObjectiveCompleted, 1)
    }

    /// Reports whether `self` can follow `previous` without breaking the
    /// increasing-strictness order.
    ///
    /// Every requirement is at least as strict as objective completion, since
    /// stars are only awarded to successful sessions. Requirements of the same
    /// kind must not loosen: thresholds rise for "at least" kinds and fall for
    /// the "at most" hold and undo kinds. Different kinds cannot be compared and
    /// are reported as out of order.
    #[must_use]
    pub fn is_at_least_as_strict_as(&self, previous: &StarRequirement) -> bool {
        if previous.kind == StarKind::ObjectiveCompleted {
            return true;
        }
        if self.kind != previous.kind {
            return false;
        }
        match self.kind {
            StarKind::NoHoldsUsed | StarKind::NoUndosUsed => self.threshold <= previous.threshold,
            _ => self.threshold >= previous.threshold,
        }
    }
}

/// Rewards granted for completing a level or pack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rewards {
    /// Experience points granted.
    pub xp: u32,
    /// Soft currency granted.
    pub coins: u32,
    /// Token unlocking cosmetic or progression content.
    pub unlock_token: Option<String>,
}

/// Gate that must be satisfied before a level can be played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnlockRequirement {
    /// Always playable.
    None,
    /// The referenced level must have been completed.
    PriorLevel(LevelId),
    /// The player must own at least this many stars in total.
    TotalStars(u32),
    /// Every level of the referenced pack must have been completed.
    PackCompleted(PackId),
}

/// Immutable campaign level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Campaign-wide identifier.
    pub id: LevelId,
    /// Pack that owns the level.
    pub pack_id: PackId,
    /// One-based position inside the pack.
    pub index_in_pack: u8,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Gameplay archetype.
    pub level_type: LevelType,
    /// Pattern used to lay out the prefill.
    pub pattern: PatternKind,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Presentation band derived from the difficulty.
    pub difficulty_band: DifficultyBand,
    /// Side length of the square board.
    pub grid_size: u32,
    /// Win condition.
    pub objective: Objective,
    /// Move, time and piece limits.
    pub constraints: LevelConstraints,
    /// Cells placed on the board before the first move.
    pub prefill: Vec<GridCell>,
    /// Ordered one-, two- and three-star requirements.
    pub star_requirements: [StarRequirement; 3],
    /// Rewards granted on completion.
    pub rewards: Rewards,
    /// Gate that must be satisfied before play.
    pub unlock: UnlockRequirement,
}

impl Level {
    /// Reports whether the level is the boss of its pack.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        self.index_in_pack == BOSS_LEVEL_INDEX
    }

    /// Number of locked obstacle cells in the prefill.
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.prefill.iter().filter(|cell| cell.locked).count()
    }
}

/// Visual metadata attached to a pack.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackTheme {
    /// Accent color used by menus.
    pub accent: BlockColor,
    /// Icon asset name.
    pub icon: String,
}

/// Ordered group of fifteen levels sharing a difficulty band and theme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPack {
    /// Pack identifier.
    pub id: PackId,
    /// Display title.
    pub title: String,
    /// Visual metadata.
    pub theme: PackTheme,
    /// Experience granted when the pack is completed.
    pub xp_reward: u32,
    /// Currency granted when the pack is completed.
    pub coin_reward: u32,
    /// Additional reward granted when the pack is completed.
    pub completion_reward: Rewards,
    /// Levels ordered by `index_in_pack`.
    pub levels: Vec<Level>,
}

impl LevelPack {
    /// Retrieves the level at the one-based index.
    #[must_use]
    pub fn level(&self, index_in_pack: u8) -> Option<&Level> {
        self.levels
            .iter()
            .find(|level| level.index_in_pack == index_in_pack)
    }

    /// Retrieves the boss level of the pack.
    #[must_use]
    pub fn boss(&self) -> Option<&Level> {
        self.level(BOSS_LEVEL_INDEX)
    }

    /// Maximum number of stars the pack can award.
    #[must_use]
    pub fn max_stars(&self) -> u32 {
        u32::try_from(self.levels.len()).unwrap_or(u32::MAX) * u32::from(STARS_PER_LEVEL)
    }
}
