#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridlock puzzle content engine.
//!
//! This crate defines the immutable records that flow between systems. The
//! catalog and daily systems produce [`Level`] and [`Puzzle`] values once, the
//! validator inspects them without mutation, and the session system consumes a
//! single record together with a live event stream from the external grid
//! engine before emitting a [`SessionResult`]. Nothing in this crate performs
//! I/O or owns engine state.

mod level;
mod progress;
mod puzzle;
mod rng;
mod session;

use serde::{Deserialize, Serialize};

pub use level::{
    DifficultyBand, Level, LevelConstraints, LevelId, LevelPack, LevelType, Objective,
    ObjectiveKind, PackId, PackTheme, Rewards, ShapePattern, StarKind, StarRequirement,
    UnlockRequirement, STARS_PER_LEVEL,
};
pub use progress::{LevelProgress, ProgressBook};
pub use puzzle::{Puzzle, PuzzleCategory, PuzzleDifficulty, PuzzleId};
pub use rng::SplitMix64;
pub use session::{FailureReason, PlacementCommit, SessionResult, SessionSummary};

/// Number of levels contained in every level pack.
pub const LEVELS_PER_PACK: u8 = 15;

/// Index of the boss level inside every pack.
pub const BOSS_LEVEL_INDEX: u8 = LEVELS_PER_PACK;

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Reports whether the cell lies inside a square grid of the given size.
    #[must_use]
    pub const fn is_within(&self, grid_size: u32) -> bool {
        self.row < grid_size && self.column < grid_size
    }
}

/// Decorative color applied to a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl BlockColor {
    /// Creates a new block color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Palette cycled through when tagging generated cells.
pub const BLOCK_PALETTE: [BlockColor; 6] = [
    BlockColor::from_rgb(0x5c, 0x6b, 0x7a),
    BlockColor::from_rgb(0x8d, 0x6e, 0x63),
    BlockColor::from_rgb(0x60, 0x7d, 0x8b),
    BlockColor::from_rgb(0x79, 0x55, 0x48),
    BlockColor::from_rgb(0x45, 0x5a, 0x64),
    BlockColor::from_rgb(0x6d, 0x4c, 0x41),
];

/// Single prefilled cell of a level or puzzle board.
///
/// Locked cells are immovable obstacles. The external engine must never clear
/// them through its line-clear rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Position of the cell on the board.
    pub coord: CellCoord,
    /// Indicates whether the cell is an obstacle rather than a clearable block.
    pub obstacle: bool,
    /// Indicates whether the cell is immune to line clears.
    pub locked: bool,
    /// Decorative color used by presentation layers.
    pub color: BlockColor,
}

impl GridCell {
    /// Creates a locked obstacle cell.
    #[must_use]
    pub const fn obstacle(coord: CellCoord, color: BlockColor) -> Self {
        Self {
            coord,
            obstacle: true,
            locked: true,
            color,
        }
    }

    /// Creates a regular prefilled block that line clears may remove.
    #[must_use]
    pub const fn block(coord: CellCoord, color: BlockColor) -> Self {
        Self {
            coord,
            obstacle: false,
            locked: false,
            color,
        }
    }
}

/// Difficulty rating on the closed 1..=12 scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Difficulty(u8);

impl Difficulty {
    /// Easiest representable difficulty.
    pub const MIN: Difficulty = Difficulty(1);
    /// Hardest representable difficulty.
    pub const MAX: Difficulty = Difficulty(12);

    /// Creates a difficulty, clamping the value into the 1..=12 range.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric difficulty.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Obstacle coverage in percent, stepping up every two difficulty points.
    ///
    /// | Difficulty | Coverage |
    /// |---|---|
    /// | 1–2 | 10% |
    /// | 3–4 | 15% |
    /// | 5–6 | 20% |
    /// | 7–8 | 25% |
    /// | 9–10 | 30% |
    /// | 11–12 | 35% |
    #[must_use]
    pub const fn coverage_percent(&self) -> u32 {
        let tier = (self.0 as u32).saturating_sub(1) / 2;
        let tier = if tier > 5 { 5 } else { tier };
        10 + tier * 5
    }

    /// Number of obstacle cells targeted on a square grid, rounded to nearest.
    #[must_use]
    pub const fn target_blocks(&self, grid_size: u32) -> u32 {
        let area = grid_size * grid_size;
        (area * self.coverage_percent() + 50) / 100
    }

    /// Presentation band the difficulty falls into.
    #[must_use]
    pub const fn band(&self) -> DifficultyBand {
        match self.0 {
            0..=2 => DifficultyBand::Beginner,
            3..=4 => DifficultyBand::Easy,
            5..=6 => DifficultyBand::Medium,
            7..=8 => DifficultyBand::Hard,
            9..=10 => DifficultyBand::Expert,
            _ => DifficultyBand::Master,
        }
    }

    /// Difficulty raised by `steps`, saturating at [`Difficulty::MAX`].
    #[must_use]
    pub const fn raised(&self, steps: u8) -> Self {
        Self::new(self.0.saturating_add(steps))
    }
}

/// Geometric rule used to place locked obstacle cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    /// No obstacles at all.
    Empty,
    /// Up to four cells in the grid corners.
    Corners,
    /// Ring hugging the grid edge.
    Borders,
    /// Regularly strided cells.
    Checkerboard,
    /// Centered horizontal and vertical bands.
    Cross,
    /// Band along the main diagonal.
    Diagonal,
    /// Left column and bottom row band.
    LShape,
    /// Uniformly random cells.
    Scattered,
    /// Ring inset one cell from the edge.
    Frame,
    /// Rectilinear spiral walk.
    Spiral,
    /// Perpendicular wall families with periodic gaps.
    Maze,
    /// Quadrant-mirrored random seeding.
    Symmetrical,
    /// Random blobs around random centers.
    Clusters,
}

impl PatternKind {
    /// Every pattern kind in declaration order.
    pub const ALL: [PatternKind; 13] = [
        PatternKind::Empty,
        PatternKind::Corners,
        PatternKind::Borders,
        PatternKind::Checkerboard,
        PatternKind::Cross,
        PatternKind::Diagonal,
        PatternKind::LShape,
        PatternKind::Scattered,
        PatternKind::Frame,
        PatternKind::Spiral,
        PatternKind::Maze,
        PatternKind::Symmetrical,
        PatternKind::Clusters,
    ];

    /// Stable lowercase identifier for the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Empty => "empty",
            PatternKind::Corners => "corners",
            PatternKind::Borders => "borders",
            PatternKind::Checkerboard => "checkerboard",
            PatternKind::Cross => "cross",
            PatternKind::Diagonal => "diagonal",
            PatternKind::LShape => "lShape",
            PatternKind::Scattered => "scattered",
            PatternKind::Frame => "frame",
            PatternKind::Spiral => "spiral",
            PatternKind::Maze => "maze",
            PatternKind::Symmetrical => "symmetrical",
            PatternKind::Clusters => "clusters",
        }
    }

    /// Reports whether the kind consumes random numbers while generating.
    #[must_use]
    pub const fn is_randomized(&self) -> bool {
        matches!(
            self,
            PatternKind::Scattered | PatternKind::Symmetrical | PatternKind::Clusters
        )
    }
}

/// Piece shapes the external engine may deal to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceShape {
    /// Single cell.
    Single,
    /// Two cells in a line.
    Domino,
    /// Three cells in a line.
    TriLine,
    /// Three cells forming a corner.
    TriCorner,
    /// Four cells in a line.
    LineFour,
    /// Five cells in a line.
    LineFive,
    /// Two by two square.
    Square,
    /// Three by three square.
    BigSquare,
    /// Four-cell T tetromino.
    TShape,
    /// Four-cell S tetromino.
    SShape,
    /// Four-cell L tetromino.
    LShape,
}

impl PieceShape {
    /// Every piece shape in declaration order.
    pub const ALL: [PieceShape; 11] = [
        PieceShape::Single,
        PieceShape::Domino,
        PieceShape::TriLine,
        PieceShape::TriCorner,
        PieceShape::LineFour,
        PieceShape::LineFive,
        PieceShape::Square,
        PieceShape::BigSquare,
        PieceShape::TShape,
        PieceShape::SShape,
        PieceShape::LShape,
    ];

    /// Number of cells covered by the shape.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        match self {
            PieceShape::Single => 1,
            PieceShape::Domino => 2,
            PieceShape::TriLine | PieceShape::TriCorner => 3,
            PieceShape::LineFour
            | PieceShape::Square
            | PieceShape::TShape
            | PieceShape::SShape
            | PieceShape::LShape => 4,
            PieceShape::LineFive => 5,
            PieceShape::BigSquare => 9,
        }
    }
}

/// Read-only occupancy snapshot of the external grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    size: u32,
    occupied: Vec<bool>,
}

impl GridSnapshot {
    /// Creates an empty snapshot of a square grid.
    #[must_use]
    pub fn empty(size: u32) -> Self {
        Self {
            size,
            occupied: vec![false; (size * size) as usize],
        }
    }

    /// Builds a snapshot from row-major occupancy rows.
    ///
    /// The grid size is taken from the number of rows. Short rows are padded
    /// with empty cells and long rows are truncated so the snapshot is always
    /// square.
    #[must_use]
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let size = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let mut snapshot = Self::empty(size);
        for (row_index, row) in rows.iter().enumerate() {
            for (column_index, occupied) in row.iter().take(rows.len()).enumerate() {
                let index = row_index * rows.len() + column_index;
                snapshot.occupied[index] = *occupied;
            }
        }
        snapshot
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the cell is occupied. Out-of-range cells are empty.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.occupied.get(index).copied())
            .unwrap_or(false)
    }

    /// Marks the cell as occupied or empty. Out-of-range cells are ignored.
    pub fn set_occupied(&mut self, cell: CellCoord, occupied: bool) {
        if let Some(index) = self.index(cell) {
            self.occupied[index] = occupied;
        }
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> u32 {
        let count = self.occupied.iter().filter(|occupied| **occupied).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.occupied.iter().all(|occupied| !occupied)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !cell.is_within(self.size) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        Some(row * width + column)
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Difficulty, DifficultyBand, GridSnapshot, PatternKind, PieceShape};

    #[test]
    fn difficulty_clamps_into_range() {
        assert_eq!(Difficulty::new(0), Difficulty::MIN);
        assert_eq!(Difficulty::new(40), Difficulty::MAX);
        assert_eq!(Difficulty::new(7).get(), 7);
    }

    #[test]
    fn coverage_steps_every_two_levels() {
        let expected = [10, 10, 15, 15, 20, 20, 25, 25, 30, 30, 35, 35];
        for (value, percent) in (1..=12).zip(expected) {
            assert_eq!(Difficulty::new(value).coverage_percent(), percent);
        }
    }

    #[test]
    fn target_blocks_rounds_to_nearest() {
        // 64 * 10% = 6.4
        assert_eq!(Difficulty::new(1).target_blocks(8), 6);
        // 64 * 35% = 22.4
        assert_eq!(Difficulty::new(12).target_blocks(8), 22);
        // 100 * 15% = 15
        assert_eq!(Difficulty::new(3).target_blocks(10), 15);
        // 81 * 30% = 24.3
        assert_eq!(Difficulty::new(9).target_blocks(9), 24);
    }

    #[test]
    fn bands_follow_coverage_tiers() {
        assert_eq!(Difficulty::new(2).band(), DifficultyBand::Beginner);
        assert_eq!(Difficulty::new(6).band(), DifficultyBand::Medium);
        assert_eq!(Difficulty::new(12).band(), DifficultyBand::Master);
    }

    #[test]
    fn raised_saturates_at_max() {
        assert_eq!(Difficulty::new(11).raised(5), Difficulty::MAX);
        assert_eq!(Difficulty::new(3).raised(2).get(), 5);
    }

    #[test]
    fn pattern_identifiers_are_unique() {
        let mut names: Vec<&str> = PatternKind::ALL.iter().map(PatternKind::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PatternKind::ALL.len());
    }

    #[test]
    fn piece_cell_counts() {
        assert_eq!(PieceShape::BigSquare.cell_count(), 9);
        assert_eq!(PieceShape::TriCorner.cell_count(), 3);
    }

    #[test]
    fn snapshot_pads_and_queries_rows() {
        let rows = vec![vec![true, false], vec![false]];
        let snapshot = GridSnapshot::from_rows(&rows);
        assert_eq!(snapshot.size(), 2);
        assert!(snapshot.is_occupied(CellCoord::new(0, 0)));
        assert!(!snapshot.is_occupied(CellCoord::new(1, 1)));
        assert!(!snapshot.is_occupied(CellCoord::new(5, 5)));
        assert_eq!(snapshot.occupied_count(), 1);
        assert!(!snapshot.is_clear());
    }

    #[test]
    fn snapshot_set_occupied_ignores_out_of_range() {
        let mut snapshot = GridSnapshot::empty(3);
        snapshot.set_occupied(CellCoord::new(9, 9), true);
        assert!(snapshot.is_clear());
        snapshot.set_occupied(CellCoord::new(2, 1), true);
        assert!(snapshot.is_occupied(CellCoord::new(2, 1)));
    }
}
