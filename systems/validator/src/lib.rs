#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static solvability and balance analysis.
//!
//! The validator never plays a level. It counts the board, estimates the moves
//! the objective needs with per-objective heuristics, and flags definitions
//! that are implausible. Errors exclude a level from the shipped catalog;
//! warnings only mark it for review.

mod blueprint;

use gridlock_core::{Level, LevelId, ObjectiveKind, Puzzle, ShapePattern};
use gridlock_system_catalog::Catalog;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

pub use blueprint::Blueprint;

/// Smallest number of empty cells that still fits a 3x3 piece.
pub const MIN_EMPTY_CELLS: u32 = 9;

/// Prefill density, in percent, above which a level is flagged.
pub const MAX_DENSITY_PERCENT: u32 = 50;

/// Score the heuristics assume a single move earns.
pub const POINTS_PER_MOVE: u32 = 15;

/// Moves the heuristics assume an empty line needs.
pub const MOVES_PER_LINE: u32 = 3;

/// Whether an issue blocks shipping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// The level must not ship.
    Error,
    /// The level ships but needs review.
    Warning,
}

/// Problem found in a level definition.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
pub enum ValidationIssue {
    /// A grid does not match the declared board size.
    #[error("{layer} grid is {rows}x{columns}, expected {expected}x{expected}")]
    GridMismatch {
        /// Grid that is malformed.
        layer: &'static str,
        /// Declared board size.
        expected: u32,
        /// Rows found.
        rows: usize,
        /// Length of the first row with the wrong width, or of the first row.
        columns: usize,
    },
    /// Prefilled cells lie outside the board.
    #[error("{count} prefilled cells lie outside the board")]
    CellsOutOfBounds {
        /// Number of stray cells.
        count: usize,
    },
    /// The move budget is less than half of the estimate.
    #[error("unsolvable: move limit {limit} is below half of the {estimate} estimated moves")]
    MovesFarBelowEstimate {
        /// Declared move limit.
        limit: u32,
        /// Estimated moves.
        estimate: u32,
    },
    /// The goal asks for more cells than the board holds.
    #[error("impossible goal: clear {target} cells with only {available} prefilled")]
    NotEnoughCells {
        /// Cells the goal asks for.
        target: u32,
        /// Prefilled cells available.
        available: u32,
    },
    /// The goal asks to survive longer than the move budget allows.
    #[error("impossible goal: survive {target} moves with a limit of {limit}")]
    SurvivalBeyondLimit {
        /// Moves to survive.
        target: u32,
        /// Declared move limit.
        limit: u32,
    },
    /// The board has no room for a 3x3 piece.
    #[error("only {empty} empty cells, at least {} are needed", MIN_EMPTY_CELLS)]
    InsufficientSpace {
        /// Empty cells available.
        empty: u32,
    },
    /// The move budget is below the estimate.
    #[error("tight budget: move limit {limit} is below the {estimate} estimated moves")]
    TightMoveBudget {
        /// Declared move limit.
        limit: u32,
        /// Estimated moves.
        estimate: u32,
    },
    /// Prefill covers more than half the board.
    #[error("high density: {percent}% of the board is prefilled")]
    HighDensity {
        /// Prefilled share of the board.
        percent: u32,
    },
}

impl ValidationIssue {
    /// Severity of the issue.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            ValidationIssue::TightMoveBudget { .. } | ValidationIssue::HighDensity { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

/// Cell counts of a board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    /// Cells on the board.
    pub total: u32,
    /// Clearable prefilled cells.
    pub prefilled: u32,
    /// Locked obstacle cells.
    pub obstacles: u32,
    /// Cells that are neither prefilled nor obstacles.
    pub empty: u32,
    /// Prefilled share of the board, rounded down to a percent.
    pub density_percent: u32,
}

/// Outcome of validating one definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// `true` when no error was found.
    pub solvable: bool,
    /// Estimated number of moves the objective needs.
    pub estimated_moves: u32,
    /// Estimated number of line clears the objective needs.
    pub estimated_min_lines: u32,
    /// Non-blocking findings.
    pub warnings: Vec<ValidationIssue>,
    /// Blocking findings.
    pub errors: Vec<ValidationIssue>,
    /// Board counts the estimates were derived from.
    pub stats: BoardStats,
}

impl ValidationReport {
    fn from_issues(
        issues: Vec<ValidationIssue>,
        estimated_moves: u32,
        estimated_min_lines: u32,
        stats: BoardStats,
    ) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|issue| issue.severity() == Severity::Error);
        Self {
            solvable: errors.is_empty(),
            estimated_moves,
            estimated_min_lines,
            warnings,
            errors,
            stats,
        }
    }
}

/// Validates a catalog level.
#[must_use]
pub fn validate_level(level: &Level) -> ValidationReport {
    validate(&Blueprint::from_level(level))
}

/// Validates a daily puzzle.
#[must_use]
pub fn validate_puzzle(puzzle: &Puzzle) -> ValidationReport {
    validate(&Blueprint::from_puzzle(puzzle))
}

/// Validates a board definition.
#[must_use]
pub fn validate(blueprint: &Blueprint) -> ValidationReport {
    let mut issues = structural_issues(blueprint);
    if !issues.is_empty() {
        return ValidationReport::from_issues(issues, 0, 0, BoardStats::default());
    }

    let board = Board::new(blueprint);
    let stats = board.stats();
    let (estimated_moves, estimated_min_lines) = estimate(blueprint, &board, &stats);
    let objective = blueprint.objective;

    if let Some(limit) = blueprint.move_limit {
        if limit.saturating_mul(2) < estimated_moves {
            issues.push(ValidationIssue::MovesFarBelowEstimate {
                limit,
                estimate: estimated_moves,
            });
        } else if limit < estimated_moves {
            issues.push(ValidationIssue::TightMoveBudget {
                limit,
                estimate: estimated_moves,
            });
        }
    }

    match (objective.kind, blueprint.move_limit) {
        (ObjectiveKind::ClearCells, _) if objective.target > stats.prefilled => {
            issues.push(ValidationIssue::NotEnoughCells {
                target: objective.target,
                available: stats.prefilled,
            });
        }
        (ObjectiveKind::SurviveMoves, Some(limit)) if objective.target > limit => {
            issues.push(ValidationIssue::SurvivalBeyondLimit {
                target: objective.target,
                limit,
            });
        }
        _ => {}
    }

    if stats.empty < MIN_EMPTY_CELLS {
        issues.push(ValidationIssue::InsufficientSpace { empty: stats.empty });
    }
    if stats.prefilled * 100 > stats.total * MAX_DENSITY_PERCENT {
        issues.push(ValidationIssue::HighDensity {
            percent: stats.density_percent,
        });
    }

    ValidationReport::from_issues(issues, estimated_moves, estimated_min_lines, stats)
}

fn structural_issues(blueprint: &Blueprint) -> Vec<ValidationIssue> {
    let expected = blueprint.grid_size;
    let mut issues = Vec::new();
    for (layer, grid) in [("prefill", &blueprint.prefill), ("obstacle", &blueprint.obstacles)] {
        let columns = grid
            .iter()
            .map(Vec::len)
            .find(|len| *len != expected as usize)
            .or_else(|| grid.first().map(Vec::len))
            .unwrap_or(0);
        if grid.len() != expected as usize || columns != expected as usize {
            issues.push(ValidationIssue::GridMismatch {
                layer,
                expected,
                rows: grid.len(),
                columns,
            });
        }
    }
    if blueprint.stray_cells > 0 {
        issues.push(ValidationIssue::CellsOutOfBounds {
            count: blueprint.stray_cells,
        });
    }
    issues
}

/// Square occupancy view of a structurally valid blueprint.
struct Board<'a> {
    size: usize,
    prefill: &'a [Vec<bool>],
    obstacles: &'a [Vec<bool>],
}

impl<'a> Board<'a> {
    fn new(blueprint: &'a Blueprint) -> Self {
        Self {
            size: blueprint.grid_size as usize,
            prefill: &blueprint.prefill,
            obstacles: &blueprint.obstacles,
        }
    }

    fn prefilled(&self, row: usize, column: usize) -> bool {
        self.prefill[row][column]
    }

    fn occupied(&self, row: usize, column: usize) -> bool {
        self.prefill[row][column] || self.obstacles[row][column]
    }

    fn stats(&self) -> BoardStats {
        let count = |grid: &[Vec<bool>]| {
            grid.iter().flatten().filter(|cell| **cell).count() as u32
        };
        let total = (self.size * self.size) as u32;
        let prefilled = count(self.prefill);
        // A cell marked on both layers is counted once, as an obstacle.
        let overlap = (0..self.size)
            .flat_map(|row| (0..self.size).map(move |column| (row, column)))
            .filter(|&(row, column)| self.prefill[row][column] && self.obstacles[row][column])
            .count() as u32;
        let prefilled = prefilled - overlap;
        let obstacles = count(self.obstacles);
        let empty = total.saturating_sub(prefilled + obstacles);
        BoardStats {
            total,
            prefilled,
            obstacles,
            empty,
            density_percent: if total == 0 { 0 } else { prefilled * 100 / total },
        }
    }

    /// Moves needed to complete a line with the given number of empty cells.
    /// Never more than an empty line, never less than one.
    fn line_cost(empty: usize) -> u32 {
        (empty as u32).div_ceil(3).clamp(1, MOVES_PER_LINE)
    }

    fn row_empty(&self, row: usize) -> usize {
        (0..self.size).filter(|&column| !self.occupied(row, column)).count()
    }

    fn column_empty(&self, column: usize) -> usize {
        (0..self.size).filter(|&row| !self.occupied(row, column)).count()
    }

    /// Cheapest completion costs over every row and column.
    fn line_costs(&self) -> Vec<u32> {
        let mut costs: Vec<u32> = (0..self.size)
            .map(|row| Self::line_cost(self.row_empty(row)))
            .chain((0..self.size).map(|column| Self::line_cost(self.column_empty(column))))
            .collect();
        costs.sort_unstable();
        costs
    }

    /// Moves and lines needed to clear every prefilled block, sweeping either
    /// by rows or by columns, whichever is cheaper.
    fn clear_all_cost(&self) -> (u32, u32) {
        let sweep = |lines: Vec<usize>, empty: &dyn Fn(usize) -> usize| {
            let moves = lines.iter().map(|line| Self::line_cost(empty(*line))).sum::<u32>();
            (moves, lines.len() as u32)
        };
        let rows: Vec<usize> = (0..self.size)
            .filter(|&row| (0..self.size).any(|column| self.prefilled(row, column)))
            .collect();
        let columns: Vec<usize> = (0..self.size)
            .filter(|&column| (0..self.size).any(|row| self.prefilled(row, column)))
            .collect();
        let by_rows = sweep(rows, &|row: usize| self.row_empty(row));
        let by_columns = sweep(columns, &|column: usize| self.column_empty(column));
        by_rows.min(by_columns)
    }
}

fn estimate(blueprint: &Blueprint, board: &Board<'_>, stats: &BoardStats) -> (u32, u32) {
    let objective = blueprint.objective;
    let target = objective.target;
    let size = blueprint.grid_size.max(1);

    match objective.kind {
        ObjectiveKind::ReachScore => (
            target.div_ceil(POINTS_PER_MOVE),
            target.div_ceil(size.saturating_mul(10)),
        ),
        ObjectiveKind::ClearLines => {
            let costs = board.line_costs();
            let wanted = target as usize;
            let extra = wanted.saturating_sub(costs.len()) as u32;
            let moves = costs
                .iter()
                .take(wanted)
                .sum::<u32>()
                .saturating_add(extra.saturating_mul(MOVES_PER_LINE));
            (moves, target)
        }
        ObjectiveKind::ClearAllBlocks | ObjectiveKind::ClearWithMoves => board.clear_all_cost(),
        ObjectiveKind::PerfectClear => {
            let (moves, lines) = board.clear_all_cost();
            (
                moves.max(MOVES_PER_LINE).saturating_mul(target),
                lines.max(1).saturating_mul(target),
            )
        }
        ObjectiveKind::AchieveCombo => (target.saturating_mul(MOVES_PER_LINE), target),
        ObjectiveKind::CreatePattern => {
            let moves = match objective.pattern {
                Some(ShapePattern::Square | ShapePattern::CenterSquare) => 1,
                Some(ShapePattern::Corners) => 4,
                Some(ShapePattern::Diagonal) => size,
                Some(ShapePattern::ParityCount) => target.div_ceil(2),
                None => 0,
            };
            (moves, 0)
        }
        ObjectiveKind::SurviveMoves => (target, 0),
        ObjectiveKind::SurviveTime => (0, 0),
        ObjectiveKind::ClearCells => {
            let lines = target.min(stats.total).div_ceil(size);
            (lines.saturating_mul(MOVES_PER_LINE), lines)
        }
    }
}

/// Result of validating every level of a catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScreeningReport {
    /// Levels with at least one error. They must not ship.
    pub rejected: Vec<LevelId>,
    /// Levels with warnings only. They ship but need review.
    pub flagged: Vec<LevelId>,
    /// Number of levels inspected.
    pub inspected: usize,
}

impl ScreeningReport {
    /// Reports whether every level may ship.
    #[must_use]
    pub fn is_shippable(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Validates every level of the catalog.
#[must_use]
pub fn screen_catalog(catalog: &Catalog) -> ScreeningReport {
    let mut report = ScreeningReport::default();
    for level in catalog.levels() {
        report.inspected += 1;
        let validation = validate_level(level);
        if !validation.errors.is_empty() {
            for issue in &validation.errors {
                warn!("level {} rejected: {issue}", level.id.get());
            }
            report.rejected.push(level.id);
        } else if !validation.warnings.is_empty() {
            report.flagged.push(level.id);
        }
    }
    info!(
        "screened {} levels: {} rejected, {} flagged",
        report.inspected,
        report.rejected.len(),
        report.flagged.len()
    );
    report
}
