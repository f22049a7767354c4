use gridlock_core::{CellCoord, GridSnapshot, Objective, ObjectiveKind, SessionSummary, ShapePattern};

use crate::GameEngine;

/// Reports whether the objective is met by the counters and the engine state.
///
/// Kinds without a placement-driven predicate never pass here. `SurviveTime`
/// is only completed by the countdown reaching zero.
pub(crate) fn is_met<E: GameEngine>(
    objective: &Objective,
    summary: &SessionSummary,
    engine: &E,
) -> bool {
    let target = objective.target;
    match objective.kind {
        ObjectiveKind::ReachScore => engine.current_score() >= target,
        ObjectiveKind::ClearLines => summary.lines_cleared >= target,
        ObjectiveKind::ClearAllBlocks => engine.is_grid_empty(),
        ObjectiveKind::PerfectClear => summary.perfect_clears >= target,
        ObjectiveKind::AchieveCombo => summary.max_combo >= target,
        ObjectiveKind::CreatePattern => objective
            .pattern
            .map_or(false, |shape| shape_present(shape, &engine.grid_snapshot(), target)),
        ObjectiveKind::ClearWithMoves => engine.is_grid_empty() && summary.moves_used <= target,
        ObjectiveKind::SurviveTime | ObjectiveKind::SurviveMoves | ObjectiveKind::ClearCells => {
            false
        }
    }
}

/// Reports whether a move-capped clear can no longer succeed.
pub(crate) fn is_lost<E: GameEngine>(
    objective: &Objective,
    summary: &SessionSummary,
    engine: &E,
) -> bool {
    objective.kind == ObjectiveKind::ClearWithMoves
        && summary.moves_used > objective.target
        && !engine.is_grid_empty()
}

/// Board-shape predicates behind `CreatePattern` objectives.
pub(crate) fn shape_present(shape: ShapePattern, grid: &GridSnapshot, target: u32) -> bool {
    let size = grid.size();
    let filled = |row: u32, column: u32| grid.is_occupied(CellCoord::new(row, column));
    let block = |row: u32, column: u32| {
        filled(row, column)
            && filled(row, column + 1)
            && filled(row + 1, column)
            && filled(row + 1, column + 1)
    };
    if size == 0 {
        return false;
    }
    let last = size - 1;

    match shape {
        ShapePattern::Square => (0..last).any(|row| (0..last).any(|column| block(row, column))),
        ShapePattern::Corners => {
            filled(0, 0) && filled(0, last) && filled(last, 0) && filled(last, last)
        }
        ShapePattern::CenterSquare => size >= 2 && block(size / 2 - 1, size / 2 - 1),
        ShapePattern::Diagonal => (0..size).all(|index| filled(index, index)),
        ShapePattern::ParityCount => {
            let even = (0..size)
                .flat_map(|row| (0..size).map(move |column| (row, column)))
                .filter(|&(row, column)| (row + column) % 2 == 0 && filled(row, column))
                .count();
            even as u64 >= u64::from(target)
        }
    }
}
