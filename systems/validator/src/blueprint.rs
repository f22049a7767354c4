use gridlock_core::{GridCell, Level, Objective, Puzzle};
use serde::{Deserialize, Serialize};

/// Definition-level view of a level or puzzle board, as inspected by the
/// validator.
///
/// Grids are row-major occupancy masks. They are kept as nested rows rather
/// than a dense square so that hydrated definitions with the wrong dimensions
/// can be reported instead of silently reshaped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Declared side length of the board.
    pub grid_size: u32,
    /// Clearable prefilled cells.
    pub prefill: Vec<Vec<bool>>,
    /// Locked obstacle cells.
    pub obstacles: Vec<Vec<bool>>,
    /// Prefilled cells that fell outside the declared board.
    pub stray_cells: usize,
    /// Win condition.
    pub objective: Objective,
    /// Maximum number of placements, or `None` when unlimited.
    pub move_limit: Option<u32>,
}

impl Blueprint {
    /// Creates an empty board of the declared size.
    #[must_use]
    pub fn new(grid_size: u32, objective: Objective, move_limit: Option<u32>) -> Self {
        let side = grid_size as usize;
        Self {
            grid_size,
            prefill: vec![vec![false; side]; side],
            obstacles: vec![vec![false; side]; side],
            stray_cells: 0,
            objective,
            move_limit,
        }
    }

    /// Builds the blueprint of a catalog level.
    #[must_use]
    pub fn from_level(level: &Level) -> Self {
        let mut blueprint = Self::new(level.grid_size, level.objective, level.constraints.move_limit);
        blueprint.place(&level.prefill);
        blueprint
    }

    /// Builds the blueprint of a daily puzzle.
    #[must_use]
    pub fn from_puzzle(puzzle: &Puzzle) -> Self {
        let mut blueprint = Self::new(puzzle.grid_size, puzzle.objective, puzzle.move_limit);
        blueprint.place(&puzzle.prefill);
        blueprint
    }

    /// Marks cells on the prefill or obstacle grid depending on their lock.
    pub fn place(&mut self, cells: &[GridCell]) {
        for cell in cells {
            let layer = if cell.locked {
                &mut self.obstacles
            } else {
                &mut self.prefill
            };
            let slot = layer
                .get_mut(cell.coord.row() as usize)
                .and_then(|row| row.get_mut(cell.coord.column() as usize));
            match slot {
                Some(slot) => *slot = true,
                None => self.stray_cells += 1,
            }
        }
    }

    /// Convenience for marking a clearable prefilled cell.
    pub fn fill(&mut self, row: usize, column: usize) {
        if let Some(slot) = self
            .prefill
            .get_mut(row)
            .and_then(|cells| cells.get_mut(column))
        {
            *slot = true;
        }
    }
}
