use gridlock_core::{CellCoord, GridCell, GridSnapshot};
use gridlock_system_session::GameEngine;

/// Cells an average piece covers.
const CELLS_PER_PIECE: u32 = 3;
/// Points for committing any placement.
const PLACEMENT_POINTS: u32 = 10;
/// Points per cleared line, multiplied by the lines cleared together.
const LINE_POINTS: u32 = 40;

/// Stand-in for the real grid engine, driven by a scripted list of line
/// clears. It tracks how many clearable cells are on the board rather than
/// where they are.
#[derive(Debug)]
pub(crate) struct ScriptedEngine {
    size: u32,
    obstacles: Vec<GridCell>,
    filled: u32,
    score: u32,
}

impl ScriptedEngine {
    pub(crate) fn new(size: u32) -> Self {
        Self {
            size,
            obstacles: Vec::new(),
            filled: 0,
            score: 0,
        }
    }

    /// Places a piece and removes the cleared lines from the board.
    pub(crate) fn commit(&mut self, lines: u32) {
        let capacity = (self.size * self.size).saturating_sub(self.obstacles.len() as u32);
        let placed = (self.filled + CELLS_PER_PIECE).min(capacity);
        self.filled = placed.saturating_sub(lines.saturating_mul(self.size));
        let line_points = LINE_POINTS.saturating_mul(lines).saturating_mul(lines);
        self.score = self
            .score
            .saturating_add(PLACEMENT_POINTS)
            .saturating_add(line_points);
    }
}

impl GameEngine for ScriptedEngine {
    fn apply_prefill(&mut self, cells: &[GridCell]) {
        let (obstacles, blocks): (Vec<GridCell>, Vec<GridCell>) =
            cells.iter().cloned().partition(|cell| cell.locked);
        self.obstacles = obstacles;
        self.filled = blocks.len() as u32;
        self.score = 0;
    }

    fn current_score(&self) -> u32 {
        self.score
    }

    fn is_grid_empty(&self) -> bool {
        self.filled == 0
    }

    /// Obstacles where they were placed, clearable cells packed row-major
    /// into the remaining space.
    fn grid_snapshot(&self) -> GridSnapshot {
        let mut snapshot = GridSnapshot::empty(self.size);
        for cell in &self.obstacles {
            snapshot.set_occupied(cell.coord, true);
        }
        let mut remaining = self.filled;
        for index in 0..self.size * self.size {
            if remaining == 0 {
                break;
            }
            let coord = CellCoord::new(index / self.size, index % self.size);
            if !snapshot.is_occupied(coord) {
                snapshot.set_occupied(coord, true);
                remaining -= 1;
            }
        }
        snapshot
    }
}
