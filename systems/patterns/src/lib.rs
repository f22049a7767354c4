#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure obstacle pattern synthesis.
//!
//! Every [`PatternKind`] maps to a constructive rule that produces an ordered
//! pool of candidate cells for a square grid. The pool is then thinned to the
//! coverage target of the requested [`Difficulty`]. Randomized kinds draw
//! exclusively from the caller-owned [`SplitMix64`] stream, so a layout is a
//! pure function of `(grid_size, difficulty, kind, seed)`.

use std::collections::BTreeSet;

use gridlock_core::{
    BlockColor, CellCoord, Difficulty, GridCell, PatternKind, SplitMix64, BLOCK_PALETTE,
};
use log::debug;

/// Set of obstacle cells produced for a square grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstacleLayout {
    grid_size: u32,
    cells: BTreeSet<CellCoord>,
}

impl ObstacleLayout {
    fn from_cells(grid_size: u32, cells: impl IntoIterator<Item = CellCoord>) -> Self {
        let cells = cells
            .into_iter()
            .filter(|cell| cell.is_within(grid_size))
            .collect();
        Self { grid_size, cells }
    }

    /// Side length of the grid the layout was generated for.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Number of obstacle cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the layout holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the cell belongs to the layout.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Iterates over the cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Converts the layout into locked obstacle cells.
    #[must_use]
    pub fn to_locked_cells(&self) -> Vec<GridCell> {
        self.iter()
            .map(|cell| GridCell::obstacle(cell, palette_color(cell)))
            .collect()
    }

    /// Converts the layout into clearable prefilled blocks.
    #[must_use]
    pub fn to_block_cells(&self) -> Vec<GridCell> {
        self.iter()
            .map(|cell| GridCell::block(cell, palette_color(cell)))
            .collect()
    }
}

/// Generates the obstacle layout for a square grid.
///
/// Generation always terminates and never fails. Layouts that leave too little
/// room to play are reported by the validator, not rejected here.
#[must_use]
pub fn generate(
    grid_size: u32,
    difficulty: Difficulty,
    kind: PatternKind,
    rng: &mut SplitMix64,
) -> ObstacleLayout {
    let target = difficulty.target_blocks(grid_size) as usize;
    let base_width = 1 + u32::from(difficulty.get().saturating_sub(1)) / 4;

    let cells = match kind {
        PatternKind::Empty => Vec::new(),
        PatternKind::Corners => corners(grid_size, target),
        PatternKind::Borders => banded(grid_size, target, base_width, |cell, width| {
            ring_depth(grid_size, cell) < width
        }),
        PatternKind::Frame => banded(grid_size, target, base_width, |cell, width| {
            let depth = ring_depth(grid_size, cell);
            depth >= 1 && depth < 1 + width
        }),
        PatternKind::Checkerboard => checkerboard(grid_size, difficulty, target),
        PatternKind::Cross => banded(grid_size, target, base_width, |cell, width| {
            let start = grid_size.saturating_sub(width) / 2;
            let band = start..start + width;
            band.contains(&cell.row()) || band.contains(&cell.column())
        }),
        PatternKind::Diagonal => banded(grid_size, target, base_width, |cell, width| {
            cell.row().abs_diff(cell.column()) < width
        }),
        PatternKind::LShape => banded(grid_size, target, base_width, |cell, width| {
            cell.column() < width || cell.row() >= grid_size.saturating_sub(width)
        }),
        PatternKind::Scattered => scattered(grid_size, target, rng),
        PatternKind::Spiral => spiral(grid_size, difficulty, target),
        PatternKind::Maze => spread(maze_walls(grid_size, difficulty), target),
        PatternKind::Symmetrical => mirrored(grid_size, target, rng),
        PatternKind::Clusters => clusters(grid_size, difficulty, target, rng),
    };

    let layout = ObstacleLayout::from_cells(grid_size, cells);
    debug!(
        "generated {} layout: size={} difficulty={} target={} cells={}",
        kind.as_str(),
        grid_size,
        difficulty.get(),
        target,
        layout.len()
    );
    layout
}

fn palette_color(cell: CellCoord) -> BlockColor {
    let index = (cell.row() + cell.column()) as usize % BLOCK_PALETTE.len();
    BLOCK_PALETTE[index]
}

fn all_cells(grid_size: u32) -> impl Iterator<Item = CellCoord> {
    (0..grid_size).flat_map(move |row| (0..grid_size).map(move |column| CellCoord::new(row, column)))
}

/// Distance from the cell to the nearest grid edge.
fn ring_depth(grid_size: u32, cell: CellCoord) -> u32 {
    let last = grid_size.saturating_sub(1);
    cell.row()
        .min(cell.column())
        .min(last.saturating_sub(cell.row()))
        .min(last.saturating_sub(cell.column()))
}

/// Picks `count` evenly spaced entries from the ordered pool.
fn spread(pool: Vec<CellCoord>, count: usize) -> Vec<CellCoord> {
    if count >= pool.len() {
        return pool;
    }
    (0..count).map(|step| pool[step * pool.len() / count]).collect()
}

/// Widens a band from `base_width` until it holds at least `target` cells,
/// then spreads the target over the band.
fn banded<F>(grid_size: u32, target: usize, base_width: u32, in_band: F) -> Vec<CellCoord>
where
    F: Fn(CellCoord, u32) -> bool,
{
    let mut width = base_width.max(1);
    loop {
        let pool: Vec<CellCoord> = all_cells(grid_size)
            .filter(|cell| in_band(*cell, width))
            .collect();
        if pool.len() >= target || width >= grid_size {
            return spread(pool, target);
        }
        width += 1;
    }
}

fn corners(grid_size: u32, target: usize) -> Vec<CellCoord> {
    let last = grid_size.saturating_sub(1);
    let mut seen = BTreeSet::new();
    [
        CellCoord::new(0, 0),
        CellCoord::new(0, last),
        CellCoord::new(last, 0),
        CellCoord::new(last, last),
    ]
    .into_iter()
    .filter(|cell| seen.insert(*cell))
    .take(target.min(4))
    .collect()
}

/// Diagonal stripes whose stride shrinks as difficulty rises.
fn checkerboard(grid_size: u32, difficulty: Difficulty, target: usize) -> Vec<CellCoord> {
    let mut stride = 6u32
        .saturating_sub((u32::from(difficulty.get()) + 1) / 2)
        .max(2);
    loop {
        let pool: Vec<CellCoord> = all_cells(grid_size)
            .filter(|cell| (cell.row() + cell.column()) % stride == 0)
            .collect();
        if pool.len() >= target || stride == 2 {
            return spread(pool, target);
        }
        stride -= 1;
    }
}

fn scattered(grid_size: u32, target: usize, rng: &mut SplitMix64) -> Vec<CellCoord> {
    let mut pool: Vec<CellCoord> = all_cells(grid_size).collect();
    rng.shuffle(&mut pool);
    pool.truncate(target);
    pool
}

/// Rectilinear wall spiralling inward from the top-left corner with a one-cell
/// corridor between turns.
fn spiral(grid_size: u32, difficulty: Difficulty, target: usize) -> Vec<CellCoord> {
    const DIRECTIONS: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

    if grid_size == 0 {
        return Vec::new();
    }
    let area = grid_size * grid_size;
    let bound = (area / 2).min(u32::from(difficulty.get()) * 10) as usize;
    let limit = bound.min(target);

    let size = i64::from(grid_size);
    let inside = |row: i64, column: i64| (0..size).contains(&row) && (0..size).contains(&column);
    let index = |row: i64, column: i64| (row * size + column) as usize;

    let mut marked = vec![false; area as usize];
    let mut walk = vec![CellCoord::new(0, 0)];
    marked[0] = true;
    let (mut row, mut column) = (0i64, 0i64);
    let mut direction = 0usize;
    let mut failed_turns = 0;

    while failed_turns < 2 && walk.len() < limit {
        let (delta_row, delta_column) = DIRECTIONS[direction];
        let (next_row, next_column) = (row + delta_row, column + delta_column);
        let (beyond_row, beyond_column) = (next_row + delta_row, next_column + delta_column);
        let open = inside(next_row, next_column)
            && !marked[index(next_row, next_column)]
            && !(inside(beyond_row, beyond_column) && marked[index(beyond_row, beyond_column)]);
        if open {
            row = next_row;
            column = next_column;
            marked[index(row, column)] = true;
            walk.push(CellCoord::new(row as u32, column as u32));
            failed_turns = 0;
        } else {
            direction = (direction + 1) % DIRECTIONS.len();
            failed_turns += 1;
        }
    }

    walk.truncate(limit);
    walk
}

/// Horizontal and vertical walls every third line with staggered gaps.
///
/// The gap period doubles every four difficulty points, so each tier's gaps
/// are a subset of the previous tier's and walls only ever grow.
fn maze_walls(grid_size: u32, difficulty: Difficulty) -> Vec<CellCoord> {
    let period = 2u32 << (u32::from(difficulty.get().saturating_sub(1)) / 4).min(2);
    all_cells(grid_size)
        .filter(|cell| {
            let on_wall = cell.row() % 3 == 2 || cell.column() % 3 == 2;
            let gap = (cell.row() + cell.column()) % period == 0;
            on_wall && !gap
        })
        .collect()
}

fn mirror_group(grid_size: u32, seed: CellCoord) -> BTreeSet<CellCoord> {
    let last = grid_size.saturating_sub(1);
    let (row, column) = (seed.row(), seed.column());
    [
        CellCoord::new(row, column),
        CellCoord::new(row, last - column),
        CellCoord::new(last - row, column),
        CellCoord::new(last - row, last - column),
    ]
    .into_iter()
    .collect()
}

/// Random seeds in the top-left quadrant mirrored into all four quadrants.
/// Mirror groups are added whole, so the result never exceeds the target.
fn mirrored(grid_size: u32, target: usize, rng: &mut SplitMix64) -> Vec<CellCoord> {
    let half = grid_size.div_ceil(2);
    let mut seeds: Vec<CellCoord> = (0..half)
        .flat_map(|row| (0..half).map(move |column| CellCoord::new(row, column)))
        .collect();
    rng.shuffle(&mut seeds);

    let mut chosen = BTreeSet::new();
    for seed in seeds {
        let group = mirror_group(grid_size, seed);
        if chosen.len() + group.len() <= target {
            chosen.extend(group);
        }
    }
    chosen.into_iter().collect()
}

/// `difficulty` random centers, each grown into a three to five cell blob.
fn clusters(
    grid_size: u32,
    difficulty: Difficulty,
    target: usize,
    rng: &mut SplitMix64,
) -> Vec<CellCoord> {
    let mut chosen = Vec::new();
    let mut seen = BTreeSet::new();
    if grid_size == 0 {
        return chosen;
    }

    'centers: for _ in 0..difficulty.get() {
        let mut cell = CellCoord::new(rng.next_below(grid_size), rng.next_below(grid_size));
        let blob = rng.next_inclusive(3, 5);
        for _ in 0..blob {
            if chosen.len() >= target {
                break 'centers;
            }
            if seen.insert(cell) {
                chosen.push(cell);
            }
            cell = random_neighbour(grid_size, cell, rng);
        }
    }
    chosen
}

fn random_neighbour(grid_size: u32, cell: CellCoord, rng: &mut SplitMix64) -> CellCoord {
    let (row, column) = (cell.row(), cell.column());
    let mut neighbours = Vec::with_capacity(4);
    if row > 0 {
        neighbours.push(CellCoord::new(row - 1, column));
    }
    if row + 1 < grid_size {
        neighbours.push(CellCoord::new(row + 1, column));
    }
    if column > 0 {
        neighbours.push(CellCoord::new(row, column - 1));
    }
    if column + 1 < grid_size {
        neighbours.push(CellCoord::new(row, column + 1));
    }
    rng.choose(&neighbours).copied().unwrap_or(cell)
}

#[cfg(test)]
mod tests {
    use super::{ring_depth, spiral, spread};
    use gridlock_core::{CellCoord, Difficulty};

    #[test]
    fn spread_keeps_order_and_endpoints() {
        let pool: Vec<CellCoord> = (0..10).map(|column| CellCoord::new(0, column)).collect();
        let picked = spread(pool.clone(), 5);
        assert_eq!(picked.len(), 5);
        assert_eq!(picked[0], pool[0]);
        assert!(picked.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(spread(pool.clone(), 20), pool);
    }

    #[test]
    fn ring_depth_measures_distance_to_edge() {
        assert_eq!(ring_depth(8, CellCoord::new(0, 4)), 0);
        assert_eq!(ring_depth(8, CellCoord::new(3, 4)), 3);
        assert_eq!(ring_depth(8, CellCoord::new(6, 2)), 1);
    }

    #[test]
    fn spiral_walk_is_connected() {
        let walk = spiral(8, Difficulty::MAX, usize::MAX);
        assert_eq!(walk.len(), 32);
        for pair in walk.windows(2) {
            let distance = pair[0].row().abs_diff(pair[1].row())
                + pair[0].column().abs_diff(pair[1].column());
            assert_eq!(distance, 1);
        }
    }
}
