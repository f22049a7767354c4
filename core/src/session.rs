//! Records exchanged between the session runtime, the external engine and the
//! external progress store.

use serde::{Deserialize, Serialize};

/// Placement-commit event delivered by the external engine once per placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementCommit {
    /// Number of lines the placement cleared.
    pub lines_cleared: u32,
}

impl PlacementCommit {
    /// Creates a new placement event.
    #[must_use]
    pub const fn new(lines_cleared: u32) -> Self {
        Self { lines_cleared }
    }
}

/// Counters accumulated while a level or puzzle is played.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Latest score reported by the engine.
    pub score: u32,
    /// Placements committed so far.
    pub moves_used: u32,
    /// Moves left before the limit, or `None` when unlimited.
    pub remaining_moves: Option<u32>,
    /// Seconds left on the countdown, or `None` when untimed.
    pub time_remaining_secs: Option<u32>,
    /// Holds used so far.
    pub holds_used: u32,
    /// Undos used so far.
    pub undos_used: u32,
    /// Placements that left the grid empty.
    pub perfect_clears: u32,
    /// Largest number of lines cleared by a single placement.
    pub max_combo: u32,
    /// Total lines cleared.
    pub lines_cleared: u32,
}

/// Frozen outcome of a successful session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionResult {
    /// Counters at the moment of completion.
    pub summary: SessionSummary,
    /// Stars earned, between zero and three.
    pub stars_earned: u8,
}

/// Reason a session ended in failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    /// The objective can no longer be met.
    ObjectiveFailed,
    /// A placement exceeded the move limit.
    OutOfMoves,
    /// The countdown reached zero before the objective was met.
    TimeExpired,
}
