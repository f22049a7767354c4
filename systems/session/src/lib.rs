#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Play-session state machine and its countdown runtime.
//!
//! [`Session`] is the synchronous core. It observes the external engine
//! through [`GameEngine`], applies the win and lose rules on every event and
//! freezes a [`SessionResult`] with a star rating once the objective is met.
//! [`SessionRuntime`] wraps it with the one-second countdown task and
//! publishes every state change on a watch channel.

mod objectives;
mod runtime;
mod stars;

use gridlock_core::{
    FailureReason, GridCell, GridSnapshot, Level, Objective, ObjectiveKind, PlacementCommit,
    Puzzle, SessionResult, SessionSummary, StarKind, StarRequirement,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use runtime::SessionRuntime;
pub use stars::evaluate_stars;

/// External grid engine observed by a session.
///
/// The session writes to the engine once, when the prefill is applied at the
/// start of an attempt. Everything else is read-only.
pub trait GameEngine {
    /// Places the level's prefilled cells on the grid.
    fn apply_prefill(&mut self, cells: &[GridCell]);

    /// Current score.
    fn current_score(&self) -> u32;

    /// Reports whether no clearable block is left on the grid.
    fn is_grid_empty(&self) -> bool;

    /// Occupancy of every cell, read by shape objectives.
    fn grid_snapshot(&self) -> GridSnapshot;
}

/// Errors raised when the session protocol is misused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `begin` was called while an attempt is running or awaiting exit.
    #[error("cannot begin a session that is {0}")]
    NotIdle(&'static str),
}

/// Lifecycle of a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No attempt in progress.
    #[default]
    Idle,
    /// An attempt accepts events.
    Running,
    /// The objective was met.
    Succeeded(SessionResult),
    /// The attempt ended without meeting the objective.
    Failed(FailureReason),
}

impl SessionState {
    /// Reports whether the state accepts placement and countdown events.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running)
    }

    /// Reports whether the attempt has ended with a result.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Succeeded(_) | SessionState::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Succeeded(_) => "succeeded",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Rules of one playable record, shared by catalog levels and daily puzzles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSpec {
    /// Win condition.
    pub objective: Objective,
    /// Maximum number of placements, or `None` when unlimited.
    pub move_limit: Option<u32>,
    /// Countdown length in seconds, or `None` when untimed.
    pub time_limit_secs: Option<u32>,
    /// Cells applied to the engine when an attempt begins.
    pub prefill: Vec<GridCell>,
    /// Ordered star requirements.
    pub star_requirements: [StarRequirement; 3],
}

impl SessionSpec {
    /// Rules of a catalog level.
    #[must_use]
    pub fn from_level(level: &Level) -> Self {
        Self {
            objective: level.objective,
            move_limit: level.constraints.move_limit,
            time_limit_secs: level.constraints.time_limit_secs,
            prefill: level.prefill.clone(),
            star_requirements: level.star_requirements,
        }
    }

    /// Rules of a daily puzzle. Its star requirements are derived from the
    /// puzzle's par values: two stars within half again of par, three at par.
    /// The two-star allowance is always at least one more than par, so the
    /// thresholds only coincide when the budget leaves nothing beyond par.
    #[must_use]
    pub fn from_puzzle(puzzle: &Puzzle) -> Self {
        let completed = StarRequirement::objective_completed();
        let ladder = |kind: StarKind, budget: u32, par: u32| {
            let relaxed = par.saturating_add((par / 2).max(1));
            [
                completed,
                StarRequirement::new(kind, budget - relaxed.min(budget)),
                StarRequirement::new(kind, budget - par.min(budget)),
            ]
        };
        let star_requirements = match (puzzle.objective.kind, puzzle.move_limit, puzzle.time_limit_secs) {
            (ObjectiveKind::SurviveTime, _, _) => [
                completed,
                StarRequirement::new(StarKind::NoUndosUsed, 1),
                StarRequirement::new(StarKind::NoUndosUsed, 0),
            ],
            (_, Some(moves), _) => ladder(StarKind::MovesRemaining, moves, puzzle.par_moves),
            (_, None, Some(seconds)) => {
                ladder(StarKind::TimeRemaining, seconds, puzzle.par_time_secs)
            }
            (_, None, None) => [completed; 3],
        };
        Self {
            objective: puzzle.objective,
            move_limit: puzzle.move_limit,
            time_limit_secs: puzzle.time_limit_secs,
            prefill: puzzle.prefill.clone(),
            star_requirements,
        }
    }

    /// Seconds the countdown starts from: the time limit, or the objective's
    /// target for survival objectives without one.
    #[must_use]
    pub fn countdown_secs(&self) -> Option<u32> {
        match (self.time_limit_secs, self.objective.kind) {
            (Some(seconds), _) => Some(seconds),
            (None, ObjectiveKind::SurviveTime) => Some(self.objective.target),
            (None, _) => None,
        }
    }
}

/// One play attempt at a level or puzzle.
#[derive(Debug)]
pub struct Session<E> {
    spec: SessionSpec,
    engine: E,
    state: SessionState,
    summary: SessionSummary,
    attempt: u64,
}

impl<E: GameEngine> Session<E> {
    /// Creates an idle session over the engine.
    #[must_use]
    pub fn new(spec: SessionSpec, engine: E) -> Self {
        Self {
            spec,
            engine,
            state: SessionState::Idle,
            summary: SessionSummary::default(),
            attempt: 0,
        }
    }

    /// Rules the session enforces.
    #[must_use]
    pub fn spec(&self) -> &SessionSpec {
        &self.spec
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Live counters of the current or last attempt.
    #[must_use]
    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Number of the current attempt, starting from one.
    #[must_use]
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Observed engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine, for the embedding game loop.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Starts a new attempt: resets the counters, applies the prefill and
    /// enters [`SessionState::Running`]. Returns the attempt number.
    pub fn begin(&mut self) -> Result<u64, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::NotIdle(self.state.label()));
        }
        self.attempt += 1;
        self.summary = SessionSummary {
            remaining_moves: self.spec.move_limit,
            time_remaining_secs: self.spec.countdown_secs(),
            ..SessionSummary::default()
        };
        self.engine.apply_prefill(&self.spec.prefill);
        self.summary.score = self.engine.current_score();
        self.state = SessionState::Running;
        info!(
            "session attempt {} started: {:?} target {}",
            self.attempt, self.spec.objective.kind, self.spec.objective.target
        );
        Ok(self.attempt)
    }

    /// Applies a placement committed by the engine.
    pub fn on_placement(&mut self, commit: PlacementCommit) -> &SessionState {
        if !self.state.is_running() {
            debug!("placement ignored while {}", self.state.label());
            return &self.state;
        }

        let summary = &mut self.summary;
        summary.moves_used = summary.moves_used.saturating_add(1);
        summary.lines_cleared = summary.lines_cleared.saturating_add(commit.lines_cleared);
        summary.max_combo = summary.max_combo.max(commit.lines_cleared);
        if self.engine.is_grid_empty() {
            summary.perfect_clears = summary.perfect_clears.saturating_add(1);
        }
        summary.score = self.engine.current_score();
        let moves_used = summary.moves_used;
        summary.remaining_moves = self
            .spec
            .move_limit
            .map(|limit| limit.saturating_sub(moves_used));

        let breached = self.spec.move_limit.map_or(false, |limit| moves_used > limit);
        if breached {
            self.fail(FailureReason::OutOfMoves);
        } else if objectives::is_lost(&self.spec.objective, &self.summary, &self.engine) {
            self.fail(FailureReason::ObjectiveFailed);
        } else if objectives::is_met(&self.spec.objective, &self.summary, &self.engine) {
            self.succeed();
        }
        &self.state
    }

    /// Advances the countdown by one second.
    ///
    /// Ticks started for an earlier attempt are ignored.
    pub fn on_tick(&mut self, attempt: u64) -> &SessionState {
        if !self.state.is_running() || attempt != self.attempt {
            debug!("tick for attempt {attempt} ignored");
            return &self.state;
        }
        let Some(remaining) = self.summary.time_remaining_secs else {
            return &self.state;
        };
        let remaining = remaining.saturating_sub(1);
        self.summary.time_remaining_secs = Some(remaining);
        self.summary.score = self.engine.current_score();

        if remaining == 0 {
            if self.spec.objective.kind == ObjectiveKind::SurviveTime {
                self.succeed();
            } else {
                self.fail(FailureReason::TimeExpired);
            }
        }
        &self.state
    }

    /// Counts a hold while the attempt is running.
    pub fn record_hold(&mut self) {
        if self.state.is_running() {
            self.summary.holds_used = self.summary.holds_used.saturating_add(1);
        }
    }

    /// Counts an undo while the attempt is running.
    pub fn record_undo(&mut self) {
        if self.state.is_running() {
            self.summary.undos_used = self.summary.undos_used.saturating_add(1);
        }
    }

    /// Ends the attempt because no remaining piece fits on the board.
    pub fn report_board_locked(&mut self) -> &SessionState {
        if self.state.is_running() {
            self.fail(FailureReason::ObjectiveFailed);
        }
        &self.state
    }

    /// Returns to [`SessionState::Idle`] without producing a result.
    pub fn conclude_due_to_manual_exit(&mut self) {
        if self.state != SessionState::Idle {
            info!(
                "session attempt {} left while {}",
                self.attempt,
                self.state.label()
            );
        }
        self.state = SessionState::Idle;
    }

    fn succeed(&mut self) {
        if !self.state.is_running() {
            return;
        }
        let stars_earned = evaluate_stars(&self.spec.star_requirements, &self.summary, true);
        info!(
            "session attempt {} succeeded: score {} in {} moves, {} stars",
            self.attempt, self.summary.score, self.summary.moves_used, stars_earned
        );
        self.state = SessionState::Succeeded(SessionResult {
            summary: self.summary.clone(),
            stars_earned,
        });
    }

    fn fail(&mut self, reason: FailureReason) {
        if !self.state.is_running() {
            return;
        }
        info!("session attempt {} failed: {reason:?}", self.attempt);
        self.state = SessionState::Failed(reason);
    }
}
