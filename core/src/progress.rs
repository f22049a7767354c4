//! Best-result bookkeeping kept by the caller between sessions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{LevelId, SessionResult};

/// Best results recorded for a single level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Most stars earned in any successful attempt.
    pub best_stars: u8,
    /// Highest score of any successful attempt.
    pub best_score: u32,
    /// Number of attempts, successful or not.
    pub attempts: u32,
    /// Indicates whether any attempt succeeded.
    pub completed: bool,
}

impl LevelProgress {
    /// Folds an attempt into the record. Failed attempts only bump the counter.
    pub fn record_attempt(&mut self, result: Option<&SessionResult>) {
        self.attempts = self.attempts.saturating_add(1);
        if let Some(result) = result {
            self.completed = true;
            self.best_stars = self.best_stars.max(result.stars_earned);
            self.best_score = self.best_score.max(result.summary.score);
        }
    }
}

/// Per-level progress for a single player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressBook {
    levels: BTreeMap<LevelId, LevelProgress>,
}

impl ProgressBook {
    /// Creates an empty progress book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attempt on the level.
    pub fn record(&mut self, level: LevelId, result: Option<&SessionResult>) {
        self.levels.entry(level).or_default().record_attempt(result);
    }

    /// Progress recorded for the level, if any.
    #[must_use]
    pub fn level(&self, level: LevelId) -> Option<&LevelProgress> {
        self.levels.get(&level)
    }

    /// Reports whether the level has been completed at least once.
    #[must_use]
    pub fn is_completed(&self, level: LevelId) -> bool {
        self.levels
            .get(&level)
            .map_or(false, |progress| progress.completed)
    }

    /// Sum of the best star counts across every level.
    #[must_use]
    pub fn total_stars(&self) -> u32 {
        self.levels
            .values()
            .map(|progress| u32::from(progress.best_stars))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressBook;
    use crate::{LevelId, SessionResult, SessionSummary};

    fn success(score: u32, stars: u8) -> SessionResult {
        SessionResult {
            summary: SessionSummary {
                score,
                ..SessionSummary::default()
            },
            stars_earned: stars,
        }
    }

    #[test]
    fn best_values_never_regress() {
        let mut book = ProgressBook::new();
        let level = LevelId::new(4);
        book.record(level, Some(&success(500, 3)));
        book.record(level, Some(&success(900, 1)));
        book.record(level, None);

        let progress = book.level(level).expect("recorded");
        assert_eq!(progress.attempts, 3);
        assert_eq!(progress.best_stars, 3);
        assert_eq!(progress.best_score, 900);
        assert!(book.is_completed(level));
    }

    #[test]
    fn failures_alone_do_not_complete() {
        let mut book = ProgressBook::new();
        book.record(LevelId::new(1), None);
        assert!(!book.is_completed(LevelId::new(1)));
        assert!(!book.is_completed(LevelId::new(2)));
        assert_eq!(book.total_stars(), 0);
    }

    #[test]
    fn total_stars_sums_best_counts() {
        let mut book = ProgressBook::new();
        book.record(LevelId::new(1), Some(&success(10, 2)));
        book.record(LevelId::new(2), Some(&success(10, 3)));
        book.record(LevelId::new(2), Some(&success(10, 1)));
        assert_eq!(book.total_stars(), 5);
    }
}
