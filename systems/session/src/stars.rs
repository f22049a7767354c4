use gridlock_core::{SessionSummary, StarKind, StarRequirement};

/// Number of leading requirements the summary satisfies.
///
/// Evaluation stops at the first unsatisfied requirement, so a later
/// requirement never compensates for an earlier miss. Budgets that do not
/// exist (unlimited moves or time) satisfy their requirement.
#[must_use]
pub fn evaluate_stars(
    requirements: &[StarRequirement],
    summary: &SessionSummary,
    objective_completed: bool,
) -> u8 {
    let earned = requirements
        .iter()
        .take_while(|requirement| is_satisfied(requirement, summary, objective_completed))
        .count();
    u8::try_from(earned).unwrap_or(u8::MAX)
}

fn is_satisfied(
    requirement: &StarRequirement,
    summary: &SessionSummary,
    objective_completed: bool,
) -> bool {
    let threshold = requirement.threshold;
    match requirement.kind {
        StarKind::ObjectiveCompleted => objective_completed,
        StarKind::Score => summary.score >= threshold,
        StarKind::MovesRemaining => summary
            .remaining_moves
            .map_or(true, |remaining| remaining >= threshold),
        StarKind::TimeRemaining => summary
            .time_remaining_secs
            .map_or(true, |remaining| remaining >= threshold),
        StarKind::NoHoldsUsed => summary.holds_used <= threshold,
        StarKind::NoUndosUsed => summary.undos_used <= threshold,
        StarKind::PerfectClears => summary.perfect_clears >= threshold,
        StarKind::ComboAchieved => summary.max_combo >= threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::evaluate_stars;
    use gridlock_core::{SessionSummary, StarKind, StarRequirement};
    use proptest::prelude::*;

    fn moves_ladder() -> [StarRequirement; 3] {
        [
            StarRequirement::objective_completed(),
            StarRequirement::new(StarKind::MovesRemaining, 2),
            StarRequirement::new(StarKind::MovesRemaining, 3),
        ]
    }

    #[test]
    fn two_moves_left_earn_two_stars() {
        let summary = SessionSummary {
            moves_used: 3,
            remaining_moves: Some(2),
            lines_cleared: 2,
            ..SessionSummary::default()
        };
        assert_eq!(evaluate_stars(&moves_ladder(), &summary, true), 2);
    }

    #[test]
    fn first_miss_stops_the_count() {
        let requirements = [
            StarRequirement::new(StarKind::Score, 500),
            StarRequirement::objective_completed(),
            StarRequirement::objective_completed(),
        ];
        let summary = SessionSummary {
            score: 100,
            ..SessionSummary::default()
        };
        assert_eq!(evaluate_stars(&requirements, &summary, true), 0);
    }

    #[test]
    fn unlimited_budgets_satisfy_remaining_requirements() {
        let summary = SessionSummary::default();
        assert_eq!(evaluate_stars(&moves_ladder(), &summary, true), 3);
        assert_eq!(evaluate_stars(&moves_ladder(), &summary, false), 0);
    }

    #[test]
    fn holds_and_undos_are_upper_bounds() {
        let requirements = [
            StarRequirement::objective_completed(),
            StarRequirement::new(StarKind::NoUndosUsed, 1),
            StarRequirement::new(StarKind::NoUndosUsed, 0),
        ];
        let summary = SessionSummary {
            undos_used: 1,
            ..SessionSummary::default()
        };
        assert_eq!(evaluate_stars(&requirements, &summary, true), 2);
    }

    proptest! {
        #[test]
        fn evaluation_is_idempotent(
            score in 0u32..1_000,
            remaining in proptest::option::of(0u32..40),
            holds in 0u32..4,
            combo in 0u32..6,
            threshold in 0u32..40,
            completed in any::<bool>(),
        ) {
            let summary = SessionSummary {
                score,
                remaining_moves: remaining,
                holds_used: holds,
                max_combo: combo,
                ..SessionSummary::default()
            };
            let requirements = [
                StarRequirement::objective_completed(),
                StarRequirement::new(StarKind::MovesRemaining, threshold),
                StarRequirement::new(StarKind::MovesRemaining, threshold.saturating_add(5)),
            ];
            let first = evaluate_stars(&requirements, &summary, completed);
            let second = evaluate_stars(&requirements, &summary.clone(), completed);
            prop_assert_eq!(first, second);
            prop_assert!(first <= 3);
        }
    }
}
