use std::collections::BTreeSet;

use gridlock_core::{
    LevelId, LevelType, ObjectiveKind, PackId, ProgressBook, SessionResult, SessionSummary,
    StarKind, StarRequirement, UnlockRequirement, BOSS_LEVEL_INDEX, LEVELS_PER_PACK,
};
use gridlock_system_catalog::{
    verify_star_ordering, Catalog, CatalogConfig, CatalogError, LevelCatalogBuilder,
    BOSS_PATTERNS,
};
use proptest::prelude::*;

fn default_catalog() -> Catalog {
    LevelCatalogBuilder::default()
        .build()
        .expect("default catalog builds")
}

fn success(stars: u8) -> SessionResult {
    SessionResult {
        summary: SessionSummary::default(),
        stars_earned: stars,
    }
}

#[test]
fn every_world_holds_fifteen_levels() {
    let catalog = default_catalog();
    assert_eq!(catalog.packs().len(), 10);
    for pack in catalog.packs() {
        assert_eq!(pack.levels.len(), usize::from(LEVELS_PER_PACK));
        for (level, index) in pack.levels.iter().zip(1..=LEVELS_PER_PACK) {
            assert_eq!(level.index_in_pack, index);
            assert_eq!(level.pack_id, pack.id);
        }
    }
    assert_eq!(catalog.total_levels(), 150);
    assert_eq!(catalog.max_stars(), 450);
}

#[test]
fn boss_is_hardest_and_uses_a_unique_pattern() {
    let catalog = default_catalog();
    for pack in catalog.packs() {
        let boss = pack.boss().expect("boss level");
        assert_eq!(boss.index_in_pack, BOSS_LEVEL_INDEX);
        assert!(BOSS_PATTERNS.contains(&boss.pattern));
        assert!(boss.rewards.unlock_token.is_some());
        for level in &pack.levels {
            assert!(boss.difficulty >= level.difficulty);
            if !level.is_boss() {
                assert_ne!(level.pattern, boss.pattern);
            }
        }
    }
}

#[test]
fn difficulty_steps_every_three_levels() {
    let catalog = default_catalog();
    let pack = catalog.pack(PackId::new(1)).expect("first world");
    let difficulties: Vec<u8> = pack
        .levels
        .iter()
        .filter(|level| !level.is_boss())
        .map(|level| level.difficulty.get())
        .collect();
    assert_eq!(difficulties, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5]);
    assert_eq!(pack.boss().expect("boss").difficulty.get(), 6);
}

#[test]
fn unlock_chain_links_neighbours_and_gates_worlds() {
    let catalog = default_catalog();
    let mut previous_gate = None;
    for level in catalog.levels() {
        match (level.index_in_pack, level.pack_id.get()) {
            (1, 1) => assert_eq!(level.unlock, UnlockRequirement::None),
            (1, _) => {
                let UnlockRequirement::TotalStars(stars) = level.unlock else {
                    panic!("world gate expected on level {}", level.id.get());
                };
                if let Some(previous) = previous_gate {
                    assert!(stars > previous);
                }
                previous_gate = Some(stars);
            }
            _ => assert_eq!(
                level.unlock,
                UnlockRequirement::PriorLevel(LevelId::new(level.id.get() - 1))
            ),
        }
    }
}

#[test]
fn level_types_follow_their_objectives() {
    let catalog = default_catalog();
    let mut seen = BTreeSet::new();
    for level in catalog.levels() {
        let _ = seen.insert(format!("{:?}", level.level_type));
        match level.level_type {
            LevelType::Obstacle => {
                assert_eq!(level.objective.kind, ObjectiveKind::ClearLines);
                assert!(level.prefill.iter().all(|cell| cell.locked));
            }
            LevelType::ClearTarget => {
                assert_eq!(level.objective.kind, ObjectiveKind::ClearAllBlocks);
                assert!(!level.prefill.is_empty());
                assert!(level.prefill.iter().all(|cell| !cell.locked));
            }
            LevelType::Timed => {
                assert_eq!(level.objective.kind, ObjectiveKind::ReachScore);
                assert!(level.constraints.time_limit_secs.is_some());
                assert!(level.constraints.move_limit.is_none());
                assert_eq!(level.star_requirements[1].kind, StarKind::TimeRemaining);
            }
            LevelType::LimitedPieces => {
                let pieces = level
                    .constraints
                    .allowed_pieces
                    .as_ref()
                    .expect("piece subset");
                assert!(pieces.len() >= 3);
            }
            LevelType::ScoreTarget => {
                assert_eq!(level.objective.kind, ObjectiveKind::ReachScore);
                assert!(level.constraints.move_limit.is_some());
            }
        }
    }
    assert_eq!(seen.len(), 5, "every level type appears: {seen:?}");
}

#[test]
fn builds_are_byte_identical() {
    let first = default_catalog();
    let second = default_catalog();
    assert_eq!(first, second);

    let first_json = serde_json::to_string(first.packs()).expect("serializes");
    let second_json = serde_json::to_string(second.packs()).expect("serializes");
    assert_eq!(first_json, second_json);
}

#[test]
fn lookups_cross_pack_boundaries() {
    let catalog = default_catalog();
    let level = catalog.level(LevelId::new(16)).expect("level 16");
    assert_eq!(level.pack_id, PackId::new(2));
    assert_eq!(level.index_in_pack, 1);

    let next = catalog.next_level(LevelId::new(15)).expect("next level");
    assert_eq!(next.id, LevelId::new(16));
    assert!(catalog.level(LevelId::new(0)).is_none());
    assert!(catalog.level(LevelId::new(151)).is_none());
    assert!(catalog.next_level(LevelId::new(150)).is_none());
}

#[test]
fn unlocks_follow_recorded_progress() {
    let catalog = default_catalog();
    let mut progress = ProgressBook::new();
    assert!(catalog.is_unlocked(LevelId::new(1), &progress));
    assert!(!catalog.is_unlocked(LevelId::new(2), &progress));

    progress.record(LevelId::new(1), None);
    assert!(!catalog.is_unlocked(LevelId::new(2), &progress));

    progress.record(LevelId::new(1), Some(&success(3)));
    assert!(catalog.is_unlocked(LevelId::new(2), &progress));

    assert!(!catalog.is_unlocked(LevelId::new(16), &progress));
    for id in 2..=10 {
        progress.record(LevelId::new(id), Some(&success(3)));
    }
    assert_eq!(progress.total_stars(), 30);
    assert!(catalog.is_unlocked(LevelId::new(16), &progress));
    assert!(!catalog.is_unlocked(LevelId::new(999), &progress));
}

#[test]
fn pack_completion_gate_requires_every_level() {
    let builder = LevelCatalogBuilder::default();
    let first = builder.build_pack(PackId::new(1));
    let mut second = builder.build_pack(PackId::new(2));
    second.levels[0].unlock = UnlockRequirement::PackCompleted(PackId::new(1));
    let catalog = Catalog::from_packs(vec![first, second]);

    let mut progress = ProgressBook::new();
    for id in 1..=14 {
        progress.record(LevelId::new(id), Some(&success(1)));
    }
    assert!(!catalog.is_unlocked(LevelId::new(16), &progress));
    progress.record(LevelId::new(15), Some(&success(1)));
    assert!(catalog.is_unlocked(LevelId::new(16), &progress));
}

#[test]
fn star_ordering_rejects_loosening_requirements() {
    let mut packs = default_catalog().packs().to_vec();
    packs[0].levels[3].star_requirements = [
        StarRequirement::objective_completed(),
        StarRequirement::new(StarKind::MovesRemaining, 6),
        StarRequirement::new(StarKind::MovesRemaining, 2),
    ];
    let catalog = Catalog::from_packs(packs);
    assert_eq!(
        verify_star_ordering(&catalog),
        Err(CatalogError::StarOrdering {
            level: 4,
            position: 3,
        })
    );
}

#[test]
fn default_catalog_passes_star_ordering() {
    assert_eq!(verify_star_ordering(&default_catalog()), Ok(()));
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = CatalogConfig {
        worlds: 0,
        ..CatalogConfig::default()
    };
    let error = LevelCatalogBuilder::new(config).expect_err("zero worlds rejected");
    assert!(matches!(error, CatalogError::InvalidConfig(_)));
    assert!(error.to_string().contains("at least one world"));
}

#[test]
fn custom_world_count_and_grid_size() {
    let config = CatalogConfig {
        worlds: 3,
        grid_size: 10,
        ..CatalogConfig::default()
    };
    let catalog = LevelCatalogBuilder::new(config)
        .expect("valid config")
        .build()
        .expect("catalog builds");
    assert_eq!(catalog.total_levels(), 45);
    assert!(catalog.levels().all(|level| level.grid_size == 10));
    assert!(catalog
        .levels()
        .flat_map(|level| level.prefill.iter())
        .all(|cell| cell.coord.is_within(10)));
}

#[test]
fn oversized_rewards_saturate() {
    let config = CatalogConfig {
        worlds: 1,
        level_xp: u32::MAX,
        level_coins: u32::MAX / 2,
        ..CatalogConfig::default()
    };
    let catalog = LevelCatalogBuilder::new(config)
        .expect("valid config")
        .build()
        .expect("catalog builds");
    for level in catalog.levels() {
        assert_eq!(level.rewards.xp, u32::MAX);
        assert!(level.rewards.coins >= u32::MAX / 2);
    }
}

proptest! {
    #[test]
    fn any_valid_star_fractions_keep_requirements_ordered(
        worlds in 1u32..=4,
        two in 1u32..100,
        gap in 1u32..100,
    ) {
        let config = CatalogConfig {
            worlds,
            two_star_percent: two,
            three_star_percent: (two + gap).min(100),
            ..CatalogConfig::default()
        };
        let catalog = LevelCatalogBuilder::new(config)
            .expect("valid config")
            .build()
            .expect("catalog builds");
        prop_assert_eq!(catalog.total_levels(), worlds as usize * usize::from(LEVELS_PER_PACK));
        prop_assert_eq!(verify_star_ordering(&catalog), Ok(()));
        for level in catalog.levels() {
            let thresholds: Vec<u32> = level.star_requirements[1..]
                .iter()
                .map(|requirement| requirement.threshold)
                .collect();
            prop_assert!(thresholds[0] <= thresholds[1], "level {}", level.id.get());
        }
    }
}
