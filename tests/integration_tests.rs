//! Integration tests for the duel-queue matchmaking engine
//!
//! These tests drive the public engine API end to end:
//! - Pool ordering and removal
//! - Casual, Ranked and QuickPlay pairing
//! - Outcome resolution and the match ledger
//! - Concurrent access (see `load`)

mod fixtures;
mod load;

use duel_queue::config::{MatchingConfig, WaitEstimatorKind};
use duel_queue::error::MatchmakingError;
use duel_queue::types::{GameMode, QueueState, WaitEstimate};

use fixtures::{
    create_engine_with, create_test_engine, ids, pair_ids, queue_players, Pick, ScriptedSimulator,
};

#[test]
fn test_casual_snapshot_preserves_insertion_order() {
    let engine = create_test_engine();
    let players = queue_players(&engine, GameMode::Casual, "casual", &[7, 1, 9, 3, 3, 12]);

    assert_eq!(ids(&engine.snapshot(GameMode::Casual).unwrap()), ids(&players));
    assert_eq!(engine.count(GameMode::Casual).unwrap(), 6);
}

#[test]
fn test_casual_pairs_two_earliest_and_clears_them() {
    let engine = create_test_engine();
    let players = queue_players(&engine, GameMode::Casual, "casual", &[1, 100, 50, 2]);

    let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    assert_eq!(pair_ids(&pending), (players[0].id(), players[1].id()));
    assert_eq!(pending.skill_difference(), 99);

    for mode in GameMode::ALL {
        let waiting = ids(&engine.snapshot(mode).unwrap());
        assert!(!waiting.contains(&players[0].id()));
        assert!(!waiting.contains(&players[1].id()));
    }
    assert_eq!(players[0].queue_state(), QueueState::NotQueued);
    assert_eq!(
        ids(&engine.snapshot(GameMode::Casual).unwrap()),
        vec![players[2].id(), players[3].id()]
    );
}

#[test]
fn test_ranked_scenario_pairs_compatible_players() {
    let engine = create_test_engine();
    let a = engine.create_player("A", 10, GameMode::Ranked).unwrap();
    let b = engine.create_player("B", 11, GameMode::Ranked).unwrap();
    let c = engine.create_player("C", 20, GameMode::Ranked).unwrap();
    for player in [&a, &b, &c] {
        engine.enqueue(GameMode::Ranked, player).unwrap();
    }

    let pending = engine.try_create_match(GameMode::Ranked).unwrap().unwrap();
    assert_eq!(pair_ids(&pending), (a.id(), b.id()));
    assert_eq!(pending.skill_difference(), 1);
    assert_eq!(ids(&engine.snapshot(GameMode::Ranked).unwrap()), vec![c.id()]);

    assert!(engine.try_create_match(GameMode::Ranked).unwrap().is_none());
    assert!(c.is_queued());
}

#[test]
fn test_ranked_outlier_keeps_waiting() {
    let engine = create_test_engine();
    let players = queue_players(&engine, GameMode::Ranked, "ranked", &[10, 30, 11]);

    // A later arrival with a closer skill jumps ahead of the outlier
    let pending = engine.try_create_match(GameMode::Ranked).unwrap().unwrap();
    assert_eq!(pair_ids(&pending), (players[0].id(), players[2].id()));

    let late = queue_players(&engine, GameMode::Ranked, "late", &[50]);
    assert!(engine.try_create_match(GameMode::Ranked).unwrap().is_none());
    assert_eq!(
        ids(&engine.snapshot(GameMode::Ranked).unwrap()),
        vec![players[1].id(), late[0].id()]
    );
}

#[test]
fn test_quick_play_large_pool_ignores_skill_gap() {
    let engine = create_test_engine();
    let players = queue_players(&engine, GameMode::QuickPlay, "qp", &[10, 50, 11, 60, 12]);

    let pending = engine.try_create_match(GameMode::QuickPlay).unwrap().unwrap();
    assert_eq!(pair_ids(&pending), (players[0].id(), players[1].id()));
    assert_eq!(pending.skill_difference(), 40);
}

#[test]
fn test_quick_play_pool_of_four_never_matches() {
    let engine = create_test_engine();
    queue_players(&engine, GameMode::QuickPlay, "qp", &[10, 10, 11, 11]);

    for _ in 0..3 {
        assert!(engine.try_create_match(GameMode::QuickPlay).unwrap().is_none());
    }
    assert_eq!(engine.count(GameMode::QuickPlay).unwrap(), 4);
}

#[test]
fn test_quick_play_small_pool_behaves_like_ranked() {
    let quick = create_test_engine();
    let ranked = create_test_engine();
    let quick_players = queue_players(&quick, GameMode::QuickPlay, "qp", &[10, 50, 11]);
    let ranked_players = queue_players(&ranked, GameMode::Ranked, "rk", &[10, 50, 11]);

    let quick_match = quick.try_create_match(GameMode::QuickPlay).unwrap().unwrap();
    let ranked_match = ranked.try_create_match(GameMode::Ranked).unwrap().unwrap();

    assert_eq!(
        pair_ids(&quick_match),
        (quick_players[0].id(), quick_players[2].id())
    );
    assert_eq!(
        pair_ids(&ranked_match),
        (ranked_players[0].id(), ranked_players[2].id())
    );

    let quick = create_test_engine();
    queue_players(&quick, GameMode::QuickPlay, "qp", &[10, 50]);
    assert!(quick.try_create_match(GameMode::QuickPlay).unwrap().is_none());
}

#[test]
fn test_remove_everywhere_leaves_other_pools_alone() {
    let engine = create_test_engine();
    let casual = queue_players(&engine, GameMode::Casual, "casual", &[1, 2, 3]);
    let ranked = queue_players(&engine, GameMode::Ranked, "ranked", &[4, 5]);

    assert_eq!(
        engine.remove_everywhere(&casual[1]).unwrap(),
        Some(GameMode::Casual)
    );
    assert_eq!(
        ids(&engine.snapshot(GameMode::Casual).unwrap()),
        vec![casual[0].id(), casual[2].id()]
    );
    assert_eq!(ids(&engine.snapshot(GameMode::Ranked).unwrap()), ids(&ranked));

    // Second removal is a no-op
    assert_eq!(engine.remove_everywhere(&casual[1]).unwrap(), None);
    assert_eq!(engine.count(GameMode::Casual).unwrap(), 2);
}

#[test]
fn test_average_skill_difference() {
    let engine = create_test_engine();
    assert_eq!(engine.average_skill_difference().unwrap(), 0.0);

    let players = queue_players(&engine, GameMode::Casual, "casual", &[10, 10, 10, 14, 10, 12]);
    let simulator = ScriptedSimulator::new(Pick::Player1);
    for _ in 0..3 {
        let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
        engine.resolve_match(pending, &simulator).unwrap();
    }

    assert_eq!(engine.average_skill_difference().unwrap(), 2.0);
    assert_eq!(simulator.calls(), 3);
    assert_eq!(engine.match_history().unwrap().len(), 3);
    assert!(players.iter().all(|p| !p.is_queued()));
}

#[test]
fn test_resolve_match_records_simulated_winner() {
    let engine = create_test_engine();
    let players = queue_players(&engine, GameMode::Ranked, "ranked", &[8, 9]);
    let simulator = ScriptedSimulator::new(Pick::HigherSkill);

    let pending = engine.try_create_match(GameMode::Ranked).unwrap().unwrap();
    let recorded = engine.resolve_match(pending, &simulator).unwrap();

    assert_eq!(simulator.calls(), 1);
    assert_eq!(recorded.winner(), Some(players[1].id()));
    assert_eq!(recorded.loser(), Some(players[0].id()));
}

#[test]
fn test_recording_twice_is_already_resolved() {
    let engine = create_test_engine();
    let players = queue_players(&engine, GameMode::Casual, "casual", &[1, 2]);

    let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    let duplicate = pending.clone();
    engine.record_match(pending, players[0].id()).unwrap();

    let err = engine.record_match(duplicate, players[0].id()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MatchmakingError>(),
        Some(MatchmakingError::AlreadyResolved { .. })
    ));
    assert_eq!(engine.stats().unwrap().total_matches, 1);
}

#[test]
fn test_recording_outsider_as_winner_fails() {
    let engine = create_test_engine();
    queue_players(&engine, GameMode::Casual, "casual", &[1, 2]);
    let outsider = engine.create_player("outsider", 5, GameMode::Casual).unwrap();

    let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    let err = engine.record_match(pending, outsider.id()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MatchmakingError>(),
        Some(MatchmakingError::NotAParticipant { .. })
    ));
    assert!(engine.match_history().unwrap().is_empty());
}

#[test]
fn test_recent_matches_newest_first() {
    let engine = create_test_engine();
    let simulator = ScriptedSimulator::new(Pick::Player2);
    let hero = engine.create_player("hero", 5, GameMode::Casual).unwrap();

    let mut recorded = Vec::new();
    for round in 0..4 {
        let rival = engine
            .create_player(&format!("rival-{}", round), 5, GameMode::Casual)
            .unwrap();
        engine.enqueue(GameMode::Casual, &hero).unwrap();
        engine.enqueue(GameMode::Casual, &rival).unwrap();
        let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
        recorded.push(engine.resolve_match(pending, &simulator).unwrap().id());
    }

    let recent: Vec<_> = engine
        .recent_matches_for(hero.id(), 3)
        .unwrap()
        .iter()
        .map(|m| m.id())
        .collect();
    assert_eq!(recent, vec![recorded[3], recorded[2], recorded[1]]);

    let record = engine.player_record(hero.id()).unwrap();
    assert_eq!(record.matches_played, 4);
    assert_eq!(record.losses, 4);
    assert_eq!(record.win_rate(), 0.0);

    // Summaries are capped by the configured history limit
    let summary = engine.player_summary(&hero).unwrap();
    assert_eq!(summary.recent_matches.len(), 3);
}

#[test]
fn test_recent_matches_follow_pairing_time_when_recorded_out_of_order() {
    let engine = create_test_engine();
    let hero = engine.create_player("hero", 5, GameMode::Casual).unwrap();
    let first_rival = engine.create_player("first", 5, GameMode::Casual).unwrap();
    let second_rival = engine.create_player("second", 5, GameMode::Casual).unwrap();

    engine.enqueue(GameMode::Casual, &hero).unwrap();
    engine.enqueue(GameMode::Casual, &first_rival).unwrap();
    let paired_first = engine.try_create_match(GameMode::Casual).unwrap().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    engine.enqueue(GameMode::Casual, &hero).unwrap();
    engine.enqueue(GameMode::Casual, &second_rival).unwrap();
    let paired_second = engine.try_create_match(GameMode::Casual).unwrap().unwrap();

    // The later pairing reaches the ledger first
    let second = engine.record_match(paired_second, hero.id()).unwrap();
    let first = engine.record_match(paired_first, hero.id()).unwrap();

    let recent: Vec<_> = engine
        .recent_matches_for(hero.id(), 5)
        .unwrap()
        .iter()
        .map(|m| m.id())
        .collect();
    assert_eq!(recent, vec![second.id(), first.id()]);
}

#[test]
fn test_double_enqueue_does_not_create_self_match() {
    let engine = create_test_engine();
    let player = engine.create_player("twice", 5, GameMode::Casual).unwrap();
    engine.enqueue(GameMode::Casual, &player).unwrap();
    engine.enqueue(GameMode::Casual, &player).unwrap();

    let err = engine.try_create_match(GameMode::Casual).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MatchmakingError>(),
        Some(MatchmakingError::InternalError { .. })
    ));
    assert!(engine.match_history().unwrap().is_empty());

    engine.remove_everywhere(&player).unwrap();
    let rival = engine.create_player("rival", 5, GameMode::Casual).unwrap();
    engine.enqueue(GameMode::Casual, &player).unwrap();
    engine.enqueue(GameMode::Casual, &rival).unwrap();
    let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    assert_eq!(pair_ids(&pending), (player.id(), rival.id()));
}

#[test]
fn test_duplicate_username_is_rejected() {
    let engine = create_test_engine();
    engine.create_player("Striker", 7, GameMode::Ranked).unwrap();

    let err = engine
        .create_player("STRIKER", 3, GameMode::Casual)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MatchmakingError>(),
        Some(MatchmakingError::DuplicateUsername { .. })
    ));
    assert_eq!(engine.list_players().unwrap().len(), 1);
    assert!(engine.find_player("striker").unwrap().is_some());
}

#[test]
fn test_unknown_game_mode_from_text() {
    let err = "deathmatch".parse::<GameMode>().unwrap_err();
    assert!(matches!(err, MatchmakingError::UnknownGameMode { .. }));
    assert_eq!("Quick-Play".parse::<GameMode>().unwrap(), GameMode::QuickPlay);
}

#[test]
fn test_wait_estimates() {
    let engine = create_test_engine();
    assert_eq!(engine.estimate_wait(GameMode::Ranked).unwrap(), WaitEstimate::LongWait);

    queue_players(&engine, GameMode::Ranked, "ranked", &[1]);
    assert_eq!(engine.estimate_wait(GameMode::Ranked).unwrap(), WaitEstimate::ShortWait);

    queue_players(&engine, GameMode::Ranked, "more", &[40]);
    assert_eq!(engine.estimate_wait(GameMode::Ranked).unwrap(), WaitEstimate::NoWait);

    let skill_aware = create_engine_with(MatchingConfig {
        wait_estimator: WaitEstimatorKind::SkillAware,
        ..MatchingConfig::default()
    });
    queue_players(&skill_aware, GameMode::Ranked, "ranked", &[1, 40]);
    assert_eq!(
        skill_aware.estimate_wait(GameMode::Ranked).unwrap(),
        WaitEstimate::ShortWait
    );
}

#[test]
fn test_stats_snapshot() {
    let engine = create_test_engine();
    queue_players(&engine, GameMode::Casual, "casual", &[3, 9, 4]);
    queue_players(&engine, GameMode::QuickPlay, "qp", &[5, 5]);
    let simulator = ScriptedSimulator::new(Pick::Player1);

    let pending = engine.try_create_match(GameMode::Casual).unwrap().unwrap();
    engine.resolve_match(pending, &simulator).unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_players, 5);
    assert_eq!(stats.total_matches, 1);
    assert_eq!(stats.pool_sizes.casual, 1);
    assert_eq!(stats.pool_sizes.ranked, 0);
    assert_eq!(stats.pool_sizes.quick_play, 2);
    assert_eq!(stats.average_skill_difference, 6.0);
    assert_eq!(stats.recent_matches, 1);
}
