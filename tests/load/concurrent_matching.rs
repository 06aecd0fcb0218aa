//! High concurrency tests for queueing and matching
//!
//! Many tasks enqueue, withdraw and attempt matches against one shared
//! engine. Whatever the interleaving, no player may end up in two matches
//! and every player must be accounted for exactly once.

use duel_queue::ledger::Match;
use duel_queue::types::{GameMode, PlayerId};
use duel_queue::MatchmakingEngine;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::fixtures::{create_test_engine, Pick, ScriptedSimulator};

fn assert_no_player_matched_twice(matches: &[Match]) -> HashSet<PlayerId> {
    let mut seen = HashSet::new();
    for pending in matches {
        assert_ne!(pending.player1().id, pending.player2().id);
        assert!(
            seen.insert(pending.player1().id),
            "player {} matched twice",
            pending.player1().id
        );
        assert!(
            seen.insert(pending.player2().id),
            "player {} matched twice",
            pending.player2().id
        );
    }
    seen
}

fn waiting_ids(engine: &MatchmakingEngine) -> HashSet<PlayerId> {
    GameMode::ALL
        .iter()
        .flat_map(|&mode| engine.snapshot(mode).unwrap())
        .map(|player| player.id())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueue_and_match_never_double_books() {
    let engine = Arc::new(create_test_engine());
    let player_count = 200;
    let start_time = Instant::now();

    let enqueuers = (0..player_count).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mode = GameMode::ALL[i % 3];
            let player = engine
                .create_player(&format!("load-{}", i), (i % 7) as i32, mode)
                .unwrap();
            engine.enqueue(mode, &player).unwrap();
            player.id()
        })
    });

    let matchers = (0..8).map(|worker| {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut found = Vec::new();
            for round in 0..100 {
                let mode = GameMode::ALL[(worker + round) % 3];
                if let Some(pending) = engine.try_create_match(mode).unwrap() {
                    found.push(pending);
                }
                tokio::task::yield_now().await;
            }
            found
        })
    });

    let queued: Vec<PlayerId> = join_all(enqueuers)
        .await
        .into_iter()
        .map(|result| result.unwrap())
        .collect();
    let matches: Vec<Match> = join_all(matchers)
        .await
        .into_iter()
        .flat_map(|result| result.unwrap())
        .collect();

    let matched = assert_no_player_matched_twice(&matches);
    let waiting = waiting_ids(&engine);

    assert!(matched.is_disjoint(&waiting));
    assert_eq!(matched.len() + waiting.len(), queued.len());
    assert!(start_time.elapsed() < Duration::from_secs(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_removal_and_matching() {
    let engine = Arc::new(create_test_engine());
    let players: Vec<_> = (0..120)
        .map(|i| {
            let player = engine
                .create_player(&format!("casual-{}", i), 5, GameMode::Casual)
                .unwrap();
            engine.enqueue(GameMode::Casual, &player).unwrap();
            player
        })
        .collect();

    // Every third player tries to leave while matchers drain the pool
    let leavers = players.iter().step_by(3).cloned().map(|player| {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .remove_everywhere(&player)
                .unwrap()
                .map(|_| player.id())
        })
    });

    let matchers = (0..6).map(|_| {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut found = Vec::new();
            while let Some(pending) = engine.try_create_match(GameMode::Casual).unwrap() {
                found.push(pending);
                tokio::task::yield_now().await;
            }
            found
        })
    });

    let removed: HashSet<PlayerId> = join_all(leavers)
        .await
        .into_iter()
        .filter_map(|result| result.unwrap())
        .collect();
    let matches: Vec<Match> = join_all(matchers)
        .await
        .into_iter()
        .flat_map(|result| result.unwrap())
        .collect();

    let matched = assert_no_player_matched_twice(&matches);
    let waiting = waiting_ids(&engine);

    assert!(matched.is_disjoint(&removed));
    assert!(waiting.is_disjoint(&removed));
    assert_eq!(matched.len() + removed.len() + waiting.len(), players.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolution_keeps_ledger_consistent() {
    let engine = Arc::new(create_test_engine());
    let simulator = Arc::new(ScriptedSimulator::new(Pick::HigherSkill));
    for i in 0..100 {
        let player = engine
            .create_player(&format!("ranked-{}", i), (i % 4) as i32, GameMode::Ranked)
            .unwrap();
        engine.enqueue(GameMode::Ranked, &player).unwrap();
    }

    let workers = (0..5).map(|_| {
        let engine = engine.clone();
        let simulator = simulator.clone();
        tokio::spawn(async move {
            let mut recorded = 0;
            while let Some(pending) = engine.try_create_match(GameMode::Ranked).unwrap() {
                engine.resolve_match(pending, simulator.as_ref()).unwrap();
                recorded += 1;
            }
            recorded
        })
    });

    let recorded: u64 = join_all(workers)
        .await
        .into_iter()
        .map(|result| result.unwrap())
        .sum();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_matches, recorded);
    assert_eq!(simulator.calls() as u64, recorded);
    assert_no_player_matched_twice(&engine.match_history().unwrap());
    // Only ratings 0 and 3 are incompatible, so at most one of each is left
    assert!(stats.pool_sizes.ranked <= 2);
}

#[test]
fn test_ranked_window_holds_while_ratings_change() {
    let engine = create_test_engine();
    let steady = engine.create_player("steady", 10, GameMode::Ranked).unwrap();
    let swinging = engine.create_player("swinging", 11, GameMode::Ranked).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let toggler = {
        let stop = stop.clone();
        let swinging = swinging.clone();
        thread::spawn(move || {
            let mut high = false;
            while !stop.load(Ordering::Relaxed) {
                swinging.set_skill_rating(if high { 100 } else { 11 });
                high = !high;
            }
        })
    };

    let mut matches = 0;
    for _ in 0..20_000 {
        engine.enqueue(GameMode::Ranked, &steady).unwrap();
        engine.enqueue(GameMode::Ranked, &swinging).unwrap();

        match engine.try_create_match(GameMode::Ranked).unwrap() {
            Some(pending) => {
                matches += 1;
                assert!(
                    pending.skill_difference() <= 2,
                    "ranked match {} vs {} has skill difference {}",
                    pending.player1().skill_rating,
                    pending.player2().skill_rating,
                    pending.skill_difference()
                );
                assert_eq!(
                    pending.skill_difference(),
                    pending
                        .player1()
                        .skill_rating
                        .abs_diff(pending.player2().skill_rating)
                );
            }
            None => {
                engine.remove_everywhere(&steady).unwrap();
                engine.remove_everywhere(&swinging).unwrap();
            }
        }
    }

    stop.store(true, Ordering::Relaxed);
    toggler.join().unwrap();

    assert!(matches > 0);
    assert_eq!(engine.count(GameMode::Ranked).unwrap(), 0);
}
