//! Test fixtures and scripted implementations for integration testing

#![allow(dead_code)]

use duel_queue::config::{LedgerSettings, MatchingConfig};
use duel_queue::error::Result;
use duel_queue::ledger::Match;
use duel_queue::outcome::OutcomeSimulator;
use duel_queue::player::PlayerHandle;
use duel_queue::types::{GameMode, PlayerId};
use duel_queue::MatchmakingEngine;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Which side a `ScriptedSimulator` declares the winner
#[derive(Debug, Clone, Copy)]
pub enum Pick {
    Player1,
    Player2,
    HigherSkill,
}

/// Deterministic simulator that counts how often it was consulted
#[derive(Debug)]
pub struct ScriptedSimulator {
    pick: Pick,
    calls: AtomicUsize,
}

impl ScriptedSimulator {
    pub fn new(pick: Pick) -> Self {
        Self {
            pick,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OutcomeSimulator for ScriptedSimulator {
    fn decide_winner(&self, pending: &Match) -> Result<PlayerId> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let winner = match self.pick {
            Pick::Player1 => pending.player1(),
            Pick::Player2 => pending.player2(),
            Pick::HigherSkill => {
                if pending.player2().skill_rating > pending.player1().skill_rating {
                    pending.player2()
                } else {
                    pending.player1()
                }
            }
        };
        Ok(winner.id)
    }
}

/// Engine with default matching and ledger settings
pub fn create_test_engine() -> MatchmakingEngine {
    create_engine_with(MatchingConfig::default())
}

pub fn create_engine_with(matching: MatchingConfig) -> MatchmakingEngine {
    MatchmakingEngine::new(&matching, LedgerSettings::default())
        .expect("Failed to create matchmaking engine")
}

/// Register one player per skill and queue them in order
pub fn queue_players(
    engine: &MatchmakingEngine,
    mode: GameMode,
    prefix: &str,
    skills: &[i32],
) -> Vec<PlayerHandle> {
    skills
        .iter()
        .enumerate()
        .map(|(i, &skill)| {
            let player = engine
                .create_player(&format!("{}-{}", prefix, i), skill, mode)
                .expect("Failed to create player");
            engine.enqueue(mode, &player).expect("Failed to enqueue player");
            player
        })
        .collect()
}

pub fn ids(players: &[PlayerHandle]) -> Vec<PlayerId> {
    players.iter().map(|p| p.id()).collect()
}

/// Ids of both sides of a match, player 1 first
pub fn pair_ids(pending: &Match) -> (PlayerId, PlayerId) {
    (pending.player1().id, pending.player2().id)
}
