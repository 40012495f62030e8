//! Hand-built snapshots for tests that bypass the lifecycle service.

use std::collections::BTreeMap;

use pong_engine::domain::{Ball, BotBinding, Vec2};
use pong_engine::{GameId, GameState, Phase, Role};

use super::participant;

/// Two-player started game with the given ball and paddle heights.
pub fn started(id: &str, ball: Ball, left_y: i32, right_y: i32) -> GameState {
    let mut bots = BTreeMap::new();
    for (role, name) in [(Role::Left, "alice"), (Role::Right, "bob")] {
        bots.insert(
            role,
            BotBinding {
                participant_id: participant(name),
                callback_url: format!("http://bots.invalid/{name}"),
            },
        );
    }

    GameState {
        game_id: GameId::parse(id).expect("valid game id"),
        owner: participant("alice"),
        players: vec![participant("alice"), participant("bob")],
        bots,
        ball,
        paddles: BTreeMap::from([
            (Role::Left, Vec2::new(Role::Left.paddle_x(), left_y)),
            (Role::Right, Vec2::new(Role::Right.paddle_x(), right_y)),
        ]),
        phase: Phase::Started,
        solo: false,
        score: BTreeMap::new(),
        tick: 0,
        serves: 0,
        rng_seed: 7,
        version: 1,
    }
}
