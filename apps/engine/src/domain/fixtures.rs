//! Hand-built game states for unit tests.

use std::collections::BTreeMap;

use crate::domain::ids::{GameId, ParticipantId};
use crate::domain::rules::{HEIGHT, PADDLE_MAX_Y, WIDTH};
use crate::domain::state::{Ball, BotBinding, GameState, Phase, Role, Vec2};

pub fn participant(name: &str) -> ParticipantId {
    #[allow(clippy::expect_used)]
    ParticipantId::parse(name).expect("hardcoded valid participant")
}

fn binding(name: &str) -> BotBinding {
    BotBinding {
        participant_id: participant(name),
        callback_url: format!("http://bots.invalid/{name}"),
    }
}

/// Two-player game in `Started` with the ball at rest in the middle.
pub fn started_game() -> GameState {
    #[allow(clippy::expect_used)]
    let game_id = GameId::parse("fixture1").expect("hardcoded valid game id");

    let mut bots = BTreeMap::new();
    bots.insert(Role::Left, binding("alice"));
    bots.insert(Role::Right, binding("bob"));

    let paddles = Role::ALL
        .into_iter()
        .map(|role| (role, Vec2::new(role.paddle_x(), PADDLE_MAX_Y / 2)))
        .collect();

    GameState {
        game_id,
        owner: participant("alice"),
        players: vec![participant("alice"), participant("bob")],
        bots,
        ball: Ball {
            pos: Vec2::new(WIDTH / 2, HEIGHT / 2),
            vel: Vec2::ZERO,
        },
        paddles,
        phase: Phase::Started,
        solo: false,
        score: BTreeMap::new(),
        tick: 0,
        serves: 0,
        rng_seed: 42,
        version: 1,
    }
}

/// [`started_game`] with the ball placed and moving as given.
pub fn with_ball(pos: Vec2, vel: Vec2) -> GameState {
    let mut state = started_game();
    state.ball = Ball { pos, vel };
    state
}
