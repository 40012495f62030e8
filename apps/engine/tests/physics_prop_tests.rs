//! Property-based tests for the tick function.
//!
//! Increase cases locally with: PROPTEST_CASES=2000 cargo test -p pong-engine

mod support;

use std::env;

use pong_engine::domain::rules::{
    BALL_RADIUS, HEIGHT, LEFT_FACE_X, MAX_BALL_SPEED_X, MAX_BALL_SPEED_Y, PADDLE_HEIGHT,
    PADDLE_MAX_Y, POINTS_TO_WIN, RIGHT_FACE_X,
};
use pong_engine::domain::{Ball, Vec2};
use pong_engine::{next_state, GameState, Move, Moves, Phase, Role};
use proptest::prelude::*;
use support::states;

fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(32); // Low default for fast CI

    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn any_move() -> impl Strategy<Value = Move> {
    prop_oneof![Just(Move::Up), Just(Move::Down), Just(Move::None)]
}

fn any_moves() -> impl Strategy<Value = Moves> {
    (any_move(), any_move()).prop_map(|(l, r)| Moves::from([(Role::Left, l), (Role::Right, r)]))
}

prop_compose! {
    fn any_ball()(
        x in LEFT_FACE_X + BALL_RADIUS..=RIGHT_FACE_X - BALL_RADIUS,
        y in BALL_RADIUS..=HEIGHT - BALL_RADIUS,
        vx in -MAX_BALL_SPEED_X..=MAX_BALL_SPEED_X,
        vy in -MAX_BALL_SPEED_Y..=MAX_BALL_SPEED_Y,
    ) -> Ball {
        Ball { pos: Vec2::new(x, y), vel: Vec2::new(vx, vy) }
    }
}

prop_compose! {
    fn any_started_game()(
        ball in any_ball(),
        left_y in 0..=PADDLE_MAX_Y,
        right_y in 0..=PADDLE_MAX_Y,
        left_score in 0..POINTS_TO_WIN,
        right_score in 0..POINTS_TO_WIN,
        serves in 0u32..40,
        rng_seed in any::<u64>(),
    ) -> GameState {
        let mut state = states::started("propgame", ball, left_y, right_y);
        state.score.insert(Role::Left, left_score);
        state.score.insert(Role::Right, right_score);
        state.serves = serves;
        state.rng_seed = rng_seed;
        state
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn identical_inputs_give_identical_outputs(state in any_started_game(), moves in any_moves()) {
        let a = next_state(&state, &moves).unwrap();
        let b = next_state(&state, &moves).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn output_stays_on_the_field(state in any_started_game(), moves in any_moves()) {
        let next = next_state(&state, &moves).unwrap();

        prop_assert!((BALL_RADIUS..=HEIGHT - BALL_RADIUS).contains(&next.ball.pos.y));
        for role in Role::ALL {
            prop_assert!((0..=PADDLE_MAX_Y).contains(&next.paddle(role).y));
        }
        prop_assert!(next.validate().is_ok(), "{:?}", next.validate());
        prop_assert_eq!(next.tick, state.tick + 1);
    }

    #[test]
    fn a_point_is_scored_at_most_once_per_tick(state in any_started_game(), moves in any_moves()) {
        let next = next_state(&state, &moves).unwrap();
        let before: u32 = Role::ALL.iter().map(|r| state.score_of(*r)).sum();
        let after: u32 = Role::ALL.iter().map(|r| next.score_of(*r)).sum();

        prop_assert!(after == before || after == before + 1);
        if after == before + 1 {
            prop_assert!(next.is_finished() || next.serves == state.serves + 1);
        }
    }

    #[test]
    fn fastest_ball_cannot_pass_a_covering_paddle(
        paddle_y in 0..=PADDLE_MAX_Y,
        offset in 0..=PADDLE_HEIGHT,
        x in LEFT_FACE_X + BALL_RADIUS..=LEFT_FACE_X + BALL_RADIUS + MAX_BALL_SPEED_X,
    ) {
        let y = (paddle_y + offset).clamp(BALL_RADIUS, HEIGHT - BALL_RADIUS);
        let ball = Ball {
            pos: Vec2::new(x, y),
            vel: Vec2::new(-MAX_BALL_SPEED_X, 0),
        };
        let state = states::started("tunnel01", ball, paddle_y, PADDLE_MAX_Y / 2);

        let next = next_state(&state, &Moves::new()).unwrap();

        prop_assert!(next.ball.vel.x > 0, "ball went through at {:?}", state.ball);
        prop_assert_eq!(next.score_of(Role::Right), 0);
        prop_assert_eq!(next.phase, Phase::Started);
    }
}
