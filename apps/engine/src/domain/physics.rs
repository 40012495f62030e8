//! Deterministic single-tick Pong physics.
//!
//! `next_state` is pure: the only variation comes from serves, and those are
//! seeded from the snapshot itself (`rng_seed`, `serves`).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::rules::{
    BALL_RADIUS, HEIGHT, LEFT_FACE_X, MAX_BALL_SPEED_X, MAX_BALL_SPEED_Y, MAX_ENGLISH,
    MAX_SERVE_SPEED_Y, PADDLE_HEIGHT, PADDLE_MAX_Y, PADDLE_STEP, POINTS_TO_WIN, RIGHT_FACE_X,
    SERVE_SPEED_X, SPEED_INCREMENT, WIDTH,
};
use crate::domain::seed_derivation::derive_serve_seed;
use crate::domain::state::{Ball, GameState, Moves, Phase, Role, Vec2};
use crate::errors::domain::{ConflictKind, DomainError};

pub const CENTER: Vec2 = Vec2::new(WIDTH / 2, HEIGHT / 2);

/// Ball placed at the center and sent toward `toward`'s side.
pub fn serve(rng_seed: u64, serve_no: u32, toward: Role) -> Ball {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_serve_seed(rng_seed, serve_no));
    let vy = rng.random_range(-MAX_SERVE_SPEED_Y..=MAX_SERVE_SPEED_Y);
    let vx = match toward {
        Role::Left => -SERVE_SPEED_X,
        Role::Right => SERVE_SPEED_X,
    };
    Ball {
        pos: CENTER,
        vel: Vec2::new(vx, vy),
    }
}

/// Advance a started game by one tick.
///
/// Fails without producing output if the input snapshot breaks an invariant
/// or the game is not in `Started`.
pub fn next_state(state: &GameState, moves: &Moves) -> Result<GameState, DomainError> {
    state.validate()?;
    if state.phase != Phase::Started {
        return Err(DomainError::conflict(
            ConflictKind::PhaseMismatch,
            format!("game {} is {:?}, only started games tick", state.game_id, state.phase),
        ));
    }

    let mut next = state.clone();
    move_paddles(&mut next, moves);

    let from = next.ball.pos;
    let mut ball = next.ball;
    ball.pos += ball.vel;
    reflect_off_walls(&mut ball);

    match face_crossed(from, &ball) {
        Some(role) => {
            let paddle = next.paddle(role);
            let y = crossing_height(role, from, &ball);
            if covers(paddle, y) {
                next.ball = return_ball(role, paddle, y, ball.vel);
            } else {
                award_point(&mut next, role.opponent());
            }
        }
        None => next.ball = ball,
    }

    next.tick += 1;
    Ok(next)
}

fn move_paddles(state: &mut GameState, moves: &Moves) {
    for (role, mv) in moves {
        // nobody plays this paddle
        if !state.bots.contains_key(role) {
            continue;
        }
        let mut paddle = state.paddle(*role);
        paddle.y = (paddle.y + mv.dy() * PADDLE_STEP).clamp(0, PADDLE_MAX_Y);
        state.paddles.insert(*role, paddle);
    }
}

fn reflect_off_walls(ball: &mut Ball) {
    let min_y = BALL_RADIUS;
    let max_y = HEIGHT - BALL_RADIUS;
    if ball.pos.y < min_y {
        ball.pos.y = 2 * min_y - ball.pos.y;
        ball.vel.y = -ball.vel.y;
    } else if ball.pos.y > max_y {
        ball.pos.y = 2 * max_y - ball.pos.y;
        ball.vel.y = -ball.vel.y;
    }
    ball.pos.y = ball.pos.y.clamp(min_y, max_y);
}

/// Paddle plane the ball's leading edge reached during this tick, if any.
///
/// The check is swept over the whole displacement, so no speed can carry the
/// ball past a face without being tested against the paddle.
fn face_crossed(from: Vec2, ball: &Ball) -> Option<Role> {
    if ball.vel.x < 0 {
        let before = from.x - BALL_RADIUS;
        let after = ball.pos.x - BALL_RADIUS;
        (before >= LEFT_FACE_X && after <= LEFT_FACE_X).then_some(Role::Left)
    } else if ball.vel.x > 0 {
        let before = from.x + BALL_RADIUS;
        let after = ball.pos.x + BALL_RADIUS;
        (before <= RIGHT_FACE_X && after >= RIGHT_FACE_X).then_some(Role::Right)
    } else {
        None
    }
}

/// Ball center height at the moment its edge meets `role`'s face.
fn crossing_height(role: Role, from: Vec2, ball: &Ball) -> i32 {
    let travel = (ball.pos.x - from.x).abs();
    let to_face = match role {
        Role::Left => from.x - BALL_RADIUS - LEFT_FACE_X,
        Role::Right => RIGHT_FACE_X - (from.x + BALL_RADIUS),
    };
    let y = if travel == 0 {
        ball.pos.y
    } else {
        from.y + (ball.pos.y - from.y) * to_face / travel
    };
    y.clamp(BALL_RADIUS, HEIGHT - BALL_RADIUS)
}

fn covers(paddle: Vec2, ball_y: i32) -> bool {
    ball_y + BALL_RADIUS >= paddle.y && ball_y - BALL_RADIUS <= paddle.y + PADDLE_HEIGHT
}

fn return_ball(role: Role, paddle: Vec2, y: i32, vel: Vec2) -> Ball {
    let speed_x = (vel.x.abs() + SPEED_INCREMENT).min(MAX_BALL_SPEED_X);
    let offset = y - (paddle.y + PADDLE_HEIGHT / 2);
    let english = offset * MAX_ENGLISH / (PADDLE_HEIGHT / 2 + BALL_RADIUS);
    let vy = (vel.y + english).clamp(-MAX_BALL_SPEED_Y, MAX_BALL_SPEED_Y);

    let (x, vx) = match role {
        Role::Left => (LEFT_FACE_X + BALL_RADIUS, speed_x),
        Role::Right => (RIGHT_FACE_X - BALL_RADIUS, -speed_x),
    };
    Ball {
        pos: Vec2::new(x, y),
        vel: Vec2::new(vx, vy),
    }
}

fn award_point(state: &mut GameState, scorer: Role) {
    let points = state.score.entry(scorer).or_insert(0);
    *points += 1;

    if *points >= POINTS_TO_WIN {
        state.phase = Phase::Finished;
        state.ball = Ball {
            pos: CENTER,
            vel: Vec2::ZERO,
        };
        return;
    }

    state.serves += 1;
    state.ball = serve(state.rng_seed, state.serves, scorer.opponent());
}
