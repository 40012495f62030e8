//! Wire format of the bot decision protocol.

use serde::{Deserialize, Serialize};

use crate::domain::rules::PADDLE_HEIGHT;
use crate::domain::state::{GameState, Role, Vec2};

/// What a bot is allowed to see: its own paddle and the ball.
///
/// The opponent's paddle is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotView {
    /// Paddle `x` and its upper (leading) edge
    pub paddle: Vec2,
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
}

impl BotView {
    pub fn for_role(state: &GameState, role: Role) -> Self {
        let paddle = state.paddle(role);
        Self {
            paddle: Vec2::new(paddle.x, paddle.y + PADDLE_HEIGHT),
            ball_pos: state.ball.pos,
            ball_vel: state.ball.vel,
        }
    }
}

/// Bot reply: `1` up, `0` stay, `-1` down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotDecision {
    pub event: i64,
}
