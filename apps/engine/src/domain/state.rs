//! Authoritative state of one Pong match.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::ids::{GameId, ParticipantId};
use crate::domain::rules::{
    BALL_RADIUS, HEIGHT, LEFT_FACE_X, MAX_BALL_SPEED_X, MAX_BALL_SPEED_Y, MAX_PLAYERS,
    MIN_PLAYERS_TO_READY, PADDLE_MARGIN, PADDLE_MAX_Y, PADDLE_WIDTH, RIGHT_FACE_X, WIDTH,
};
use crate::errors::domain::{DomainError, ValidationKind};

/// Integer 2-vector, serialized as a two-element array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Vec2 {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for [i32; 2] {
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

/// Fixed paddle slot of the Pong game type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Left,
    Right,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Left, Role::Right];

    pub fn opponent(self) -> Role {
        match self {
            Role::Left => Role::Right,
            Role::Right => Role::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Left => "left",
            Role::Right => "right",
        }
    }

    /// X coordinate of this role's paddle (its left edge).
    pub fn paddle_x(self) -> i32 {
        match self {
            Role::Left => PADDLE_MARGIN,
            Role::Right => WIDTH - PADDLE_MARGIN - PADDLE_WIDTH,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Role::Left),
            "right" => Ok(Role::Right),
            other => Err(DomainError::validation(
                ValidationKind::UnknownRole,
                format!("'{other}' is not a pong role (expected left or right)"),
            )),
        }
    }
}

/// One tick's input for a paddle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    #[default]
    None,
}

impl Move {
    /// Map a bot decision code (`1`, `0`, `-1`). Anything else is `None`.
    pub fn from_code(code: i64) -> Option<Move> {
        match code {
            1 => Some(Move::Up),
            0 => Some(Move::None),
            -1 => Some(Move::Down),
            _ => None,
        }
    }

    pub fn dy(self) -> i32 {
        match self {
            Move::Up => 1,
            Move::Down => -1,
            Move::None => 0,
        }
    }
}

/// Moves for one tick keyed by role.
pub type Moves = BTreeMap<Role, Move>;

/// Participant and callback bound to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotBinding {
    pub participant_id: ParticipantId,
    pub callback_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Explicit lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created, waiting for enough participants
    Lobby,
    /// Enough participants joined, not started
    Ready,
    /// Being ticked
    Started,
    /// A role reached the winning score
    Finished,
}

/// Complete authoritative snapshot of one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub game_id: GameId,
    pub owner: ParticipantId,
    pub players: Vec<ParticipantId>,
    pub bots: BTreeMap<Role, BotBinding>,
    pub ball: Ball,
    /// Lower-left corner of each paddle.
    pub paddles: BTreeMap<Role, Vec2>,
    pub phase: Phase,
    /// Started without enough players under a permissive start policy.
    pub solo: bool,
    pub score: BTreeMap<Role, u32>,
    /// Number of physics ticks applied.
    pub tick: u64,
    /// Number of serves after a point was scored.
    pub serves: u32,
    pub rng_seed: u64,
    /// Optimistic-lock stamp, bumped on every persisted write.
    pub version: u64,
}

impl GameState {
    pub fn is_ready(&self) -> bool {
        self.players.len() >= MIN_PLAYERS_TO_READY
    }

    pub fn is_started(&self) -> bool {
        matches!(self.phase, Phase::Started | Phase::Finished)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_member(&self, participant: &ParticipantId) -> bool {
        self.players.contains(participant)
    }

    pub fn paddle(&self, role: Role) -> Vec2 {
        self.paddles
            .get(&role)
            .copied()
            .unwrap_or(Vec2::new(role.paddle_x(), PADDLE_MAX_Y / 2))
    }

    pub fn score_of(&self, role: Role) -> u32 {
        self.score.get(&role).copied().unwrap_or(0)
    }

    /// Check every structural and physical invariant of the snapshot.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.validate_membership()?;
        self.validate_phase()?;
        self.validate_physics()
    }

    fn validate_membership(&self) -> Result<(), DomainError> {
        if self.players.len() > MAX_PLAYERS {
            return Err(malformed(format!(
                "{} players exceeds the maximum of {MAX_PLAYERS}",
                self.players.len()
            )));
        }
        if !self.players.contains(&self.owner) {
            return Err(malformed(format!("owner {} is not a player", self.owner)));
        }
        for (i, p) in self.players.iter().enumerate() {
            if self.players[..i].contains(p) {
                return Err(malformed(format!("player {p} listed twice")));
            }
        }
        for (role, binding) in &self.bots {
            if !self.players.contains(&binding.participant_id) {
                return Err(malformed(format!(
                    "role {role} bound to non-member {}",
                    binding.participant_id
                )));
            }
        }
        Ok(())
    }

    fn validate_phase(&self) -> Result<(), DomainError> {
        match self.phase {
            Phase::Lobby if self.is_ready() => {
                Err(malformed("lobby game already has enough players"))
            }
            Phase::Ready if !self.is_ready() => Err(malformed("ready game lacks players")),
            Phase::Started if !self.is_ready() && !self.solo => {
                Err(malformed("started game lacks players"))
            }
            _ => Ok(()),
        }
    }

    fn validate_physics(&self) -> Result<(), DomainError> {
        for role in Role::ALL {
            let Some(paddle) = self.paddles.get(&role) else {
                return Err(DomainError::invariant(format!("missing {role} paddle")));
            };
            if paddle.x != role.paddle_x() || !(0..=PADDLE_MAX_Y).contains(&paddle.y) {
                return Err(DomainError::invariant(format!(
                    "{role} paddle at {paddle:?} is off the field"
                )));
            }
        }

        let Ball { pos, vel } = self.ball;
        if !(BALL_RADIUS..=HEIGHT - BALL_RADIUS).contains(&pos.y)
            || !(LEFT_FACE_X + BALL_RADIUS..=RIGHT_FACE_X - BALL_RADIUS).contains(&pos.x)
        {
            return Err(DomainError::invariant(format!(
                "ball at {pos:?} is outside the field"
            )));
        }
        if vel.x.abs() > MAX_BALL_SPEED_X || vel.y.abs() > MAX_BALL_SPEED_Y {
            return Err(DomainError::invariant(format!(
                "ball velocity {vel:?} exceeds the speed bound"
            )));
        }
        Ok(())
    }
}

fn malformed(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::MalformedSnapshot, detail)
}
