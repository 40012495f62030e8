//! Persisted JSON form of a [`GameState`].
//!
//! The stored document carries the legacy `ready`/`started`/`finished` flags
//! next to the explicit `phase`. Decoding checks that the flags agree with
//! the phase and runs full validation; anything else is rejected as a
//! malformed snapshot instead of being trusted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ids::{GameId, ParticipantId};
use crate::domain::rules::{MAX_PLAYERS, PADDLE_HEIGHT, PADDLE_WIDTH};
use crate::domain::state::{Ball, BotBinding, GameState, Phase, Role, Vec2};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaddleSize {
    pub width: i32,
    pub height: i32,
}

/// Wire DTO for a stored snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotDto {
    pub game_id: GameId,
    pub owner: ParticipantId,
    pub players: Vec<ParticipantId>,
    pub max_players: usize,
    pub bots: BTreeMap<Role, BotBinding>,
    pub ball: Ball,
    pub paddles: BTreeMap<Role, Vec2>,
    pub paddle_size: PaddleSize,
    pub phase: Phase,
    pub ready: bool,
    pub started: bool,
    pub finished: bool,
    #[serde(default)]
    pub solo: bool,
    pub score: BTreeMap<Role, u32>,
    pub tick: u64,
    pub serves: u32,
    pub rng_seed: u64,
    pub version: u64,
}

impl From<&GameState> for SnapshotDto {
    fn from(state: &GameState) -> Self {
        Self {
            game_id: state.game_id.clone(),
            owner: state.owner.clone(),
            players: state.players.clone(),
            max_players: MAX_PLAYERS,
            bots: state.bots.clone(),
            ball: state.ball,
            paddles: state.paddles.clone(),
            paddle_size: PaddleSize {
                width: PADDLE_WIDTH,
                height: PADDLE_HEIGHT,
            },
            phase: state.phase,
            ready: state.is_ready(),
            started: state.is_started(),
            finished: state.is_finished(),
            solo: state.solo,
            score: state.score.clone(),
            tick: state.tick,
            serves: state.serves,
            rng_seed: state.rng_seed,
            version: state.version,
        }
    }
}

impl TryFrom<SnapshotDto> for GameState {
    type Error = DomainError;

    fn try_from(dto: SnapshotDto) -> Result<Self, Self::Error> {
        if dto.max_players != MAX_PLAYERS
            || dto.paddle_size.width != PADDLE_WIDTH
            || dto.paddle_size.height != PADDLE_HEIGHT
        {
            return Err(malformed("snapshot was written for different pong rules"));
        }

        let state = GameState {
            game_id: dto.game_id,
            owner: dto.owner,
            players: dto.players,
            bots: dto.bots,
            ball: dto.ball,
            paddles: dto.paddles,
            phase: dto.phase,
            solo: dto.solo,
            score: dto.score,
            tick: dto.tick,
            serves: dto.serves,
            rng_seed: dto.rng_seed,
            version: dto.version,
        };

        if dto.ready != state.is_ready()
            || dto.started != state.is_started()
            || dto.finished != state.is_finished()
        {
            return Err(malformed(format!(
                "flags ready={} started={} finished={} disagree with phase {:?}",
                dto.ready, dto.started, dto.finished, state.phase
            )));
        }

        state.validate()?;
        Ok(state)
    }
}

/// Serialize a state for storage.
pub fn encode(state: &GameState) -> Result<String, DomainError> {
    Ok(serde_json::to_string(&SnapshotDto::from(state))?)
}

/// Parse and validate a stored snapshot.
pub fn decode(raw: &str) -> Result<GameState, DomainError> {
    let dto: SnapshotDto = serde_json::from_str(raw)
        .map_err(|e| malformed(format!("snapshot is not a pong game state: {e}")))?;
    GameState::try_from(dto)
}

fn malformed(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::MalformedSnapshot, detail)
}
