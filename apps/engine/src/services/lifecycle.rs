//! Game lifecycle: create, join, start, and the read-side views.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::bots::parse_callback_url;
use crate::config::{EngineConfig, StartPolicy};
use crate::domain::ids::{GameId, ParticipantId};
use crate::domain::physics::serve;
use crate::domain::rules::{MAX_PLAYERS, MIN_PLAYERS_TO_READY, PADDLE_MAX_Y};
use crate::domain::state::{BotBinding, GameState, Phase, Role, Vec2};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::{GameRepo, Update};
use crate::utils::game_id::{generate_game_id, generate_game_seed};

/// Fresh ids drawn before giving up on a collision streak.
const CREATE_ATTEMPTS: u32 = 8;

/// Whether a participant could join a game right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStatus {
    AlreadyMember,
    Open,
    Full,
    /// Started or finished with a free seat; no new members
    Closed,
}

/// What a member sees while waiting for the game to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyView {
    pub players: Vec<ParticipantId>,
    pub player_count: usize,
    pub ready: bool,
}

pub struct LifecycleService {
    repo: GameRepo,
    config: EngineConfig,
}

impl LifecycleService {
    pub fn new(repo: GameRepo, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    /// Create a game owned by `owner`, who takes `role` with a bot at
    /// `callback_url`. The game is registered as active.
    pub async fn create_game(
        &self,
        owner: &ParticipantId,
        role: Role,
        callback_url: &str,
    ) -> Result<GameState, DomainError> {
        let callback_url = parse_callback_url(callback_url)?;
        let rng_seed = generate_game_seed()?;

        for attempt in 1..=CREATE_ATTEMPTS {
            let state = initial_state(
                generate_game_id()?,
                owner.clone(),
                role,
                callback_url.clone(),
                rng_seed,
            );
            if self.repo.create_game(&state).await? {
                info!(game_id = %state.game_id, owner = %owner, %role, "Game created");
                return Ok(state);
            }
            warn!(game_id = %state.game_id, attempt, "Generated game id already taken, regenerating");
        }

        Err(DomainError::conflict(
            ConflictKind::DuplicateGameId,
            format!("no free game id after {CREATE_ATTEMPTS} attempts"),
        ))
    }

    /// Add `participant` to the game (if not yet a member) and bind `role`
    /// to their bot. The game becomes ready once it has two players.
    pub async fn join_game(
        &self,
        game_id: &GameId,
        participant: &ParticipantId,
        role: Role,
        callback_url: &str,
    ) -> Result<GameState, DomainError> {
        let callback_url = parse_callback_url(callback_url)?;

        let (state, written) = self
            .repo
            .update_with(game_id, |current| {
                let member = current.is_member(participant);
                if !member && current.players.len() >= MAX_PLAYERS {
                    return Err(DomainError::capacity(format!(
                        "game {game_id} already has {MAX_PLAYERS} players"
                    )));
                }

                if current.is_started() {
                    return Err(DomainError::conflict(
                        ConflictKind::PhaseMismatch,
                        format!("game {game_id} has already started"),
                    ));
                }

                if let Some(bound) = current.bots.get(&role) {
                    if &bound.participant_id != participant {
                        return Err(DomainError::conflict(
                            ConflictKind::RoleTaken,
                            format!("{role} is taken by {}", bound.participant_id),
                        ));
                    }
                }
                // One role per participant
                if let Some(held) = current
                    .bots
                    .iter()
                    .find(|(r, b)| **r != role && &b.participant_id == participant)
                    .map(|(r, _)| *r)
                {
                    return Err(DomainError::conflict(
                        ConflictKind::RoleTaken,
                        format!("{participant} already plays {held}"),
                    ));
                }

                let mut next = current.clone();
                if !member {
                    next.players.push(participant.clone());
                }
                next.bots.insert(
                    role,
                    BotBinding {
                        participant_id: participant.clone(),
                        callback_url: callback_url.clone(),
                    },
                );
                if next.is_ready() {
                    next.phase = Phase::Ready;
                }

                if &next == current {
                    Ok(Update::Keep(false))
                } else {
                    Ok(Update::Write(next, true))
                }
            })
            .await?;

        if written {
            info!(
                game_id = %game_id,
                participant = %participant,
                %role,
                players = state.players.len(),
                phase = ?state.phase,
                "Participant joined"
            );
        } else {
            debug!(game_id = %game_id, participant = %participant, "Join changed nothing");
        }
        Ok(state)
    }

    /// Move the game to `Started`. Calling it on a game that already started
    /// (or finished) returns the stored state without writing.
    pub async fn start_game(&self, game_id: &GameId) -> Result<GameState, DomainError> {
        let policy = self.config.start_policy;

        let (state, written) = self
            .repo
            .update_with(game_id, |current| {
                let mut next = current.clone();
                match current.phase {
                    Phase::Started | Phase::Finished => return Ok(Update::Keep(false)),
                    Phase::Ready => {}
                    Phase::Lobby => match policy {
                        StartPolicy::RequireReady => {
                            return Err(DomainError::conflict(
                                ConflictKind::NotReady,
                                format!(
                                    "game {game_id} has {} player(s), needs {MIN_PLAYERS_TO_READY}",
                                    current.players.len()
                                ),
                            ));
                        }
                        StartPolicy::AllowUnready => next.solo = true,
                    },
                }
                next.phase = Phase::Started;
                Ok(Update::Write(next, true))
            })
            .await?;

        if written {
            info!(game_id = %game_id, solo = state.solo, "Game started");
        } else {
            debug!(game_id = %game_id, phase = ?state.phase, "Start ignored, game already running");
        }
        Ok(state)
    }

    pub async fn load_game(&self, game_id: &GameId) -> Result<GameState, DomainError> {
        self.repo.require_game(game_id).await
    }

    /// Ids of every game still in the active registry.
    pub async fn list_games(&self) -> Result<Vec<GameId>, DomainError> {
        self.repo.active_games().await
    }

    pub async fn join_status(
        &self,
        game_id: &GameId,
        participant: &ParticipantId,
    ) -> Result<JoinStatus, DomainError> {
        let state = self.repo.require_game(game_id).await?;
        Ok(if state.is_member(participant) {
            JoinStatus::AlreadyMember
        } else if state.players.len() >= MAX_PLAYERS {
            JoinStatus::Full
        } else if state.is_started() {
            JoinStatus::Closed
        } else {
            JoinStatus::Open
        })
    }

    /// Lobby view for a member of the game.
    pub async fn lobby(
        &self,
        game_id: &GameId,
        participant: &ParticipantId,
    ) -> Result<LobbyView, DomainError> {
        let state = self.repo.require_game(game_id).await?;
        if !state.is_member(participant) {
            return Err(DomainError::validation(
                ValidationKind::NotAMember,
                format!("{participant} is not in game {game_id}"),
            ));
        }
        Ok(LobbyView {
            player_count: state.players.len(),
            ready: state.is_ready(),
            players: state.players,
        })
    }
}

fn initial_state(
    game_id: GameId,
    owner: ParticipantId,
    role: Role,
    callback_url: String,
    rng_seed: u64,
) -> GameState {
    let paddles = Role::ALL
        .into_iter()
        .map(|r| (r, Vec2::new(r.paddle_x(), PADDLE_MAX_Y / 2)))
        .collect();
    let score = Role::ALL.into_iter().map(|r| (r, 0)).collect();

    let mut bots = BTreeMap::new();
    bots.insert(
        role,
        BotBinding {
            participant_id: owner.clone(),
            callback_url,
        },
    );

    GameState {
        game_id,
        players: vec![owner.clone()],
        owner,
        bots,
        ball: serve(rng_seed, 0, Role::Right),
        paddles,
        phase: Phase::Lobby,
        solo: false,
        score,
        tick: 0,
        serves: 0,
        rng_seed,
        version: 1,
    }
}
