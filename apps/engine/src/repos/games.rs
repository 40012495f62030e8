//! Game repository: typed, validated access to stored snapshots.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ids::GameId;
use crate::domain::snapshot;
use crate::domain::state::GameState;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::store::GameStore;

/// What an update closure decided after looking at the current state.
#[derive(Debug)]
pub enum Update<T> {
    /// Persist this state (its version is bumped on write)
    Write(GameState, T),
    /// Leave the stored state as it is
    Keep(T),
}

#[derive(Clone)]
pub struct GameRepo {
    store: Arc<dyn GameStore>,
    max_attempts: u32,
}

impl GameRepo {
    pub fn new(store: Arc<dyn GameStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn find_game(&self, id: &GameId) -> Result<Option<GameState>, DomainError> {
        let Some(raw) = self.store.get(id).await? else {
            return Ok(None);
        };
        let state = snapshot::decode(&raw)?;
        if &state.game_id != id {
            return Err(DomainError::validation(
                ValidationKind::MalformedSnapshot,
                format!("snapshot stored under {id} belongs to {}", state.game_id),
            ));
        }
        Ok(Some(state))
    }

    /// Find game by id or return error if not found.
    pub async fn require_game(&self, id: &GameId) -> Result<GameState, DomainError> {
        self.find_game(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Game, format!("game {id}")))
    }

    /// Persist a brand-new game. Returns false if its id is already taken.
    pub async fn create_game(&self, state: &GameState) -> Result<bool, DomainError> {
        state.validate()?;
        let raw = snapshot::encode(state)?;
        Ok(self.store.insert(&state.game_id, state.version, &raw).await?)
    }

    /// Read-modify-write with optimistic locking.
    ///
    /// `apply` sees a freshly loaded state on every attempt. A lost race is
    /// retried up to the configured attempt count and then reported as
    /// `Conflict(OptimisticLock)`; errors from `apply` are returned at once.
    pub async fn update_with<T, F>(&self, id: &GameId, mut apply: F) -> Result<(GameState, T), DomainError>
    where
        F: FnMut(&GameState) -> Result<Update<T>, DomainError>,
    {
        for attempt in 1..=self.max_attempts {
            let current = self.require_game(id).await?;
            let (mut next, out) = match apply(&current)? {
                Update::Keep(out) => return Ok((current, out)),
                Update::Write(next, out) => (next, out),
            };

            next.version = current.version + 1;
            next.validate()?;
            let raw = snapshot::encode(&next)?;

            if self
                .store
                .compare_and_swap(id, current.version, next.version, &raw)
                .await?
            {
                debug!(game_id = %id, version = next.version, attempt, "Game state written");
                return Ok((next, out));
            }

            warn!(
                game_id = %id,
                expected_version = current.version,
                attempt,
                "Concurrent write detected, retrying with a fresh read"
            );
        }

        Err(DomainError::conflict(
            ConflictKind::OptimisticLock,
            format!("game {id} kept changing across {} attempts", self.max_attempts),
        ))
    }

    pub async fn active_games(&self) -> Result<Vec<GameId>, DomainError> {
        Ok(self.store.active_games().await?)
    }

    pub async fn deactivate(&self, id: &GameId) -> Result<(), DomainError> {
        Ok(self.store.deactivate(id).await?)
    }
}
