//! Snapshot persistence seam.
//!
//! Stores deal in raw snapshot strings plus the optimistic-lock version;
//! encoding, validation, and retries live in [`crate::repos::games`].

mod memory;
mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;
use crate::domain::ids::GameId;
use crate::domain::rules::GAME_TYPE;
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        DomainError::infra(InfraErrorKind::StoreUnavailable, e.to_string())
    }
}

/// Key-value persistence for game snapshots plus the registry of active ids.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Store a new snapshot and register it as active.
    /// Returns false without writing if the id is already taken.
    async fn insert(&self, id: &GameId, version: u64, snapshot: &str) -> Result<bool, StoreError>;

    /// Raw snapshot for `id`, if any.
    async fn get(&self, id: &GameId) -> Result<Option<String>, StoreError>;

    /// Replace the snapshot only if the stored version equals `expected`.
    /// Returns false on a version mismatch or a missing game.
    async fn compare_and_swap(
        &self,
        id: &GameId,
        expected: u64,
        version: u64,
        snapshot: &str,
    ) -> Result<bool, StoreError>;

    /// Ids of games that still need ticking.
    async fn active_games(&self) -> Result<Vec<GameId>, StoreError>;

    /// Remove `id` from the active registry. The snapshot stays readable.
    async fn deactivate(&self, id: &GameId) -> Result<(), StoreError>;
}

/// Key layout `<namespace>:<gameType>:<gameId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    namespace: String,
}

impl Keyspace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn game_key(&self, id: &GameId) -> String {
        format!("{}:{GAME_TYPE}:{id}", self.namespace)
    }

    /// `#` never appears in a game id, so the registry cannot collide with a game key.
    pub fn active_key(&self) -> String {
        format!("{}:{GAME_TYPE}:#active", self.namespace)
    }
}
