#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod bots;
pub mod config;
pub mod domain;
pub mod errors;
pub mod repos;
pub mod services;
pub mod store;
pub mod utils;

// Re-exports for public API
pub use bots::{collect_moves, BotClient, BotError, BotView, HttpBotClient};
pub use config::{EngineConfig, StartPolicy};
pub use domain::{next_state, GameId, GameState, Move, Moves, ParticipantId, Phase, Role};
pub use errors::DomainError;
pub use repos::GameRepo;
pub use services::{JoinStatus, LifecycleService, LobbyView, Orchestrator, PassReport};
pub use store::{GameStore, MemoryStore, RedisStore, StoreError};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    engine_test_support::logging::init();
}
