//! Domain layer: pure Pong types, rules, and physics.

pub mod ids;
pub mod physics;
pub mod rules;
pub mod seed_derivation;
pub mod snapshot;
pub mod state;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports for ergonomics
pub use ids::{GameId, ParticipantId};
pub use physics::{next_state, serve};
pub use state::{Ball, BotBinding, GameState, Move, Moves, Phase, Role, Vec2};
