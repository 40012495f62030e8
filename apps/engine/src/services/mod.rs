//! Services composing the repository, physics, and bot clients.

pub mod lifecycle;
pub mod orchestrator;

pub use lifecycle::{JoinStatus, LifecycleService, LobbyView};
pub use orchestrator::{Orchestrator, PassReport, TickOutcome};
