#![allow(dead_code)]

pub mod bots;
pub mod states;

use std::sync::Arc;

use pong_engine::{
    BotClient, EngineConfig, GameRepo, LifecycleService, MemoryStore, Orchestrator,
    ParticipantId,
};

// Logging is auto-installed for every test binary that declares `mod support`
#[ctor::ctor]
fn init_logging() {
    engine_test_support::logging::init();
}

pub fn participant(name: &str) -> ParticipantId {
    ParticipantId::parse(name).expect("valid participant name")
}

/// Lifecycle service and orchestrator sharing one in-memory store.
pub struct Engine {
    pub store: Arc<MemoryStore>,
    pub lifecycle: LifecycleService,
    pub orchestrator: Orchestrator,
}

pub fn engine(bots: Arc<dyn BotClient>, config: EngineConfig) -> Engine {
    let store = Arc::new(MemoryStore::new());
    engine_on(store, bots, config)
}

pub fn engine_on(store: Arc<MemoryStore>, bots: Arc<dyn BotClient>, config: EngineConfig) -> Engine {
    let repo = GameRepo::new(store.clone(), config.cas_max_attempts);
    Engine {
        store,
        lifecycle: LifecycleService::new(repo.clone(), config.clone()),
        orchestrator: Orchestrator::new(repo, bots, config),
    }
}
