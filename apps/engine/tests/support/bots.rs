//! In-process bot clients for driving the orchestrator in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use pong_engine::domain::BotBinding;
use pong_engine::{BotClient, BotError, BotView, Move};

/// Answers with a fixed move per callback URL; unknown URLs get `Move::None`.
#[derive(Default)]
pub struct ScriptedBots {
    moves: Mutex<HashMap<String, Move>>,
    calls: AtomicUsize,
    yield_first: bool,
}

impl ScriptedBots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield to the scheduler before answering, so concurrent ticks interleave.
    pub fn yielding() -> Self {
        Self {
            yield_first: true,
            ..Self::default()
        }
    }

    pub fn answer(&self, callback_url: &str, mv: Move) {
        self.moves.lock().insert(callback_url.to_string(), mv);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BotClient for ScriptedBots {
    async fn request_move(&self, binding: &BotBinding, _view: &BotView) -> Result<Move, BotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_first {
            tokio::task::yield_now().await;
        }
        let scripted = self.moves.lock().get(&binding.callback_url).copied();
        Ok(scripted.unwrap_or(Move::None))
    }
}
