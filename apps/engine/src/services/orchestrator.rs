//! Tick pass over every active game.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::bots::{collect_moves, BotClient};
use crate::config::EngineConfig;
use crate::domain::ids::GameId;
use crate::domain::physics::next_state;
use crate::domain::state::Phase;
use crate::errors::domain::DomainError;
use crate::repos::{GameRepo, Update};

/// What happened to one game during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Advanced one tick; `finished` if that tick ended the game
    Advanced { finished: bool },
    /// Already finished, removed from the active registry
    Retired,
    /// Not started yet
    Idle,
}

/// Totals for one pass. `finished` counts games removed from the registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub ticked: usize,
    pub finished: usize,
    pub idle: usize,
    pub failed: usize,
}

impl PassReport {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Advanced { finished } => {
                self.ticked += 1;
                if finished {
                    self.finished += 1;
                }
            }
            TickOutcome::Retired => self.finished += 1,
            TickOutcome::Idle => self.idle += 1,
        }
    }
}

pub struct Orchestrator {
    repo: GameRepo,
    bots: Arc<dyn BotClient>,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(repo: GameRepo, bots: Arc<dyn BotClient>, config: EngineConfig) -> Self {
        Self { repo, bots, config }
    }

    /// Tick every game in the active registry once.
    ///
    /// Games run concurrently up to `max_concurrent_games`. A failing game is
    /// logged and counted; it never stops the pass. Only a failure to read
    /// the registry itself is returned as an error.
    pub async fn run_pass(&self) -> Result<PassReport, DomainError> {
        let ids = self.repo.active_games().await?;
        let limit = self.config.max_concurrent_games.max(1);
        debug!(games = ids.len(), limit, "Starting tick pass");

        let results: Vec<(GameId, Result<TickOutcome, DomainError>)> = stream::iter(ids)
            .map(|id| async move {
                let result = self.tick_game(&id).await;
                (id, result)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut report = PassReport::default();
        for (id, result) in results {
            match result {
                Ok(outcome) => report.record(outcome),
                Err(err) if err.is_transient() => {
                    report.failed += 1;
                    warn!(game_id = %id, error = %err, "Game skipped this pass");
                }
                Err(err) => {
                    report.failed += 1;
                    error!(game_id = %id, error = %err, "Game tick failed");
                }
            }
        }

        info!(
            ticked = report.ticked,
            finished = report.finished,
            idle = report.idle,
            failed = report.failed,
            "Tick pass complete"
        );
        Ok(report)
    }

    /// Advance a single game by one tick.
    ///
    /// Bots are polled once; if the write loses a race the physics is
    /// recomputed from a fresh read with the same moves.
    pub async fn tick_game(&self, id: &GameId) -> Result<TickOutcome, DomainError> {
        let state = self.repo.require_game(id).await?;
        match state.phase {
            Phase::Lobby | Phase::Ready => return Ok(TickOutcome::Idle),
            Phase::Finished => return self.retire(id).await,
            Phase::Started => {}
        }

        let moves = collect_moves(self.bots.as_ref(), &state, self.config.bot_timeout).await;

        let (next, advanced) = self
            .repo
            .update_with(id, |current| {
                if current.phase != Phase::Started {
                    return Ok(Update::Keep(false));
                }
                Ok(Update::Write(next_state(current, &moves)?, true))
            })
            .await?;

        if !advanced {
            return match next.phase {
                Phase::Finished => self.retire(id).await,
                _ => Ok(TickOutcome::Idle),
            };
        }

        debug!(
            game_id = %id,
            tick = next.tick,
            ball = ?next.ball.pos,
            "Game advanced"
        );

        if next.is_finished() {
            self.repo.deactivate(id).await?;
            info!(
                game_id = %id,
                tick = next.tick,
                score = ?next.score,
                "Game finished"
            );
        }
        Ok(TickOutcome::Advanced {
            finished: next.is_finished(),
        })
    }

    async fn retire(&self, id: &GameId) -> Result<TickOutcome, DomainError> {
        self.repo.deactivate(id).await?;
        debug!(game_id = %id, "Finished game removed from the active registry");
        Ok(TickOutcome::Retired)
    }
}
