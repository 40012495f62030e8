//! Remote bot participants and move collection.

pub mod client;
pub mod protocol;

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

pub use client::{parse_callback_url, BotClient, BotError, HttpBotClient};
pub use protocol::{BotDecision, BotView};

use crate::domain::state::{GameState, Move, Moves};

/// Ask every bound bot for its move, concurrently.
///
/// Each query gets its own `timeout`. Any failure is logged and counts as
/// `Move::None`, so one slow or broken bot never stalls the tick.
pub async fn collect_moves(client: &dyn BotClient, state: &GameState, timeout: Duration) -> Moves {
    let queries = state.bots.iter().map(|(&role, binding)| {
        let view = BotView::for_role(state, role);
        async move {
            let outcome = match tokio::time::timeout(timeout, client.request_move(binding, &view)).await {
                Ok(result) => result,
                Err(_) => Err(BotError::Timeout(timeout)),
            };
            let mv = match outcome {
                Ok(mv) => {
                    debug!(game_id = %state.game_id, %role, ?mv, "Bot move received");
                    mv
                }
                Err(err) => {
                    warn!(
                        game_id = %state.game_id,
                        %role,
                        participant = %binding.participant_id,
                        error = %err,
                        "Bot query failed, treating as no move"
                    );
                    Move::None
                }
            };
            (role, mv)
        }
    });

    join_all(queries).await.into_iter().collect()
}
