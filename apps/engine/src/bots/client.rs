//! Bot client trait and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;

use super::protocol::{BotDecision, BotView};
use crate::domain::state::{BotBinding, Move};
use crate::errors::domain::{DomainError, ValidationKind};

/// Errors that can occur while asking a bot for its move.
///
/// These never leave the engine: a failed query counts as `Move::None`.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("bot did not answer within {0:?}")]
    Timeout(Duration),
    #[error("bot unreachable: {0}")]
    Transport(String),
    #[error("bot answered with HTTP status {0}")]
    Status(u16),
    #[error("bot reply is not a decision: {0}")]
    Malformed(String),
    #[error("bot decision {0} is not one of -1, 0, 1")]
    OutOfRange(i64),
}

/// Source of one participant's move for one tick.
#[async_trait]
pub trait BotClient: Send + Sync {
    async fn request_move(&self, binding: &BotBinding, view: &BotView) -> Result<Move, BotError>;
}

/// Posts the view as JSON to the bot's callback URL.
#[derive(Debug, Clone)]
pub struct HttpBotClient {
    http: reqwest::Client,
}

impl HttpBotClient {
    /// `timeout` bounds connect and the whole request; callers still wrap
    /// each query in their own deadline.
    pub fn new(timeout: Duration) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl BotClient for HttpBotClient {
    async fn request_move(&self, binding: &BotBinding, view: &BotView) -> Result<Move, BotError> {
        let response = self
            .http
            .post(&binding.callback_url)
            .json(view)
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Status(status.as_u16()));
        }

        let decision: BotDecision = response
            .json()
            .await
            .map_err(|e| BotError::Malformed(e.to_string()))?;

        Move::from_code(decision.event).ok_or(BotError::OutOfRange(decision.event))
    }
}

/// Check a callback URL before it is bound to a role.
pub fn parse_callback_url(raw: &str) -> Result<String, DomainError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        DomainError::validation(
            ValidationKind::InvalidCallbackUrl,
            format!("'{raw}' is not a URL: {e}"),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(DomainError::validation(
            ValidationKind::InvalidCallbackUrl,
            format!("'{raw}' must be an http(s) URL with a host"),
        ));
    }
    Ok(url.to_string())
}
