//! Identifier newtypes for games and participants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Characters that must never appear in a game id: they are either key
/// delimiters in the store or structural in URLs and markup.
pub const UNSAFE_ID_CHARS: &[char] = &[
    ';', '/', '?', ':', '@', '=', '&', '"', '<', '>', '#', '%', '{', '}', '|', '\\', '^', '~',
    '[', ']', '`',
];

const MAX_ID_LEN: usize = 64;

/// Returns true if `candidate` contains none of [`UNSAFE_ID_CHARS`].
pub fn is_safe(candidate: &str) -> bool {
    !candidate.chars().any(|c| UNSAFE_ID_CHARS.contains(&c))
}

/// Opaque game identifier restricted to a safe character set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameId(String);

impl GameId {
    /// Validate an externally supplied id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > MAX_ID_LEN {
            return Err(DomainError::validation(
                ValidationKind::UnsafeGameId,
                format!("game id must be 1..={MAX_ID_LEN} characters"),
            ));
        }
        if !is_safe(&raw) || raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::validation(
                ValidationKind::UnsafeGameId,
                format!("game id '{raw}' contains unsafe characters"),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GameId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> Self {
        id.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Already-authenticated participant identifier handed in by the web layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.trim().is_empty() || raw.len() > MAX_ID_LEN || raw.chars().any(char::is_control) {
            return Err(DomainError::validation(
                ValidationKind::InvalidParticipant,
                format!("participant id must be 1..={MAX_ID_LEN} printable characters"),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
