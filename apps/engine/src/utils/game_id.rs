//! Game id and seed generation.
//!
//! Game ids are 8-character prefixes of base64-encoded OS randomness.
//! Standard base64 can emit `/`, which is unsafe in keys and URLs, so
//! candidates containing an unsafe character are discarded and redrawn.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::domain::ids::{is_safe, GameId};
use crate::errors::domain::{DomainError, InfraErrorKind};

pub const GAME_ID_LEN: usize = 8;

const RANDOM_BYTES: usize = 32;
const MAX_DRAWS: usize = 64;

/// Generate a fresh game id from the OS's cryptographically secure RNG.
pub fn generate_game_id() -> Result<GameId, DomainError> {
    first_safe((0..MAX_DRAWS).map(|_| random_candidate()))
}

/// Draw the per-game base seed used for serves.
pub fn generate_game_seed() -> Result<u64, DomainError> {
    let mut rng = OsRng;
    rng.try_next_u64().map_err(random_error)
}

fn random_candidate() -> Result<String, DomainError> {
    let mut rng = OsRng;
    let mut bytes = [0u8; RANDOM_BYTES];
    rng.try_fill_bytes(&mut bytes).map_err(random_error)?;

    let mut encoded = STANDARD.encode(bytes);
    encoded.truncate(GAME_ID_LEN);
    Ok(encoded)
}

fn first_safe(
    candidates: impl IntoIterator<Item = Result<String, DomainError>>,
) -> Result<GameId, DomainError> {
    for candidate in candidates {
        let candidate = candidate?;
        if is_safe(&candidate) {
            return GameId::parse(candidate);
        }
    }
    Err(DomainError::infra(
        InfraErrorKind::Random,
        format!("no safe game id after {MAX_DRAWS} draws"),
    ))
}

fn random_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::infra(InfraErrorKind::Random, format!("OS RNG failed: {e}"))
}
