use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::ids::is_safe;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },
    #[error("{var} is invalid: {detail}")]
    Invalid { var: &'static str, detail: String },
}

/// Whether a game may start before enough participants joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPolicy {
    /// Starting a lobby game is rejected
    #[default]
    RequireReady,
    /// Lobby games may start with a single participant (solo practice)
    AllowUnready,
}

impl FromStr for StartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "require_ready" => Ok(StartPolicy::RequireReady),
            "allow_unready" => Ok(StartPolicy::AllowUnready),
            other => Err(format!(
                "'{other}' is not a start policy (expected require_ready or allow_unready)"
            )),
        }
    }
}

/// Engine settings shared by the lifecycle service and the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// First segment of every store key
    pub namespace: String,
    /// Deadline for one bot decision
    pub bot_timeout: Duration,
    /// Games processed in parallel within one pass
    pub max_concurrent_games: usize,
    /// Reads per write before a lost race is reported
    pub cas_max_attempts: u32,
    pub start_policy: StartPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: "game".to_string(),
            bot_timeout: Duration::from_millis(500),
            max_concurrent_games: 16,
            cas_max_attempts: 3,
            start_policy: StartPolicy::RequireReady,
        }
    }
}

impl EngineConfig {
    /// Build from `PONG_*` environment variables, defaulting anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            namespace: opt_var("PONG_NAMESPACE").unwrap_or(defaults.namespace),
            bot_timeout: parsed_var::<u64>("PONG_BOT_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.bot_timeout),
            max_concurrent_games: parsed_var("PONG_MAX_CONCURRENT_GAMES")?
                .unwrap_or(defaults.max_concurrent_games),
            cas_max_attempts: parsed_var("PONG_CAS_MAX_ATTEMPTS")?
                .unwrap_or(defaults.cas_max_attempts),
            start_policy: parsed_var("PONG_START_POLICY")?.unwrap_or(defaults.start_policy),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_bot_timeout(mut self, timeout: Duration) -> Self {
        self.bot_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_games(mut self, n: usize) -> Self {
        self.max_concurrent_games = n;
        self
    }

    pub fn with_cas_max_attempts(mut self, n: u32) -> Self {
        self.cas_max_attempts = n;
        self
    }

    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() || !is_safe(&self.namespace) {
            return Err(ConfigError::Invalid {
                var: "PONG_NAMESPACE",
                detail: format!("'{}' is empty or contains key delimiters", self.namespace),
            });
        }
        if self.bot_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "PONG_BOT_TIMEOUT_MS",
                detail: "must be greater than zero".into(),
            });
        }
        if self.max_concurrent_games == 0 {
            return Err(ConfigError::Invalid {
                var: "PONG_MAX_CONCURRENT_GAMES",
                detail: "must be greater than zero".into(),
            });
        }
        if self.cas_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "PONG_CAS_MAX_ATTEMPTS",
                detail: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Redis connection URL for the store.
pub fn redis_url() -> Result<String, ConfigError> {
    must_var("PONG_REDIS_URL")
}

/// Get required environment variable or return error
fn must_var(var: &'static str) -> Result<String, ConfigError> {
    opt_var(var).ok_or(ConfigError::Missing { var })
}

fn opt_var(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    opt_var(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                detail: e.to_string(),
            })
        })
        .transpose()
}
