//! Application settings loaded from the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Telegram Bot API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot token (obtain from `@BotFather`).
    pub bot_token: String,
}

impl BotConfig {
    /// Creates configuration from environment variables.
    ///
    /// Expects `BOT_TOKEN` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token =
            std::env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        if bot_token.trim().is_empty() {
            return Err(ConfigError::EmptyEnvVar("BOT_TOKEN"));
        }

        Ok(Self { bot_token })
    }
}

/// Relay behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Scheduler sweep interval in milliseconds.
    #[serde(default = "default_scheduler_tick_ms")]
    pub scheduler_tick_ms: u64,
}

fn default_scheduler_tick_ms() -> u64 {
    500
}

/// Parses a sweep interval from its environment value.
///
/// The scheduler needs a non-zero period, so zero is rejected along with
/// anything unparseable.
fn parse_tick_ms(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.parse().ok())
        .filter(|&ms| ms != 0)
        .unwrap_or_else(default_scheduler_tick_ms)
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            scheduler_tick_ms: default_scheduler_tick_ms(),
        }
    }
}

impl RelaySettings {
    /// Creates settings from environment variables with defaults.
    ///
    /// An unparseable or zero `SCHEDULER_TICK_MS` falls back to the
    /// default.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            scheduler_tick_ms: parse_tick_ms(std::env::var("SCHEDULER_TICK_MS").ok()),
        }
    }

    /// Scheduler sweep interval as a duration.
    #[must_use]
    pub const fn scheduler_tick(&self) -> Duration {
        Duration::from_millis(self.scheduler_tick_ms)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Environment variable {0} must not be empty")]
    EmptyEnvVar(&'static str),
}
