//! Configuration module for the relay bot.
//!
//! Handles loading of bot credentials and relay behaviour settings
//! from environment variables.

mod settings;

pub use settings::{BotConfig, ConfigError, RelaySettings};
