//! Configuration error types.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "The configuration is invalid. Check config.toml.",
            ConfigError::ParseError(_) => "Failed to read config.toml. Check its syntax.",
            ConfigError::MissingSetting(_) => {
                "A required setting is missing. Set it in config.toml or the environment."
            }
            ConfigError::UnknownTimezone(_) => {
                "The configured timezone is not a known IANA name (e.g. Europe/Moscow)."
            }
        }
    }
}
