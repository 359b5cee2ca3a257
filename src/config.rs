//! Session configuration from the environment

use crate::counters::{SessionCounters, INITIAL_FAILED_ATTEMPTS, INITIAL_PRIZE};
use std::time::Duration;
use thiserror::Error;

/// Default time the responder spends "composing" a reply
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} (expected a non-negative integer)")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub reply_delay: Duration,
    pub initial_prize: u64,
    pub initial_failed_attempts: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_delay: DEFAULT_REPLY_DELAY,
            initial_prize: INITIAL_PRIZE,
            initial_failed_attempts: INITIAL_FAILED_ATTEMPTS,
        }
    }
}

impl SessionConfig {
    /// Read `CONVINCE_REPLY_DELAY_MS`, `CONVINCE_INITIAL_PRIZE` and
    /// `CONVINCE_INITIAL_FAILED_ATTEMPTS`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let delay_ms = parse_var(&lookup, "CONVINCE_REPLY_DELAY_MS")?;
        Ok(Self {
            reply_delay: delay_ms.map_or(defaults.reply_delay, Duration::from_millis),
            initial_prize: parse_var(&lookup, "CONVINCE_INITIAL_PRIZE")?
                .unwrap_or(defaults.initial_prize),
            initial_failed_attempts: parse_var(&lookup, "CONVINCE_INITIAL_FAILED_ATTEMPTS")?
                .unwrap_or(defaults.initial_failed_attempts),
        })
    }

    pub fn initial_counters(&self) -> SessionCounters {
        SessionCounters::new(self.initial_prize, self.initial_failed_attempts)
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
