use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Time limit used when none is chosen.
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 30;

/// Time limits offered on the start screen.
pub const TIME_LIMIT_PRESETS_MINUTES: [u32; 3] = [30, 60, 90];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("time limit must be > 0 seconds")]
    ZeroTimeLimit,

    #[error("time limit of {minutes} minutes is too large")]
    TimeLimitTooLarge { minutes: u32 },

    #[error("question bank is empty")]
    EmptyBank,
}

/// Settings chosen before an attempt starts. Fixed for the whole attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    time_limit_secs: u32,
}

impl QuizConfig {
    /// Creates a config with a time limit in seconds.
    ///
    /// The value is checked when the session starts, see [`QuizConfig::validate`].
    #[must_use]
    pub fn new(time_limit_secs: u32) -> Self {
        Self { time_limit_secs }
    }

    /// Creates a config from a time limit in minutes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroTimeLimit` for zero minutes.
    /// Returns `ConfigError::TimeLimitTooLarge` if the seconds overflow `u32`.
    pub fn from_minutes(minutes: u32) -> Result<Self, ConfigError> {
        let secs = minutes
            .checked_mul(60)
            .ok_or(ConfigError::TimeLimitTooLarge { minutes })?;
        let config = Self::new(secs);
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    /// # Errors
    ///
    /// Returns `ConfigError::ZeroTimeLimit` if the limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit_secs == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_LIMIT_MINUTES * 60)
    }
}
