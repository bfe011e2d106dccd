//! Engine configuration
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Upper bound accepted for the simulated fetch latency.
pub const MAX_FETCH_LATENCY_MS: u64 = 10_000;

/// How choice answers are compared against the option labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMatching {
    /// Byte-for-byte comparison after trimming
    #[default]
    Exact,
    /// Case-folded comparison; the canonical option label is recorded
    CaseInsensitive,
}

impl AnswerMatching {
    #[must_use]
    pub fn matches(self, option: &str, answer: &str) -> bool {
        match self {
            Self::Exact => option == answer,
            Self::CaseInsensitive => option.to_lowercase() == answer.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub answer_matching: AnswerMatching,
    #[serde(default = "EngineConfig::default_fetch_latency_ms")]
    pub fetch_latency_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            answer_matching: AnswerMatching::default(),
            fetch_latency_ms: Self::default_fetch_latency_ms(),
        }
    }
}

impl EngineConfig {
    const fn default_fetch_latency_ms() -> u64 {
        100
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the fetch latency exceeds [`MAX_FETCH_LATENCY_MS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_latency_ms > MAX_FETCH_LATENCY_MS {
            return Err(ConfigError::LatencyOutOfRange {
                value: self.fetch_latency_ms,
                max: MAX_FETCH_LATENCY_MS,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn with_answer_matching(mut self, matching: AnswerMatching) -> Self {
        self.answer_matching = matching;
        self
    }

    #[must_use]
    pub const fn with_fetch_latency_ms(mut self, latency_ms: u64) -> Self {
        self.fetch_latency_ms = latency_ms;
        self
    }

    #[must_use]
    pub const fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("fetch latency {value}ms exceeds maximum {max}ms")]
    LatencyOutOfRange { value: u64, max: u64 },
}
