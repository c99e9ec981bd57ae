//! Runtime settings sourced from the environment.
//!
//! # Design
//! - Every setting has a default so an empty environment is valid.
//! - Lookups go through an injectable function so tests never mutate the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Default pause inserted after each processed work item.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);
/// Default log level when neither `RUST_LOG` nor `FERRY_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "ferry.log";

const ENV_THROTTLE_MS: &str = "FERRY_THROTTLE_MS";
const ENV_LOG_LEVEL: &str = "FERRY_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "FERRY_LOG_FORMAT";
const ENV_LOG_FILE: &str = "FERRY_LOG_FILE";
const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// Settings that tune a run without changing what it transfers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Pause inserted after each processed work item.
    pub throttle: Duration,
    /// Log level or `EnvFilter` directive.
    pub log_level: String,
    /// Log output format (`pretty` or `json`); `None` lets the build decide.
    pub log_format: Option<String>,
    /// File that receives the run log.
    pub log_file: PathBuf,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl RuntimeSettings {
    /// Load settings from the `FERRY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] when a variable is set to an unparsable value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] when a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut settings = Self::default();

        if let Some(value) = non_blank(lookup(ENV_THROTTLE_MS)) {
            settings.throttle = parse_throttle_ms(ENV_THROTTLE_MS, &value)?;
        }
        if let Some(value) = non_blank(lookup(ENV_LOG_LEVEL)) {
            settings.log_level = value;
        }
        if let Some(value) = non_blank(lookup(ENV_LOG_FORMAT)) {
            settings.log_format = Some(parse_log_format(ENV_LOG_FORMAT, &value)?);
        }
        if let Some(value) = non_blank(lookup(ENV_LOG_FILE)) {
            settings.log_file = PathBuf::from(value);
        }

        Ok(settings)
    }

    /// Replace the log format, validating the value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] for anything other than `pretty` or `json`.
    pub fn set_log_format(&mut self, value: &str) -> ConfigResult<()> {
        self.log_format = Some(parse_log_format("log_format", value)?);
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_throttle_ms(name: &'static str, value: &str) -> ConfigResult<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidSetting {
            name,
            reason: "not_milliseconds",
            value: Some(value.to_string()),
        })
}

fn parse_log_format(name: &'static str, value: &str) -> ConfigResult<String> {
    let normalised = value.trim().to_ascii_lowercase();
    if LOG_FORMATS.contains(&normalised.as_str()) {
        Ok(normalised)
    } else {
        Err(ConfigError::InvalidSetting {
            name,
            reason: "unknown_format",
            value: Some(value.to_string()),
        })
    }
}
