//! Environment-derived logging configuration
//!
//! | variable | effect |
//! |---|---|
//! | `LOG_LEVEL` | minimum level, one of VERBOSE, DEBUG, INFO, WARN, ERROR (default DEBUG) |
//! | `DISABLE_STRUCTURED_LOGS` | use the pretty console sink instead of JSON lines |
//! | `ENABLE_CONSOLE_LOGGER` | console output (default on) |
//! | `ENABLE_FILE_LOGGER` | append JSON lines to the log file |
//! | `APP_ENV` | `production`, `development` or `test` |
//! | `ENABLE_TRACING` | load the tracing integration |

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::serializer::DEFAULT_MAX_DEPTH;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_DISABLE_STRUCTURED_LOGS: &str = "DISABLE_STRUCTURED_LOGS";
pub const ENV_ENABLE_FILE_LOGGER: &str = "ENABLE_FILE_LOGGER";
pub const ENV_ENABLE_CONSOLE_LOGGER: &str = "ENABLE_CONSOLE_LOGGER";
pub const ENV_APP_ENV: &str = "APP_ENV";
pub const ENV_ENABLE_TRACING: &str = "ENABLE_TRACING";

/// Fixed name of the file sink's output
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Runtime environment; gates stack exposure and tracing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
}

impl Environment {
    /// Parse an `APP_ENV` value. Anything unrecognized is development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Environment::Test)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub min_level: LogLevel,
    pub console_enabled: bool,
    /// JSON lines on the console; `false` selects the pretty sink
    pub structured: bool,
    pub file_enabled: bool,
    pub file_path: PathBuf,
    pub environment: Environment,
    pub tracing_enabled: bool,
    /// Depth budget applied to `extra` payloads by structured sinks
    pub max_depth: usize,
    /// Timestamp rendering of the pretty console sink
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            console_enabled: true,
            structured: true,
            file_enabled: false,
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
            environment: Environment::Development,
            tracing_enabled: false,
            max_depth: DEFAULT_MAX_DEPTH,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    ///
    /// An unknown `LOG_LEVEL` is an error; it is never mapped to some other
    /// level.
    ///
    /// # Example
    ///
    /// ```
    /// use safe_observability::{LogLevel, LoggingConfig};
    ///
    /// let config = LoggingConfig::from_lookup(|key| match key {
    ///     "LOG_LEVEL" => Some("warn".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.min_level, LogLevel::Warn);
    /// assert!(config.console_enabled);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            let parsed: LogLevel = level
                .parse()
                .map_err(|_| LoggerError::config(ENV_LOG_LEVEL, format!("unknown level '{}'", level)))?;
            if parsed == LogLevel::Audit {
                return Err(LoggerError::config(
                    ENV_LOG_LEVEL,
                    "AUDIT is not a valid minimum level",
                ));
            }
            config.min_level = parsed;
        }
        if let Some(value) = lookup(ENV_DISABLE_STRUCTURED_LOGS) {
            config.structured = !parse_flag(&value);
        }
        if let Some(value) = lookup(ENV_ENABLE_CONSOLE_LOGGER) {
            config.console_enabled = parse_flag(&value);
        }
        if let Some(value) = lookup(ENV_ENABLE_FILE_LOGGER) {
            config.file_enabled = parse_flag(&value);
        }
        if let Some(value) = lookup(ENV_APP_ENV) {
            config.environment = Environment::parse(&value);
        }
        if let Some(value) = lookup(ENV_ENABLE_TRACING) {
            config.tracing_enabled = parse_flag(&value);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Both configurations produce identical sinks
    pub fn same_sinks(&self, other: &LoggingConfig) -> bool {
        self.structured == other.structured
            && self.file_path == other.file_path
            && self.environment == other.environment
            && self.max_depth == other.max_depth
            && self.timestamp_format == other.timestamp_format
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_enabled = true;
        self.file_path = path.into();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
