//! Registry of named loggers
//!
//! The registry is an explicit object created once at startup and passed to
//! whoever needs loggers. Tests build their own instance.

use super::{
    config::LoggingConfig,
    error::Result,
    logger::{Logger, SinkSet},
    log_level::LogLevel,
};
use crate::sinks::ConsoleTarget;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the logger that always exists
pub const DEFAULT_LOGGER_NAME: &str = "Default";

/// Produces the current configuration each time a logger is created
pub type ConfigSource = Arc<dyn Fn() -> Result<LoggingConfig> + Send + Sync>;

pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    base_config: LoggingConfig,
    source: Option<ConfigSource>,
    sinks: SinkSet,
    target: ConsoleTarget,
    use_colors: bool,
}

impl LoggerRegistry {
    /// Registry whose loggers all start from `config`
    pub fn new(config: LoggingConfig) -> Self {
        Self::build(config, None, ConsoleTarget::Stdio, true)
    }

    /// Registry that re-reads the process environment for each new logger.
    ///
    /// The environment is validated once here; an invalid configuration is
    /// an error at startup.
    pub fn from_env() -> Result<Self> {
        let config = LoggingConfig::from_env()?;
        let source: ConfigSource = Arc::new(LoggingConfig::from_env);
        Ok(Self::with_source(config, source))
    }

    /// Registry that asks `source` for the configuration of each new logger,
    /// falling back to `config` when the source fails.
    pub fn with_source(config: LoggingConfig, source: ConfigSource) -> Self {
        Self::build(config, Some(source), ConsoleTarget::Stdio, true)
    }

    /// Registry whose console output goes to `target` instead of stdio
    pub fn with_console_target(config: LoggingConfig, target: ConsoleTarget) -> Self {
        let use_colors = matches!(target, ConsoleTarget::Stdio);
        Self::build(config, None, target, use_colors)
    }

    fn build(
        config: LoggingConfig,
        source: Option<ConfigSource>,
        target: ConsoleTarget,
        use_colors: bool,
    ) -> Self {
        let sinks = SinkSet::build(&config, target.clone(), use_colors);
        let default = Arc::new(Logger::new(DEFAULT_LOGGER_NAME, &config, sinks.clone()));

        let mut loggers = HashMap::new();
        loggers.insert(DEFAULT_LOGGER_NAME.to_string(), default);

        Self {
            loggers: RwLock::new(loggers),
            base_config: config,
            source,
            sinks,
            target,
            use_colors,
        }
    }

    /// Create a fresh logger named `name`, replacing any existing one.
    ///
    /// The configuration is read again for every call, and handles returned
    /// by earlier calls keep their own independent state. Loggers share the
    /// registry's sinks unless the re-read configuration changes how sinks
    /// are built (file path, depth budget, environment, console mode or
    /// timestamp format); such a logger gets sinks of its own.
    pub fn for_name(&self, name: &str) -> Arc<Logger> {
        let config = self.current_config();
        let sinks = if config.same_sinks(&self.base_config) {
            self.sinks.clone()
        } else {
            SinkSet::build(&config, self.target.clone(), self.use_colors)
        };
        let logger = Arc::new(Logger::new(name, &config, sinks));
        self.loggers
            .write()
            .insert(name.to_string(), Arc::clone(&logger));
        logger
    }

    /// The logger currently registered under `name`
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().get(name).cloned()
    }

    pub fn default_logger(&self) -> Arc<Logger> {
        match self.get(DEFAULT_LOGGER_NAME) {
            Some(logger) => logger,
            // Entries are only ever replaced, never removed
            None => self.for_name(DEFAULT_LOGGER_NAME),
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Set the minimum level of every registered logger
    pub fn set_level_all(&self, level: LogLevel) {
        for logger in self.loggers.read().values() {
            logger.set_level(level);
        }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.base_config
    }

    pub fn flush(&self) {
        self.default_logger().flush();
    }

    fn current_config(&self) -> LoggingConfig {
        let Some(ref source) = self.source else {
            return self.base_config.clone();
        };
        match source() {
            Ok(config) => config,
            Err(e) => {
                self.default_logger().warn(format!(
                    "Logging configuration is invalid, using startup configuration: {}",
                    e
                ));
                self.base_config.clone()
            }
        }
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.names())
            .field("base_config", &self.base_config)
            .finish()
    }
}
