//! Named, leveled logger
//!
//! A `Logger` filters each call against its minimum level, builds one
//! [`LogEntry`] and hands it to every enabled sink: the console sink (pretty
//! or structured), then the file sink, then any custom sinks.

use super::{
    config::LoggingConfig,
    context_value::ContextValue,
    error::{panic_message, Result},
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    sink::Sink,
    timestamp::TimestampFormat,
};
use crate::sinks::{ConsoleTarget, FileSink, PrettyConsoleSink, StructuredConsoleSink};
use parking_lot::RwLock;
use std::sync::Arc;

/// The built-in sinks a logger can route to. Shared by every logger of a
/// registry.
#[derive(Clone)]
pub struct SinkSet {
    pub pretty: Arc<dyn Sink>,
    pub structured: Arc<dyn Sink>,
    pub file: Option<Arc<dyn Sink>>,
}

impl SinkSet {
    /// Build the standard sinks for `config`, writing console output to
    /// `target`.
    ///
    /// The file sink is always started (it opens its file lazily) so that
    /// file output can be switched on later. If its writer thread cannot be
    /// started the failure is reported on the console and file output is
    /// unavailable.
    pub fn from_config(config: &LoggingConfig, target: ConsoleTarget) -> Self {
        Self::build(config, target, true)
    }

    pub(crate) fn build(config: &LoggingConfig, target: ConsoleTarget, use_colors: bool) -> Self {
        let pretty: Arc<dyn Sink> =
            Arc::new(
                PrettyConsoleSink::new(target.clone())
                    .with_colors(use_colors)
                    .with_timestamp_format(config.timestamp_format.clone()),
            );
        let structured: Arc<dyn Sink> = Arc::new(
            StructuredConsoleSink::new(target)
                .with_max_depth(config.max_depth)
                .with_pretty_errors(!config.environment.is_production()),
        );

        let fallback = if config.structured {
            Arc::clone(&structured)
        } else {
            Arc::clone(&pretty)
        };
        let file = match FileSink::new(&config.file_path, Arc::clone(&fallback)) {
            Ok(sink) => Some(Arc::new(sink.with_max_depth(config.max_depth)) as Arc<dyn Sink>),
            Err(e) => {
                fallback.emit(&LogEntry::new(
                    "FileSink",
                    LogLevel::Error,
                    format!("File output unavailable: {}", e),
                ));
                None
            }
        };

        Self {
            pretty,
            structured,
            file,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SinkSwitches {
    console: bool,
    structured: bool,
    file: bool,
}

pub struct Logger {
    name: String,
    min_level: RwLock<LogLevel>,
    switches: RwLock<SinkSwitches>,
    sinks: SinkSet,
    custom_sinks: RwLock<Vec<Arc<dyn Sink>>>,
    metrics: LoggerMetrics,
}

impl Logger {
    /// Create a logger whose level and sink switches come from `config`
    pub fn new(name: impl Into<String>, config: &LoggingConfig, sinks: SinkSet) -> Self {
        Self {
            name: name.into(),
            min_level: RwLock::new(config.min_level),
            switches: RwLock::new(SinkSwitches {
                console: config.console_enabled,
                structured: config.structured,
                file: config.file_enabled,
            }),
            sinks,
            custom_sinks: RwLock::new(Vec::new()),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Create a builder for a standalone logger
    ///
    /// # Example
    /// ```
    /// use safe_observability::prelude::*;
    ///
    /// let logger = Logger::builder("Quotes")
    ///     .min_level(LogLevel::Info)
    ///     .console_target(ConsoleTarget::Buffer(SharedBuffer::new()))
    ///     .build();
    /// assert_eq!(logger.level(), LogLevel::Info);
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    /// Set the minimum level by name. Unknown names are rejected and the
    /// current level is kept.
    pub fn set_level_str(&self, level: &str) -> Result<()> {
        let level: LogLevel = level.parse()?;
        self.set_level(level);
        Ok(())
    }

    /// AUDIT always passes; other levels pass when their rank is at least
    /// the minimum level's rank.
    #[inline]
    pub fn can_log(&self, level: LogLevel) -> bool {
        level.bypasses_filter() || level.rank() >= self.level().rank()
    }

    /// Like [`Logger::can_log`]; an unrecognized name never logs.
    pub fn can_log_str(&self, level: &str) -> bool {
        level
            .parse::<LogLevel>()
            .map(|level| self.can_log(level))
            .unwrap_or(false)
    }

    pub fn console_enabled(&self) -> bool {
        self.switches.read().console
    }

    pub fn structured(&self) -> bool {
        self.switches.read().structured
    }

    pub fn file_enabled(&self) -> bool {
        self.switches.read().file
    }

    pub fn set_console_enabled(&self, enabled: bool) {
        self.switches.write().console = enabled;
    }

    /// `false` routes console output to the pretty sink
    pub fn set_structured(&self, structured: bool) {
        self.switches.write().structured = structured;
    }

    pub fn set_file_enabled(&self, enabled: bool) {
        self.switches.write().file = enabled;
    }

    /// Add a sink that receives every entry after the built-in sinks
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.custom_sinks.write().push(sink);
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Log `message` with a list of context values.
    ///
    /// Only the first context value becomes the entry's `extra`; the rest are
    /// ignored.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, extras: &[ContextValue]) {
        self.log_entry(level, message.into(), extras.first().cloned());
    }

    /// Log at a level given by name; unknown names are not logged.
    pub fn log_named(&self, level: &str, message: impl Into<String>, extras: &[ContextValue]) {
        if let Ok(level) = level.parse::<LogLevel>() {
            self.log(level, message, extras);
        } else {
            self.metrics.record_filtered();
        }
    }

    fn log_entry(&self, level: LogLevel, message: String, extra: Option<ContextValue>) {
        if !self.can_log(level) {
            self.metrics.record_filtered();
            return;
        }

        let mut entry = LogEntry::new(self.name.as_str(), level, message);
        entry.extra = extra;
        self.dispatch(&entry);
    }

    fn dispatch(&self, entry: &LogEntry) {
        let switches = *self.switches.read();

        if switches.console {
            let console = if switches.structured {
                &self.sinks.structured
            } else {
                &self.sinks.pretty
            };
            self.emit_isolated(console.as_ref(), entry);
        }

        if switches.file {
            if let Some(ref file) = self.sinks.file {
                self.emit_isolated(file.as_ref(), entry);
            }
        }

        // Snapshot so a sink may log (or add sinks) without deadlocking
        let custom: Vec<Arc<dyn Sink>> = self.custom_sinks.read().clone();
        for sink in &custom {
            self.emit_isolated(sink.as_ref(), entry);
        }

        self.metrics.record_emitted();
    }

    /// Hand one entry to one sink; a panicking sink is contained here so the
    /// remaining sinks still run.
    fn emit_isolated(&self, sink: &dyn Sink, entry: &LogEntry) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.emit(entry)));

        if let Err(panic_info) = result {
            self.metrics.record_sink_failure();
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked: {}. Other sinks continue to function.",
                sink.name(),
                panic_message(panic_info.as_ref())
            );
        }
    }

    /// Flush every sink this logger can write to
    pub fn flush(&self) {
        let mut sinks = vec![Arc::clone(&self.sinks.pretty), Arc::clone(&self.sinks.structured)];
        sinks.extend(self.sinks.file.iter().cloned());
        sinks.extend(self.custom_sinks.read().iter().cloned());

        for sink in sinks {
            if let Err(panic_info) =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.flush()))
            {
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' panicked during flush: {}",
                    sink.name(),
                    panic_message(panic_info.as_ref())
                );
            }
        }
    }

    #[inline]
    pub fn verbose(&self, message: impl Into<String>) {
        self.log_entry(LogLevel::Verbose, message.into(), None);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_entry(LogLevel::Debug, message.into(), None);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log_entry(LogLevel::Info, message.into(), None);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log_entry(LogLevel::Warn, message.into(), None);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log_entry(LogLevel::Error, message.into(), None);
    }

    #[inline]
    pub fn audit(&self, message: impl Into<String>) {
        self.log_entry(LogLevel::Audit, message.into(), None);
    }

    pub fn verbose_with(&self, message: impl Into<String>, extra: impl Into<ContextValue>) {
        self.log_entry(LogLevel::Verbose, message.into(), Some(extra.into()));
    }

    pub fn debug_with(&self, message: impl Into<String>, extra: impl Into<ContextValue>) {
        self.log_entry(LogLevel::Debug, message.into(), Some(extra.into()));
    }

    pub fn info_with(&self, message: impl Into<String>, extra: impl Into<ContextValue>) {
        self.log_entry(LogLevel::Info, message.into(), Some(extra.into()));
    }

    pub fn warn_with(&self, message: impl Into<String>, extra: impl Into<ContextValue>) {
        self.log_entry(LogLevel::Warn, message.into(), Some(extra.into()));
    }

    pub fn error_with(&self, message: impl Into<String>, extra: impl Into<ContextValue>) {
        self.log_entry(LogLevel::Error, message.into(), Some(extra.into()));
    }

    pub fn audit_with(&self, message: impl Into<String>, extra: impl Into<ContextValue>) {
        self.log_entry(LogLevel::Audit, message.into(), Some(extra.into()));
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("min_level", &self.level())
            .field("switches", &*self.switches.read())
            .finish()
    }
}

/// Builder for a standalone [`Logger`] with its own sinks
pub struct LoggerBuilder {
    name: String,
    config: LoggingConfig,
    target: ConsoleTarget,
    use_colors: bool,
    sinks: Vec<Arc<dyn Sink>>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: LoggingConfig::default(),
            target: ConsoleTarget::Stdio,
            use_colors: true,
            sinks: Vec::new(),
        }
    }

    /// Start from a full configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggingConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_enabled(mut self, enabled: bool) -> Self {
        self.config.console_enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn structured(mut self, structured: bool) -> Self {
        self.config.structured = structured;
        self
    }

    /// Timestamp format of the pretty console sink
    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Enable the file sink writing to `path`
    #[must_use = "builder methods return a new value"]
    pub fn file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config = self.config.with_file(path);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn build(self) -> Logger {
        let sinks = SinkSet::build(&self.config, self.target, self.use_colors);
        let logger = Logger::new(self.name, &self.config, sinks);
        for sink in self.sinks {
            logger.add_sink(sink);
        }
        logger
    }
}
