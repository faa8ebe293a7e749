//! Core logger types and traits

pub mod config;
pub mod context_value;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod registry;
pub mod serializer;
pub mod sink;
pub mod timestamp;

pub use config::{Environment, LoggingConfig, DEFAULT_LOG_FILE};
pub use context_value::ContextValue;
pub use error::{panic_message, LoggerError, Result};
pub use log_entry::{EntryRecord, LogEntry};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, SinkSet};
pub use metrics::LoggerMetrics;
pub use registry::{ConfigSource, LoggerRegistry, DEFAULT_LOGGER_NAME};
pub use serializer::{SafeSerializer, SerializeMode, DEFAULT_MAX_DEPTH};
pub use sink::Sink;
pub use timestamp::TimestampFormat;
