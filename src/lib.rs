//! # Safe Observability
//!
//! Leveled, multi-sink structured logging that survives whatever it is
//! handed, plus method instrumentation and a request-boundary exception
//! normalizer built on top of it.
//!
//! ## Features
//!
//! - **Safe serialization**: cyclic or arbitrarily deep context values are
//!   bounded before output
//! - **Isolated sinks**: pretty console, structured JSON console and an
//!   append-only JSON-lines file; one failing sink never affects another
//! - **Named loggers**: an explicit [`LoggerRegistry`] with independently
//!   leveled loggers and an always-present `Default` logger
//! - **Instrumentation**: entry logging and trace segments around any
//!   callable or future
//! - **Boundary normalization**: any failure becomes a status code and a
//!   well-formed [`ErrorEnvelope`](boundary::ErrorEnvelope)
//!
//! ## Example
//!
//! ```
//! use safe_observability::prelude::*;
//!
//! let config = LoggingConfig::default().with_min_level(LogLevel::Info);
//! let registry = LoggerRegistry::with_console_target(
//!     config,
//!     ConsoleTarget::Buffer(SharedBuffer::new()),
//! );
//!
//! let logger = registry.for_name("Quotes");
//! logger.info_with("Fetched quotes", ContextValue::map().with("count", 3));
//! logger.debug("filtered out");
//! assert_eq!(logger.metrics().emitted(), 1);
//! ```

pub mod boundary;
pub mod core;
pub mod instrumentation;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::boundary::{
        ErrorEnvelope, ExceptionNormalizer, Failure, FailureKind, IntoFailure, RequestContext,
    };
    pub use crate::core::{
        ContextValue, Environment, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError,
        LoggerMetrics, LoggerRegistry, LoggingConfig, Result, SafeSerializer, Sink,
        TimestampFormat,
    };
    pub use crate::instrumentation::{Instrumented, SpanTracer, Tracer, TracingIntegration};
    pub use crate::sinks::{ConsoleTarget, FileSink, SharedBuffer};
}

pub use core::{
    ContextValue, Environment, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, LoggerRegistry, LoggingConfig, Result, SafeSerializer, Sink, TimestampFormat,
    DEFAULT_MAX_DEPTH,
};
