//! Logging macros with `format!`-style arguments.
//!
//! # Examples
//!
//! ```
//! use safe_observability::prelude::*;
//! use safe_observability::info;
//!
//! let logger = Logger::builder("Server")
//!     .console_target(ConsoleTarget::Buffer(SharedBuffer::new()))
//!     .build();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a formatted message at an explicit level.
///
/// ```
/// # use safe_observability::prelude::*;
/// # let logger = Logger::builder("Doc").console_enabled(false).build();
/// use safe_observability::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), &[])
    };
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Verbose, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log an audit record; never filtered by the minimum level.
///
/// ```
/// # use safe_observability::prelude::*;
/// # let logger = Logger::builder("Doc").console_enabled(false).build();
/// use safe_observability::audit;
/// logger.set_level(LogLevel::Error);
/// audit!(logger, "User {} exported report {}", 7, "Q3");
/// ```
#[macro_export]
macro_rules! audit {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Audit, $($arg)+)
    };
}
