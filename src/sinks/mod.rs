//! Sink implementations

pub mod file;
pub mod pretty_console;
pub mod structured_console;
pub mod target;

pub use file::{FileSink, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT};
pub use pretty_console::PrettyConsoleSink;
pub use structured_console::StructuredConsoleSink;
pub use target::{ConsoleTarget, SharedBuffer};

pub use crate::core::Sink;
