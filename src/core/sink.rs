//! Sink trait for log output channels

use super::log_entry::LogEntry;

/// An output channel for log entries.
///
/// `emit` has no error channel: a sink contains its own failures and at most
/// degrades its output. The logger additionally isolates every sink call, so
/// a sink that panics cannot affect its siblings or the caller.
pub trait Sink: Send + Sync {
    fn emit(&self, entry: &LogEntry);

    /// Push out anything buffered or queued
    fn flush(&self) {}

    fn name(&self) -> &str;
}
