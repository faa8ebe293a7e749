//! JSON-lines console sink (the default console mode)

use super::target::ConsoleTarget;
use crate::core::{serializer::DEFAULT_MAX_DEPTH, LogEntry, LogLevel, Sink};

const ERROR_OPEN: &str = "----- ERROR -----";
const ERROR_CLOSE: &str = "-----------------";

/// Writes `{name, message, level, time, extra}` as one JSON line per entry.
///
/// `extra` is depth-bounded before encoding. With `pretty_errors` enabled
/// (development), ERROR entries are written as an indented block between
/// marker lines instead.
pub struct StructuredConsoleSink {
    target: ConsoleTarget,
    max_depth: usize,
    pretty_errors: bool,
}

impl StructuredConsoleSink {
    pub fn new(target: ConsoleTarget) -> Self {
        Self {
            target,
            max_depth: DEFAULT_MAX_DEPTH,
            pretty_errors: false,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_pretty_errors(mut self, pretty_errors: bool) -> Self {
        self.pretty_errors = pretty_errors;
        self
    }

    fn encode(&self, entry: &LogEntry) -> serde_json::Result<String> {
        let record = entry.to_record(self.max_depth);
        if self.pretty_errors && entry.level == LogLevel::Error {
            let body = serde_json::to_string_pretty(&record)?;
            Ok(format!("{}\n{}\n{}", ERROR_OPEN, body, ERROR_CLOSE))
        } else {
            serde_json::to_string(&record)
        }
    }
}

impl Sink for StructuredConsoleSink {
    fn emit(&self, entry: &LogEntry) {
        let text = match self.encode(entry) {
            Ok(text) => text,
            Err(e) => format!("{} (log encoding failed: {})", entry.plain_line(), e),
        };
        self.target.write_line(entry.level, &text);
    }

    fn flush(&self) {
        self.target.flush();
    }

    fn name(&self) -> &str {
        "structured_console"
    }
}
