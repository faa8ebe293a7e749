//! Human-readable console sink for interactive debugging

use super::target::ConsoleTarget;
use crate::core::{serializer, LogEntry, Sink, TimestampFormat};
use colored::Colorize;

const INDENT: &str = "    ";

/// Multi-line colorized console output.
///
/// `extra` is inspected in full: the cycle-safe serializer is used, so there
/// is no depth limit but cycles still terminate.
///
/// ```text
/// 2025-01-08T10:30:45.123Z [Quotes] INFO
///     fetched page
///     extra: {
///       "page": 2
///     }
/// ```
pub struct PrettyConsoleSink {
    target: ConsoleTarget,
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl PrettyConsoleSink {
    pub fn new(target: ConsoleTarget) -> Self {
        Self {
            target,
            use_colors: true,
            timestamp_format: TimestampFormat::default(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// # Example
    ///
    /// ```
    /// use safe_observability::sinks::{ConsoleTarget, PrettyConsoleSink};
    /// use safe_observability::TimestampFormat;
    ///
    /// let sink = PrettyConsoleSink::new(ConsoleTarget::Stdio)
    ///     .with_timestamp_format(TimestampFormat::TimeOnly);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn render(&self, entry: &LogEntry) -> String {
        let timestamp = self.timestamp_format.format(&entry.time);
        let level = entry.level.to_str();
        let header = if self.use_colors {
            format!(
                "{} {} {}",
                timestamp.dimmed(),
                format!("[{}]", entry.name).bold(),
                level.color(entry.level.color_code()).bold()
            )
        } else {
            format!("{} [{}] {}", timestamp, entry.name, level)
        };

        let mut block = header;
        for line in entry.message.lines() {
            block.push('\n');
            block.push_str(INDENT);
            block.push_str(line);
        }

        if let Some(ref extra) = entry.extra {
            let inspected = serializer::serialize_cycle_safe(extra);
            let pretty = serde_json::to_string_pretty(&inspected)
                .unwrap_or_else(|_| inspected.to_string());
            block.push('\n');
            block.push_str(INDENT);
            block.push_str("extra: ");
            block.push_str(&pretty.replace('\n', &format!("\n{}", INDENT)));
        }

        block
    }
}

impl Sink for PrettyConsoleSink {
    fn emit(&self, entry: &LogEntry) {
        let block = self.render(entry);
        self.target.write_line(entry.level, &block);
    }

    fn flush(&self) {
        self.target.flush();
    }

    fn name(&self) -> &str {
        "pretty_console"
    }
}
