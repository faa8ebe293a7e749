//! Log entry structure

use super::context_value::ContextValue;
use super::log_level::LogLevel;
use super::serializer;
use super::timestamp::iso8601;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One log record, built per log call and handed to every enabled sink.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub name: String,
    pub message: String,
    pub level: LogLevel,
    pub time: DateTime<Utc>,
    pub extra: Option<ContextValue>,
}

/// Wire shape shared by the structured console and file sinks
#[derive(Debug, Serialize)]
pub struct EntryRecord<'a> {
    pub name: &'a str,
    pub message: &'a str,
    pub level: LogLevel,
    pub time: String,
    pub extra: serde_json::Value,
}

impl LogEntry {
    pub fn new(name: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            level,
            time: Utc::now(),
            extra: None,
        }
    }

    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<ContextValue>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// ISO 8601 rendering of `time`
    pub fn time_iso(&self) -> String {
        iso8601(&self.time)
    }

    /// Build the wire record with `extra` depth-bounded to `max_depth`
    pub fn to_record(&self, max_depth: usize) -> EntryRecord<'_> {
        let extra = self
            .extra
            .as_ref()
            .map_or(serde_json::Value::Null, |extra| {
                serializer::serialize_bounded(extra, max_depth)
            });

        EntryRecord {
            name: &self.name,
            message: &self.message,
            level: self.level,
            time: self.time_iso(),
            extra,
        }
    }

    /// Single-line plain rendering used when structured encoding fails.
    ///
    /// Newlines in the message are escaped so a message cannot forge
    /// additional log lines.
    pub fn plain_line(&self) -> String {
        format!(
            "[{}][{}] {}",
            self.level,
            self.name,
            self.message
                .replace('\n', "\\n")
                .replace('\r', "\\r")
        )
    }
}
