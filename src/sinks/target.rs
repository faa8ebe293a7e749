//! Console destinations

use crate::core::LogLevel;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Where console sinks write their lines
#[derive(Debug, Clone, Default)]
pub enum ConsoleTarget {
    /// ERROR and AUDIT go to stderr, everything else to stdout
    #[default]
    Stdio,
    /// In-memory capture
    Buffer(SharedBuffer),
}

impl ConsoleTarget {
    /// Write `text` followed by a newline. Write errors are ignored.
    pub fn write_line(&self, level: LogLevel, text: &str) {
        match self {
            ConsoleTarget::Stdio => match level {
                LogLevel::Error | LogLevel::Audit => {
                    let _ = writeln!(std::io::stderr().lock(), "{}", text);
                }
                _ => {
                    let _ = writeln!(std::io::stdout().lock(), "{}", text);
                }
            },
            ConsoleTarget::Buffer(buffer) => buffer.push_line(text),
        }
    }

    pub fn flush(&self) {
        if let ConsoleTarget::Stdio = self {
            let _ = std::io::stdout().flush();
            let _ = std::io::stderr().flush();
        }
    }
}

/// Cloneable in-memory line buffer
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<String>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&self, text: &str) {
        let mut inner = self.inner.lock();
        inner.push_str(text);
        inner.push('\n');
    }

    pub fn contents(&self) -> String {
        self.inner.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().lines().map(String::from).collect()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
