//! Append-only JSON-lines file sink
//!
//! Encoding happens on the caller's thread; the disk write happens on a
//! dedicated writer thread fed through a bounded queue, so a log call never
//! waits on disk I/O. Every failure on the way is reported to a fallback
//! console sink.

use crate::core::{
    serializer::DEFAULT_MAX_DEPTH, ContextValue, LogEntry, LogLevel, LoggerError, Result, Sink,
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound for `flush` and for joining the writer thread on drop
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lines that may wait for the writer thread before new ones are refused
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

const REPORTER_NAME: &str = "FileSink";

enum Command {
    Append(String),
    Flush(Sender<()>),
}

pub struct FileSink {
    path: PathBuf,
    sender: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
    fallback: Arc<dyn Sink>,
    max_depth: usize,
    capacity: usize,
}

impl FileSink {
    /// Start a file sink writing to `path`.
    ///
    /// The file is opened lazily on the first write, so nothing is created
    /// until an entry is actually logged.
    pub fn new(path: impl Into<PathBuf>, fallback: Arc<dyn Sink>) -> Result<Self> {
        Self::with_capacity(path, fallback, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(
        path: impl Into<PathBuf>,
        fallback: Arc<dyn Sink>,
        capacity: usize,
    ) -> Result<Self> {
        let path = path.into();
        let (sender, receiver) = bounded(capacity.max(1));

        let worker_path = path.clone();
        let worker_fallback = Arc::clone(&fallback);
        let worker = thread::Builder::new()
            .name("file-sink-writer".to_string())
            .spawn(move || run_writer(&worker_path, &receiver, &worker_fallback))
            .map_err(|e| LoggerError::io_operation("spawning file sink writer", path.display().to_string(), e))?;

        Ok(Self {
            path,
            sender: Some(sender),
            worker: Some(worker),
            fallback,
            max_depth: DEFAULT_MAX_DEPTH,
            capacity: capacity.max(1),
        })
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn enqueue(&self, line: String) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(LoggerError::ChannelSendError)?;
        match sender.try_send(Command::Append(line)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(LoggerError::queue_full(self.capacity)),
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::ChannelSendError),
        }
    }
}

impl Sink for FileSink {
    fn emit(&self, entry: &LogEntry) {
        let result = serde_json::to_string(&entry.to_record(self.max_depth))
            .map_err(LoggerError::from)
            .and_then(|line| self.enqueue(line));

        if let Err(e) = result {
            report(&self.fallback, &self.path, &e);
        }
    }

    /// Wait until every line queued so far has been written
    fn flush(&self) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if sender
            .send_timeout(Command::Flush(ack_tx), DEFAULT_SHUTDOWN_TIMEOUT)
            .is_ok()
        {
            let _ = ack_rx.recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT);
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Closing the queue lets the writer drain and exit
        drop(self.sender.take());

        if let Some(handle) = self.worker.take() {
            let start = Instant::now();
            loop {
                if handle.is_finished() {
                    if handle.join().is_err() {
                        eprintln!("[LOGGER ERROR] File sink writer panicked during shutdown");
                    }
                    break;
                }
                if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                    eprintln!(
                        "[LOGGER WARNING] File sink writer did not finish within {:?}. \
                         Some lines may be lost.",
                        DEFAULT_SHUTDOWN_TIMEOUT
                    );
                    break;
                }
                thread::sleep(Duration::from_millis(5));
            }
        }
    }
}

fn run_writer(path: &Path, receiver: &Receiver<Command>, fallback: &Arc<dyn Sink>) {
    let mut file: Option<File> = None;

    for command in receiver.iter() {
        match command {
            Command::Append(line) => {
                if let Err(e) = append_line(path, &mut file, &line) {
                    // Reopen on the next line; the path may become writable again
                    file = None;
                    report(fallback, path, &e);
                }
            }
            Command::Flush(ack) => {
                if let Some(handle) = file.as_mut() {
                    let _ = handle.flush();
                }
                let _ = ack.send(());
            }
        }
    }
}

fn append_line(path: &Path, file: &mut Option<File>, line: &str) -> Result<()> {
    if file.is_none() {
        let opened = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LoggerError::io_operation("opening log file", path.display().to_string(), e))?;
        *file = Some(opened);
    }
    let Some(handle) = file.as_mut() else {
        return Err(LoggerError::file_sink(path.display().to_string(), "file not open"));
    };

    handle
        .write_all(format!("\n{}", line).as_bytes())
        .map_err(|e| LoggerError::io_operation("appending log line", path.display().to_string(), e))
}

fn report(fallback: &Arc<dyn Sink>, path: &Path, error: &LoggerError) {
    let entry = LogEntry::new(
        REPORTER_NAME,
        LogLevel::Error,
        format!("Failed to write log file: {}", error),
    )
    .with_extra(ContextValue::map().with("path", path.display().to_string()));

    let reported = panic::catch_unwind(AssertUnwindSafe(|| fallback.emit(&entry)));
    if reported.is_err() {
        eprintln!("[LOGGER CRITICAL] {}", entry.plain_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{ConsoleTarget, SharedBuffer, StructuredConsoleSink};
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    fn fallback() -> (Arc<dyn Sink>, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let sink: Arc<dyn Sink> =
            Arc::new(StructuredConsoleSink::new(ConsoleTarget::Buffer(buffer.clone())));
        (sink, buffer)
    }

    #[test]
    fn test_lines_are_newline_prefixed_json() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");
        let (console, _) = fallback();
        let sink = FileSink::new(&path, console)?;

        for i in 0..3 {
            sink.emit(
                &LogEntry::new("Jobs", LogLevel::Info, format!("job {}", i))
                    .with_extra(ContextValue::map().with("i", i)),
            );
        }
        sink.flush();

        let content = fs::read_to_string(&path)?;
        assert!(content.starts_with('\n'));
        let lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        for (i, line) in lines.iter().enumerate() {
            let parsed: Value = serde_json::from_str(line)?;
            assert_eq!(parsed["message"], Value::from(format!("job {}", i)));
            assert_eq!(parsed["extra"]["i"], Value::from(i));
        }
        Ok(())
    }

    #[test]
    fn test_appends_to_existing_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");
        fs::write(&path, "{\"earlier\":true}")?;
        let (console, _) = fallback();

        let sink = FileSink::new(&path, console)?;
        sink.emit(&LogEntry::new("Jobs", LogLevel::Warn, "later"));
        sink.flush();

        let content = fs::read_to_string(&path)?;
        assert!(content.starts_with("{\"earlier\":true}\n{"));
        Ok(())
    }

    #[test]
    fn test_no_file_until_first_write() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("never.log");
        let (console, _) = fallback();

        let sink = FileSink::new(&path, console)?;
        sink.flush();
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_append_failure_goes_to_fallback() -> Result<()> {
        let dir = tempdir()?;
        // A directory cannot be opened for appending
        let (console, buffer) = fallback();
        let sink = FileSink::new(dir.path(), console)?;

        sink.emit(&LogEntry::new("Jobs", LogLevel::Info, "lost"));
        sink.flush();

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let parsed: Value = serde_json::from_str(&lines[0])?;
        assert_eq!(parsed["name"], Value::from("FileSink"));
        assert_eq!(parsed["level"], Value::from("ERROR"));
        assert!(parsed["message"].as_str().unwrap_or_default().contains("opening log file"));
        Ok(())
    }

    #[test]
    fn test_drop_drains_queue() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("drain.log");
        let (console, _) = fallback();

        {
            let sink = FileSink::new(&path, console)?;
            for i in 0..50 {
                sink.emit(&LogEntry::new("Jobs", LogLevel::Debug, format!("line {}", i)));
            }
        }

        let content = fs::read_to_string(&path)?;
        assert_eq!(content.lines().filter(|l| !l.is_empty()).count(), 50);
        Ok(())
    }
}
