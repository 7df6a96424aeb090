//! Pipeline log fan-out.
//!
//! Every entry is printed to the console and broadcast to connected
//! Server-Sent Events clients (`GET /api/logs`), so an operator watching the
//! upload page sees the load steps as they run.
//!
//! Console lines go to stderr only: the CLI's stdout carries JSON.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Entries buffered per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Log level for frontend display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for display.
    #[serde(default)]
    pub indent: u8,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    fn console_line(&self) -> String {
        let marker = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        format!(
            "{} {}{} {}",
            self.timestamp.format("%H:%M:%S"),
            "   ".repeat(self.indent as usize),
            marker,
            self.message
        )
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
    console: Mutex<Box<dyn Write + Send>>,
}

impl LogBroadcaster {
    /// Broadcaster printing to stderr.
    pub fn new() -> Self {
        Self::with_console(io::stderr())
    }

    /// Broadcaster printing to `console` instead of stderr.
    pub fn with_console(console: impl Write + Send + 'static) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            console: Mutex::new(Box::new(console)),
        }
    }

    /// Print an entry and send it to every subscriber.
    pub fn log(&self, entry: LogEntry) {
        if let Ok(mut console) = self.console.lock() {
            // A closed console must not stop the broadcast
            let _ = writeln!(console, "{}", entry.console_line());
        }

        // No subscribers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, msg));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Console sink the test can read back.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_every_level_goes_to_the_console_sink() {
        let sink = SharedBuffer::default();
        let broadcaster = LogBroadcaster::with_console(sink.clone());

        broadcaster.log(LogEntry::new(LogLevel::Info, "Reading fbl1n.csv"));
        broadcaster.log(LogEntry::new(LogLevel::Success, "Read 3 rows"));
        broadcaster.log(LogEntry::new(LogLevel::Warning, "1 of 3 rows had no sociedad"));
        broadcaster.log(LogEntry::new(LogLevel::Error, "truncate failed"));

        let text = sink.text();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("Reading fbl1n.csv"));
        assert!(text.contains("✓ Read 3 rows"));
        assert!(text.contains("truncate failed"));
    }

    #[test]
    fn test_subscriber_receives_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Warning, "3 rows had no sociedad"));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.message, "3 rows had no sociedad");
    }

    #[test]
    fn test_log_without_subscribers_does_not_panic() {
        LogBroadcaster::new().log(LogEntry::new(LogLevel::Info, "nobody listening"));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry::new(LogLevel::Success, "done").with_indent(1);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["indent"], 1);
        assert!(json["timestamp"].is_string());
    }
}
