use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::clock::now_secs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum LogSink {
    #[default]
    Stderr,
    File(PathBuf),
    Discard,
}

/// Append-only JSON line event log.
///
/// Each event is one `{timestamp, level, event, message}` object. Write
/// failures are ignored so logging never changes the outcome of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    sink: LogSink,
}

impl EventLog {
    pub fn stderr() -> Self {
        Self {
            sink: LogSink::Stderr,
        }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: LogSink::File(path.into()),
        }
    }

    pub fn discard() -> Self {
        Self {
            sink: LogSink::Discard,
        }
    }

    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::to_file(path),
            None => Self::stderr(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            LogSink::File(path) => Some(path.as_path()),
            LogSink::Stderr | LogSink::Discard => None,
        }
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append(LogLevel::Error, event, message);
    }

    pub fn append(&self, level: LogLevel, event: &str, message: &str) {
        if self.sink == LogSink::Discard {
            return;
        }
        let Some(line) = format_log_line(now_secs(), level, event, message) else {
            return;
        };
        match &self.sink {
            LogSink::Stderr => {
                let _ = std::io::stderr().lock().write_all(line.as_bytes());
            }
            LogSink::File(path) => {
                let _ = append_line(path, &line);
            }
            LogSink::Discard => {}
        }
    }
}

pub fn format_log_line(timestamp: i64, level: LogLevel, event: &str, message: &str) -> Option<String> {
    let payload = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "event": event,
        "message": message,
    });
    let mut line = serde_json::to_string(&payload).ok()?;
    line.push('\n');
    Some(line)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    // single write so concurrent runs never interleave within a line
    file.write_all(line.as_bytes())
}
