//! Leveled logging capability.
//!
//! The client reports what it does through a [`Logger`] it owns. The
//! default [`TracingLogger`] forwards to `tracing`, so embedders pick the
//! output by installing a subscriber.

use std::fmt;

/// Severity of a log line, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards to `tracing`, tagging every event with the server name.
#[derive(Clone, Debug)]
pub struct TracingLogger {
    server: String,
}

impl TracingLogger {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let server = self.server.as_str();
        match level {
            LogLevel::Fatal => tracing::error!(server, fatal = true, "{}", message),
            LogLevel::Error => tracing::error!(server, "{}", message),
            LogLevel::Warning => tracing::warn!(server, "{}", message),
            LogLevel::Info => tracing::info!(server, "{}", message),
            LogLevel::Debug => tracing::debug!(server, "{}", message),
        }
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}
