//! In-memory logger that captures entries

use parking_lot::Mutex;

use super::traits::Logger;

/// Log levels recorded by `MemoryLogger`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Logger that keeps every entry in memory
///
/// # Example
///
/// ```
/// use layerconf_core::logging::{Logger, MemoryLogger};
///
/// let logger = MemoryLogger::new();
/// logger.warn("something odd");
/// assert_eq!(logger.warnings(), vec!["something odd".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    /// Create an empty memory logger
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries, oldest first
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    /// Captured warning messages, oldest first
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(level, _)| *level == LogLevel::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Drop all captured entries
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}
