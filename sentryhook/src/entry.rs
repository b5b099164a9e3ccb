use crate::protocol::Level;
use crate::trace::Traceable;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::time::SystemTime;

/// Severity of a log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Finer-grained than debug.
    Trace,
    /// Debugging information.
    Debug,
    /// General operational entries.
    Info,
    /// Non-critical entries that deserve eyes.
    Warn,
    /// Errors that should definitely be noted.
    Error,
    /// The application is about to exit.
    Fatal,
    /// The application is about to panic.
    Panic,
}

impl LogLevel {
    /// Every level, least severe first.
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Panic,
    ];

    /// The name formatters use for this level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace | LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warning,
            LogLevel::Error => Level::Error,
            LogLevel::Fatal | LogLevel::Panic => Level::Fatal,
        }
    }
}

/// Source location of the code that emitted a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller<'a> {
    /// Source file path.
    pub file: &'a str,
    /// Line within `file`.
    pub line: Option<u32>,
    /// Module path or function name, when the logging framework knows it.
    pub function: Option<&'a str>,
}

impl<'a> Caller<'a> {
    /// Creates a caller location.
    pub fn new(file: &'a str, line: Option<u32>) -> Self {
        Caller {
            file,
            line,
            function: None,
        }
    }

    /// Sets the function or module path.
    pub fn with_function(mut self, function: &'a str) -> Self {
        self.function = Some(function);
        self
    }
}

/// A single record handed to the hook by a logging framework.
///
/// The hook only ever reads entries. `data` is lent to the
/// [`Event`](crate::protocol::Event) that gets built from it, not copied.
#[derive(Debug, Clone)]
pub struct LogEntry<'a> {
    /// When the entry was produced.
    pub timestamp: SystemTime,
    /// Severity of the entry.
    pub level: LogLevel,
    /// The raw log message.
    pub message: Cow<'a, str>,
    /// Where the entry was emitted from.
    pub caller: Option<Caller<'a>>,
    /// Structured key-value fields.
    pub data: Map<String, Value>,
    /// An error associated with the entry.
    pub error: Option<&'a dyn Traceable>,
}

impl<'a> LogEntry<'a> {
    /// Creates an entry timestamped now, with no caller, fields or error.
    pub fn new(level: LogLevel, message: impl Into<Cow<'a, str>>) -> Self {
        LogEntry {
            timestamp: SystemTime::now(),
            level,
            message: message.into(),
            caller: None,
            data: Map::new(),
            error: None,
        }
    }

    /// Overrides the timestamp.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the caller location.
    pub fn with_caller(mut self, caller: Caller<'a>) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Adds a structured field, replacing any previous value for `key`.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Associates an error with the entry.
    pub fn with_error(mut self, error: &'a dyn Traceable) -> Self {
        self.error = Some(error);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LogLevel::Trace, Level::Debug)]
    #[case(LogLevel::Debug, Level::Debug)]
    #[case(LogLevel::Info, Level::Info)]
    #[case(LogLevel::Warn, Level::Warning)]
    #[case(LogLevel::Error, Level::Error)]
    #[case(LogLevel::Fatal, Level::Fatal)]
    #[case(LogLevel::Panic, Level::Fatal)]
    fn severity_mapping(#[case] source: LogLevel, #[case] expected: Level) {
        assert_eq!(Level::from(source), expected);
    }

    #[test]
    fn severity_mapping_is_total_and_monotonic() {
        let mapped: Vec<Level> = LogLevel::ALL.iter().map(|l| Level::from(*l)).collect();
        assert_eq!(mapped.len(), LogLevel::ALL.len());
        assert!(mapped.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn levels_are_ordered_least_severe_first() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Fatal < LogLevel::Panic);
    }

    #[test]
    fn entry_builder_collects_fields() {
        let entry = LogEntry::new(LogLevel::Error, "disk full")
            .with_caller(Caller::new("src/disk.rs", Some(42)).with_function("app::disk"))
            .with_field("free_bytes", 0)
            .with_field("mount", "/var");

        assert_eq!(entry.message, "disk full");
        assert_eq!(entry.caller.unwrap().file, "src/disk.rs");
        assert_eq!(entry.data.len(), 2);
        assert!(entry.error.is_none());
    }
}
