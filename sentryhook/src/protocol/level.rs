use serde::Serialize;
use std::fmt;

/// Severity of an event as understood by the error-tracking service.
///
/// This enumeration is coarser than [`LogLevel`](crate::LogLevel); see the
/// `From<LogLevel>` implementation for how log levels collapse onto it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Debug information.
    Debug,
    /// Informational messages.
    #[default]
    Info,
    /// A warning.
    Warning,
    /// An error.
    Error,
    /// A fatal error, the process is likely about to go away.
    Fatal,
}

impl Level {
    /// The wire name of this level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
