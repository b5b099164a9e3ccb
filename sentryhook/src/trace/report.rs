use super::{RawStacktrace, Traceable};
use std::error::Error;
use std::fmt;

/// Wraps an error together with the call stack at the point it was wrapped.
///
/// The wrapped error is exposed as the [`cause`](Traceable::cause) so the
/// resolver keeps walking into it.
///
/// ```
/// use sentryhook::trace::{find_stacktrace, ErrorReport, TracedError};
///
/// let err = TracedError::new(ErrorReport::new("connection refused"));
/// assert!(find_stacktrace(Some(&err)).is_some());
/// ```
#[derive(Debug)]
pub struct TracedError<E> {
    inner: E,
    stacktrace: RawStacktrace,
}

impl<E> TracedError<E> {
    /// Wraps `inner`, recording the current call stack.
    #[inline(never)]
    pub fn new(inner: E) -> Self {
        TracedError {
            inner,
            stacktrace: RawStacktrace::capture(),
        }
    }

    /// Wraps `inner` with an already captured stack.
    pub fn with_stacktrace(inner: E, stacktrace: RawStacktrace) -> Self {
        TracedError { inner, stacktrace }
    }

    /// The wrapped error.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Unwraps the error, dropping the recorded stack.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: fmt::Display> fmt::Display for TracedError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<E: Error + 'static> Error for TracedError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

impl<E: Traceable> Traceable for TracedError<E> {
    fn raw_stacktrace(&self) -> Option<&RawStacktrace> {
        Some(&self.stacktrace)
    }

    fn cause(&self) -> Option<&dyn Traceable> {
        Some(&self.inner)
    }
}

/// An owned snapshot of an error's message chain.
///
/// Used wherever an error has to outlive the value it was read from, such as
/// errors recorded as `tracing` fields. Carries no stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    message: String,
    cause: Option<Box<ErrorReport>>,
}

impl ErrorReport {
    /// A single-link report.
    pub fn new(message: impl Into<String>) -> Self {
        ErrorReport {
            message: message.into(),
            cause: None,
        }
    }

    /// Appends `cause` as the next link.
    pub fn with_cause(mut self, cause: ErrorReport) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Snapshots `err` and its whole [`source`](Error::source) chain.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut messages = vec![err.to_string()];
        let mut source = err.source();
        while let Some(next) = source {
            messages.push(next.to_string());
            source = next.source();
        }

        let mut report: Option<ErrorReport> = None;
        for message in messages.into_iter().rev() {
            report = Some(ErrorReport {
                message,
                cause: report.map(Box::new),
            });
        }
        report.unwrap_or_else(|| ErrorReport::new(String::new()))
    }

    /// The message of this link.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ErrorReport {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}

impl Traceable for ErrorReport {
    fn cause(&self) -> Option<&dyn Traceable> {
        self.cause.as_deref().map(|c| c as &dyn Traceable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{chain_message, find_stacktrace};

    #[derive(Debug)]
    struct Io;

    impl fmt::Display for Io {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("permission denied")
        }
    }

    impl Error for Io {}

    #[derive(Debug)]
    struct Config(Io);

    impl fmt::Display for Config {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("failed to load config")
        }
    }

    impl Error for Config {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn report_snapshots_source_chain() {
        let report = ErrorReport::from_error(&Config(Io));
        assert_eq!(report.message(), "failed to load config");
        assert_eq!(chain_message(&report), "failed to load config: permission denied");
        assert!(find_stacktrace(Some(&report)).is_none());
    }

    #[test]
    fn traced_error_exposes_raw_trace_and_cause() {
        let err = TracedError::new(ErrorReport::new("timeout"));
        assert!(!err.raw_stacktrace().unwrap().is_empty());
        assert_eq!(Traceable::cause(&err).unwrap().to_string(), "timeout");
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn innermost_traced_error_provides_the_trace() {
        let inner = TracedError::with_stacktrace(
            ErrorReport::new("inner"),
            RawStacktrace::from_addrs(vec![0x20, 0x10]),
        );
        let outer = TracedError::with_stacktrace(inner, RawStacktrace::from_addrs(vec![0x99]));

        let trace = find_stacktrace(Some(&outer)).unwrap();
        let addrs: Vec<_> = trace.frames.iter().map(|f| f.instruction_addr).collect();
        assert_eq!(addrs, vec![Some(0x10), Some(0x20)]);
    }
}
