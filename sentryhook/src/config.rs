use crate::entry::LogLevel;
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Timeout handed to the transport for a single submission, in milliseconds.
pub(crate) const SENTRYHOOK_TIMEOUT: &str = "SENTRYHOOK_TIMEOUT";
/// Default submission timeout.
pub(crate) const SENTRYHOOK_TIMEOUT_DEFAULT: Duration = Duration::from_millis(100);
/// Time the transport may take to flush after each event, in milliseconds.
pub(crate) const SENTRYHOOK_FLUSH_TIMEOUT: &str = "SENTRYHOOK_FLUSH_TIMEOUT";
/// Default flush timeout.
pub(crate) const SENTRYHOOK_FLUSH_TIMEOUT_DEFAULT: Duration = Duration::from_millis(3_000);

/// Levels routed to the hook unless configured otherwise.
pub(crate) const DEFAULT_LEVELS: [LogLevel; 4] = [
    LogLevel::Warn,
    LogLevel::Fatal,
    LogLevel::Error,
    LogLevel::Panic,
];

/// Controls whether and how stack traces are attached to events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StacktraceConfig {
    /// Whether stack traces should be captured at all.
    pub enable: bool,
    /// The level at which to start capturing stack traces.
    pub level: LogLevel,
    /// How many frames above the hook to leave out, e.g. the frames of a
    /// logging framework between the call site and the hook.
    pub skip: usize,
    /// Number of source lines to include around each frame.
    pub context: usize,
    /// Function or path prefixes that mark a frame as application code.
    pub in_app_prefixes: Vec<String>,
    /// Whether the exception type is sent.
    pub send_exception_type: bool,
    /// Whether exception type and value are swapped.
    pub switch_exception_type_and_message: bool,
    /// Whether to include a breadcrumb with the full error chain.
    pub include_error_breadcrumb: bool,
}

impl Default for StacktraceConfig {
    fn default() -> Self {
        StacktraceConfig {
            enable: false,
            level: LogLevel::Warn,
            skip: 0,
            context: 0,
            in_app_prefixes: Vec::new(),
            send_exception_type: true,
            switch_exception_type_and_message: false,
            include_error_breadcrumb: false,
        }
    }
}

/// Settings of a built hook. Immutable once the hook exists.
#[derive(Debug, Clone)]
pub(crate) struct HookConfig {
    pub(crate) timeout: Duration,
    pub(crate) flush_timeout: Duration,
    pub(crate) levels: Vec<LogLevel>,
    pub(crate) min_level: Option<LogLevel>,
    pub(crate) tags: BTreeMap<String, String>,
    pub(crate) stacktrace: StacktraceConfig,
    pub(crate) asynchronous: bool,
}

impl Default for HookConfig {
    /// Defaults, overridden by these environment variables when set:
    /// * `SENTRYHOOK_TIMEOUT`
    /// * `SENTRYHOOK_FLUSH_TIMEOUT`
    fn default() -> Self {
        HookConfig {
            timeout: SENTRYHOOK_TIMEOUT_DEFAULT,
            flush_timeout: SENTRYHOOK_FLUSH_TIMEOUT_DEFAULT,
            levels: DEFAULT_LEVELS.to_vec(),
            min_level: None,
            tags: BTreeMap::new(),
            stacktrace: StacktraceConfig::default(),
            asynchronous: false,
        }
        .init_from_env_vars()
    }
}

impl HookConfig {
    fn init_from_env_vars(mut self) -> Self {
        if let Some(timeout) = env::var(SENTRYHOOK_TIMEOUT)
            .ok()
            .and_then(|timeout| u64::from_str(&timeout).ok())
        {
            self.timeout = Duration::from_millis(timeout);
        }

        if let Some(flush_timeout) = env::var(SENTRYHOOK_FLUSH_TIMEOUT)
            .ok()
            .and_then(|timeout| u64::from_str(&timeout).ok())
        {
            self.flush_timeout = Duration::from_millis(flush_timeout);
        }

        self
    }
}
