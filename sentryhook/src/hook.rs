//! # The Sentry Hook
//!
//! `SentryHook` receives log entries from a logging framework and turns each
//! qualifying entry into an [`Event`] for its [`Transport`]. Submission is
//! synchronous on the calling thread and followed by a flush of the
//! transport.
//!
//! ## Diagram
//!
//! ```ascii
//!   +----------+   +--------------------+   +------------------+   +-----------+
//!   | log /    |   |                    |   |                  |   |           |
//!   | tracing  +---> appender           +---> SentryHook.fire()+---> Transport |
//!   |          |   | (is_enabled check) |   |                  |   |           |
//!   +----------+   +--------------------+   +------------------+   +-----------+
//! ```
use crate::config::{HookConfig, StacktraceConfig};
use crate::entry::{LogEntry, LogLevel};
use crate::error::{HookError, HookResult};
use crate::format::{Formatter, JsonFormatter};
use crate::hub::Hub;
use crate::protocol::{Breadcrumb, Event, Exception, Level, Stacktrace, PLATFORM};
use crate::suppression::SuppressionGuard;
use crate::sync::DrainGate;
use crate::trace::{
    self, add_source_context, capture_stacktrace, chain_message, mark_in_app, Traceable,
};
use crate::transport::Transport;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Forwards log entries to an error-tracking service.
///
/// Built with [`SentryHook::builder`]. All settings are fixed once built and
/// the hook can be shared between threads.
///
/// ## Example
///
/// ```rust
/// use sentryhook::transport::NoopTransport;
/// use sentryhook::{LogEntry, LogLevel, SentryHook};
/// use std::time::Duration;
///
/// let hook = SentryHook::builder(NoopTransport::new())
///     .with_flush_timeout(Duration::from_secs(1))
///     .with_tag("service", "billing")
///     .build()
///     .unwrap();
///
/// if hook.is_enabled(LogLevel::Error) {
///     hook.fire(&LogEntry::new(LogLevel::Error, "payment declined"));
/// }
/// ```
#[derive(Debug)]
pub struct SentryHook<T: Transport> {
    transport: T,
    config: HookConfig,
    formatter: Box<dyn Formatter>,
    hub: Arc<Hub>,
    gate: DrainGate,
    is_shutdown: AtomicBool,
}

impl<T: Transport> SentryHook<T> {
    /// Creates a builder around `transport`.
    pub fn builder(transport: T) -> SentryHookBuilder<T> {
        SentryHookBuilder::new(transport)
    }

    /// Creates a hook with the default settings.
    pub fn new(transport: T) -> HookResult<Self> {
        Self::builder(transport).build()
    }

    /// Creates a hook with the default settings whose [`flush`](Self::flush)
    /// waits for submissions in flight.
    pub fn new_async(transport: T) -> HookResult<Self> {
        Self::builder(transport).with_async().build()
    }

    /// Levels this hook is registered for.
    pub fn levels(&self) -> &[LogLevel] {
        &self.config.levels
    }

    /// Returns `true` if entries at `level` should be fired.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.config.levels.contains(&level)
            && self.config.min_level.map_or(true, |min| level >= min)
    }

    /// Sends `entry` with the scope of the hook's hub.
    ///
    /// Never fails. Formatter and transport errors are reported through the
    /// crate's internal logs and otherwise ignored.
    #[inline(never)]
    pub fn fire(&self, entry: &LogEntry<'_>) {
        self.fire_with_hub(entry, &self.hub);
    }

    /// Sends `entry` with the scope of `hub` instead of the hook's own.
    #[inline(never)]
    pub fn fire_with_hub(&self, entry: &LogEntry<'_>, hub: &Hub) {
        let _suppress_guard = SuppressionGuard::enter();
        if self.is_shutdown.load(Ordering::Relaxed) {
            hook_warn!(name: "SentryHook.Fire.HookShutdown");
            return;
        }
        let _pass = self.config.asynchronous.then(|| self.gate.enter());

        let event = self.build_event(entry);
        let scope = hub.scope();
        match futures_executor::block_on(self.transport.send_event(&event, None, &scope)) {
            Ok(event_id) => {
                hook_debug!(
                    name: "SentryHook.Fire.EventSent",
                    event_id = event_id.to_string()
                );
            }
            Err(err) => {
                hook_error!(
                    name: "SentryHook.Fire.SendError",
                    error = format!("{}", err)
                );
            }
        }

        // the process may be about to exit, so don't leave events buffered
        if !self.transport.flush(self.config.flush_timeout) {
            hook_debug!(
                name: "SentryHook.Fire.FlushTimedOut",
                timeout_ms = self.config.flush_timeout.as_millis() as u64
            );
        }
    }

    /// Waits until every [`fire`](Self::fire) in progress has returned.
    ///
    /// Does nothing unless the hook was built with
    /// [`with_async`](SentryHookBuilder::with_async). Entries fired while the
    /// flush waits are held back until it finishes.
    pub fn flush(&self) {
        if !self.config.asynchronous {
            return;
        }
        self.gate.drain();
        hook_debug!(name: "SentryHook.Flush.Completed");
    }

    /// Resolves the stack trace of `err` the way events carry them.
    ///
    /// The deepest trace-capable link of the cause chain wins. Frames are
    /// ordered oldest call first and marked with the configured in-app
    /// prefixes.
    pub fn find_stacktrace(&self, err: Option<&dyn Traceable>) -> Option<Stacktrace> {
        let mut stacktrace = trace::find_stacktrace(err)?;
        let config = &self.config.stacktrace;
        mark_in_app(&mut stacktrace.frames, &config.in_app_prefixes);
        add_source_context(&mut stacktrace.frames, config.context);
        Some(stacktrace)
    }

    /// Builds the event [`fire`](Self::fire) would submit for `entry`.
    ///
    /// The event borrows the entry's data and the configured tags.
    pub fn build_event<'e>(&'e self, entry: &'e LogEntry<'_>) -> Event<'e> {
        let message = match self.formatter.format(entry) {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(err) => {
                hook_debug!(
                    name: "SentryHook.Fire.FormatError",
                    error = format!("{}", err)
                );
                String::new()
            }
        };

        let mut event = Event {
            event_id: Uuid::new_v4(),
            message,
            timestamp: entry.timestamp,
            level: entry.level.into(),
            platform: Cow::Borrowed(PLATFORM),
            extra: Cow::Borrowed(&entry.data),
            tags: Cow::Borrowed(&self.config.tags),
            exception: Vec::new(),
            breadcrumbs: Vec::new(),
        };

        let config = &self.config.stacktrace;
        if config.enable && entry.level >= config.level {
            if let Some(stacktrace) = capture_stacktrace(config, &Self::entry_points()) {
                event.exception.push(exception(config, entry, stacktrace));
            }
        }
        if config.include_error_breadcrumb {
            if let Some(err) = entry.error {
                event.breadcrumbs.push(error_breadcrumb(entry, err));
            }
        }
        event
    }

    // Captured stacks start above the outermost of these.
    fn entry_points() -> [usize; 2] {
        let fire = Self::fire as fn(&Self, &LogEntry<'_>);
        let fire_with_hub = Self::fire_with_hub as fn(&Self, &LogEntry<'_>, &Hub);
        [fire as usize, fire_with_hub as usize]
    }

    /// The transport events are submitted to.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The hub used by [`fire`](Self::fire).
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Tags attached to every event.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.config.tags
    }

    /// Submission timeout handed to the transport.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Time the transport may spend flushing after each event.
    pub fn flush_timeout(&self) -> Duration {
        self.config.flush_timeout
    }

    /// Stack trace settings.
    pub fn stacktrace_config(&self) -> &StacktraceConfig {
        &self.config.stacktrace
    }

    /// Whether [`flush`](Self::flush) waits for submissions in flight.
    pub fn is_async(&self) -> bool {
        self.config.asynchronous
    }

    /// Stops accepting entries and shuts the transport down.
    pub fn shutdown(&self) -> HookResult<()> {
        if self.is_shutdown.swap(true, Ordering::Relaxed) {
            hook_debug!(name: "SentryHook.Shutdown.AlreadyShutdown");
            return Ok(());
        }
        self.flush();
        self.transport.shutdown()?;
        hook_debug!(name: "SentryHook.Shutdown.Completed");
        Ok(())
    }
}

fn exception(config: &StacktraceConfig, entry: &LogEntry<'_>, stacktrace: Stacktrace) -> Exception {
    let ty = if config.send_exception_type {
        entry.message.to_string()
    } else {
        String::new()
    };
    let value = entry
        .caller
        .map(|caller| caller.file.to_string())
        .unwrap_or_default();
    let (ty, value) = if config.switch_exception_type_and_message {
        (value, ty)
    } else {
        (ty, value)
    };
    Exception {
        ty,
        value,
        stacktrace: Some(stacktrace),
    }
}

fn error_breadcrumb(entry: &LogEntry<'_>, err: &dyn Traceable) -> Breadcrumb {
    let mut chain = Vec::new();
    let mut link = Some(err);
    while let Some(current) = link {
        chain.push(serde_json::Value::from(current.to_string()));
        link = current.cause();
    }

    let mut breadcrumb = Breadcrumb {
        timestamp: entry.timestamp,
        ty: "error".into(),
        category: Some("error".into()),
        message: Some(chain_message(err)),
        level: Level::Error,
        ..Default::default()
    };
    breadcrumb.data.insert("chain".into(), chain.into());
    breadcrumb
}

/// Builder for [`SentryHook`].
///
/// Defaults come from the `SENTRYHOOK_TIMEOUT` and `SENTRYHOOK_FLUSH_TIMEOUT`
/// environment variables when set; `with_*` calls take precedence.
#[derive(Debug)]
pub struct SentryHookBuilder<T: Transport> {
    transport: T,
    config: HookConfig,
    formatter: Option<Box<dyn Formatter>>,
    hub: Option<Arc<Hub>>,
}

impl<T: Transport> SentryHookBuilder<T> {
    fn new(transport: T) -> Self {
        SentryHookBuilder {
            transport,
            config: HookConfig::default(),
            formatter: None,
            hub: None,
        }
    }

    /// Sets the submission timeout handed to the transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets how long the transport may flush after each event.
    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.config.flush_timeout = flush_timeout;
        self
    }

    /// Replaces the levels the hook is registered for.
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        self.config.levels = levels.into_iter().collect();
        self
    }

    /// Ignores entries below `level` even if their level is registered.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = Some(level);
        self
    }

    /// Replaces the tags attached to every event.
    pub fn with_tags<K, V>(mut self, tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.config.tags = tags
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Adds one tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.tags.insert(key.into(), value.into());
        self
    }

    /// Sets the formatter that renders event messages.
    ///
    /// Defaults to [`JsonFormatter`].
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Sets the stack trace settings.
    pub fn with_stacktrace(mut self, stacktrace: StacktraceConfig) -> Self {
        self.config.stacktrace = stacktrace;
        self
    }

    /// Uses `hub` for [`SentryHook::fire`] instead of a private hub.
    pub fn with_hub(mut self, hub: Arc<Hub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Makes [`SentryHook::flush`] wait for submissions in flight.
    pub fn with_async(mut self) -> Self {
        self.config.asynchronous = true;
        self
    }

    /// Validates the settings and creates the hook.
    pub fn build(mut self) -> HookResult<SentryHook<T>> {
        if self.config.timeout.is_zero() {
            return Err(HookError::InvalidConfig("timeout must be greater than zero".into()));
        }
        if self.config.flush_timeout.is_zero() {
            return Err(HookError::InvalidConfig(
                "flush timeout must be greater than zero".into(),
            ));
        }
        if self
            .config
            .stacktrace
            .in_app_prefixes
            .iter()
            .any(String::is_empty)
        {
            return Err(HookError::InvalidConfig("in-app prefixes must not be empty".into()));
        }

        self.transport.set_timeout(self.config.timeout);
        let hook = SentryHook {
            transport: self.transport,
            config: self.config,
            formatter: self
                .formatter
                .unwrap_or_else(|| Box::new(JsonFormatter::default())),
            hub: self.hub.unwrap_or_default(),
            gate: DrainGate::new(),
            is_shutdown: AtomicBool::new(false),
        };
        hook_debug!(
            name: "SentryHook.Built",
            asynchronous = hook.config.asynchronous,
            stacktrace = hook.config.stacktrace.enable
        );
        Ok(hook)
    }
}
