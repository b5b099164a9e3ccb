use sentryhook::suppression::is_suppressed;
use sentryhook::trace::ErrorReport;
use sentryhook::transport::Transport;
use sentryhook::{Caller, LogEntry, LogLevel, SentryHook};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing_core::{Level, Subscriber};
use tracing_subscriber::{registry::LookupSpan, Layer};

const MESSAGE_FIELD: &str = "message";
const TARGET_KEY: &str = "target";

/// Visitor to record the message, fields and error of an event
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    data: Map<String, Value>,
    error: Option<ErrorReport>,
}

impl EventVisitor {
    fn insert(&mut self, field: &tracing::field::Field, value: Value) {
        self.data.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for EventVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            self.message = Some(format!("{value:?}"));
        } else {
            self.insert(field, format!("{value:?}").into());
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == MESSAGE_FIELD {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, value.into());
        }
    }

    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        // the first error field becomes the entry error, the rest stay fields
        if self.error.is_none() {
            self.error = Some(ErrorReport::from_error(value));
        } else {
            self.insert(field, value.to_string().into());
        }
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_i128(&mut self, field: &tracing::field::Field, value: i128) {
        match i64::try_from(value) {
            Ok(value) => self.insert(field, value.into()),
            Err(_) => self.insert(field, value.to_string().into()),
        }
    }

    fn record_u128(&mut self, field: &tracing::field::Field, value: u128) {
        match u64::try_from(value) {
            Ok(value) => self.insert(field, value.into()),
            Err(_) => self.insert(field, value.to_string().into()),
        }
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, value.into());
    }
}

/// A [`Layer`] that fires `tracing` events into a [`SentryHook`].
///
/// Events the hook is not registered for are ignored by this layer only;
/// other layers of the subscriber still see them.
#[derive(Debug)]
pub struct SentryTracingBridge<T: Transport> {
    hook: Arc<SentryHook<T>>,
}

impl<T: Transport> SentryTracingBridge<T> {
    /// Creates a layer firing into `hook`.
    pub fn new(hook: Arc<SentryHook<T>>) -> Self {
        SentryTracingBridge { hook }
    }

    /// The hook events are fired into.
    pub fn hook(&self) -> &Arc<SentryHook<T>> {
        &self.hook
    }
}

impl<S, T> Layer<S> for SentryTracingBridge<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    T: Transport + 'static,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        // events raised while the hook submits must not loop back into it
        if is_suppressed() {
            return;
        }
        let meta = event.metadata();
        let level = map_level(meta.level());
        if !self.hook.is_enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        visitor
            .data
            .insert(TARGET_KEY.into(), meta.target().into());

        let mut caller = Caller::new(meta.file().unwrap_or(meta.target()), meta.line());
        caller.function = meta.module_path();

        let message = visitor.message.unwrap_or_else(|| meta.name().to_string());
        let mut entry = LogEntry::new(level, message).with_caller(caller);
        entry.data = visitor.data;
        if let Some(err) = &visitor.error {
            entry = entry.with_error(err);
        }

        self.hook.fire(&entry);
    }
}

/// Maps a `tracing` level onto the hook's levels.
pub const fn map_level(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}
