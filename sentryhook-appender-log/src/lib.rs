//! Bridges the [`log`](https://docs.rs/log) crate to a [`SentryHook`].
//!
//! Every record whose level the hook is registered for is turned into a
//! [`LogEntry`] and fired.
//!
//! ```rust
//! use sentryhook::transport::NoopTransport;
//! use sentryhook::SentryHook;
//! use sentryhook_appender_log::SentryLogBridge;
//! use std::sync::Arc;
//!
//! let hook = Arc::new(SentryHook::new(NoopTransport::new()).unwrap());
//! let bridge = SentryLogBridge::new(hook);
//!
//! log::set_boxed_logger(Box::new(bridge)).unwrap();
//! log::set_max_level(log::LevelFilter::Warn);
//!
//! log::error!(order_id = 1234; "payment declined");
//! ```
//!
//! ## Mapping details
//!
//! | `log`                  | Log entry        | Notes                                                  |
//! |------------------------|------------------|--------------------------------------------------------|
//! | level                  | `level`          | `log` has no fatal or panic level                      |
//! | `args`                 | `message`        |                                                        |
//! | file, line             | `caller`         | Falls back to the target when the file is unknown      |
//! | module path            | `caller.function`|                                                        |
//! | target                 | `data["target"]` |                                                        |
//! | key-values             | `data`           | Numbers, booleans and strings keep their type          |
//! | key-value named `error`| `error`          | [`ErrorReport`] of its `source()` chain, no stack trace |
//!
//! Records emitted while the hook is submitting an event are dropped, so a
//! transport that logs through `log` cannot feed back into the hook.
use log::kv::{self, Key, VisitSource};
use log::{Level, Log, Metadata, Record};
use sentryhook::suppression::is_suppressed;
use sentryhook::trace::ErrorReport;
use sentryhook::transport::Transport;
use sentryhook::{Caller, LogEntry, LogLevel, SentryHook};
use serde_json::{Map, Value};
use std::sync::Arc;

const ERROR_KEY: &str = "error";
const TARGET_KEY: &str = "target";

/// A [`log::Log`] implementation that fires records into a [`SentryHook`].
#[derive(Debug)]
pub struct SentryLogBridge<T: Transport> {
    hook: Arc<SentryHook<T>>,
}

impl<T: Transport> SentryLogBridge<T> {
    /// Creates a bridge firing into `hook`.
    pub fn new(hook: Arc<SentryHook<T>>) -> Self {
        SentryLogBridge { hook }
    }

    /// The hook records are fired into.
    pub fn hook(&self) -> &Arc<SentryHook<T>> {
        &self.hook
    }
}

impl<T: Transport> Log for SentryLogBridge<T> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !is_suppressed() && self.hook.is_enabled(map_level(metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut visitor = KeyValueVisitor::default();
        let _ = record.key_values().visit(&mut visitor);
        visitor
            .data
            .insert(TARGET_KEY.into(), record.target().into());

        let caller = Caller {
            file: record.file().unwrap_or(record.target()),
            line: record.line(),
            function: record.module_path(),
        };
        let mut entry = LogEntry::new(map_level(record.level()), record.args().to_string())
            .with_caller(caller);
        entry.data = visitor.data;
        if let Some(err) = &visitor.error {
            entry = entry.with_error(err);
        }

        self.hook.fire(&entry);
    }

    fn flush(&self) {
        self.hook.flush();
    }
}

/// Maps a `log` level onto the hook's levels.
pub fn map_level(level: Level) -> LogLevel {
    match level {
        Level::Error => LogLevel::Error,
        Level::Warn => LogLevel::Warn,
        Level::Info => LogLevel::Info,
        Level::Debug => LogLevel::Debug,
        Level::Trace => LogLevel::Trace,
    }
}

#[derive(Default)]
struct KeyValueVisitor {
    data: Map<String, Value>,
    error: Option<ErrorReport>,
}

impl<'kvs> VisitSource<'kvs> for KeyValueVisitor {
    fn visit_pair(&mut self, key: Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        if key.as_str() == ERROR_KEY {
            let report = match value.to_borrowed_error() {
                Some(err) => ErrorReport::from_error(err),
                None => ErrorReport::new(value.to_string()),
            };
            self.error = Some(report);
            return Ok(());
        }
        self.data.insert(key.as_str().to_string(), to_json(&value));
        Ok(())
    }
}

fn to_json(value: &kv::Value<'_>) -> Value {
    if let Some(b) = value.to_bool() {
        Value::Bool(b)
    } else if let Some(n) = value.to_i64() {
        Value::from(n)
    } else if let Some(n) = value.to_u64() {
        Value::from(n)
    } else if let Some(n) = value.to_f64() {
        Value::from(n)
    } else if let Some(s) = value.to_borrowed_str() {
        Value::from(s)
    } else {
        Value::from(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sentryhook::protocol::Level as EventLevel;
    use sentryhook::testing::InMemoryTransport;
    use sentryhook::StacktraceConfig;

    fn bridge(transport: &InMemoryTransport) -> SentryLogBridge<InMemoryTransport> {
        let hook = SentryHook::builder(transport.clone())
            .with_stacktrace(StacktraceConfig {
                include_error_breadcrumb: true,
                ..Default::default()
            })
            .build()
            .unwrap();
        SentryLogBridge::new(Arc::new(hook))
    }

    #[rstest]
    #[case(Level::Error, LogLevel::Error)]
    #[case(Level::Warn, LogLevel::Warn)]
    #[case(Level::Info, LogLevel::Info)]
    #[case(Level::Debug, LogLevel::Debug)]
    #[case(Level::Trace, LogLevel::Trace)]
    fn level_mapping(#[case] level: Level, #[case] expected: LogLevel) {
        assert_eq!(map_level(level), expected);
    }

    #[test]
    fn enabled_follows_hook_levels() {
        let bridge = bridge(&InMemoryTransport::default());
        let metadata = |level| Metadata::builder().level(level).build();

        assert!(bridge.enabled(&metadata(Level::Error)));
        assert!(bridge.enabled(&metadata(Level::Warn)));
        assert!(!bridge.enabled(&metadata(Level::Info)));
    }

    #[test]
    fn records_below_hook_levels_are_dropped() {
        let transport = InMemoryTransport::default();
        let bridge = bridge(&transport);

        bridge.log(&Record::builder().level(Level::Info).args(format_args!("hello")).build());

        assert!(transport.get_captured_events().unwrap().is_empty());
    }

    #[test]
    fn record_becomes_event() {
        let transport = InMemoryTransport::default();
        let bridge = bridge(&transport);
        let kvs = vec![("order_id", 1234), ("attempt", 3)];

        bridge.log(
            &Record::builder()
                .level(Level::Error)
                .target("checkout")
                .file(Some("src/checkout.rs"))
                .line(Some(88))
                .module_path(Some("shop::checkout"))
                .key_values(&kvs)
                .args(format_args!("payment declined"))
                .build(),
        );

        let events = transport.get_captured_events().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0].event;
        assert_eq!(event.level, EventLevel::Error);
        assert_eq!(event.extra["order_id"], 1234);
        assert_eq!(event.extra["attempt"], 3);
        assert_eq!(event.extra["target"], "checkout");

        let message: Value = serde_json::from_str(&event.message).unwrap();
        assert_eq!(message["msg"], "payment declined");
        assert_eq!(message["file"], "src/checkout.rs:88");
        assert_eq!(message["func"], "shop::checkout");
    }

    #[test]
    fn error_key_becomes_entry_error() {
        let transport = InMemoryTransport::default();
        let bridge = bridge(&transport);
        let kvs = ("error", "connection refused");

        bridge.log(
            &Record::builder()
                .level(Level::Warn)
                .key_values(&kvs)
                .args(format_args!("retrying"))
                .build(),
        );

        let events = transport.get_captured_events().unwrap();
        let event = &events[0].event;
        assert!(event.extra.get("error").is_none());
        assert_eq!(
            event.breadcrumbs[0].message.as_deref(),
            Some("connection refused")
        );
    }

    #[derive(Debug)]
    struct Refused;

    impl std::fmt::Display for Refused {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl std::error::Error for Refused {}

    #[derive(Debug)]
    struct Unavailable(Refused);

    impl std::fmt::Display for Unavailable {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("database unavailable")
        }
    }

    impl std::error::Error for Unavailable {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_value_keeps_its_source_chain() {
        let transport = InMemoryTransport::default();
        let bridge = bridge(&transport);
        let err = Unavailable(Refused);
        let kvs = vec![("error", kv::Value::from_dyn_error(&err))];

        bridge.log(
            &Record::builder()
                .level(Level::Error)
                .key_values(&kvs)
                .args(format_args!("query failed"))
                .build(),
        );

        let events = transport.get_captured_events().unwrap();
        let breadcrumb = &events[0].event.breadcrumbs[0];
        assert_eq!(
            breadcrumb.message.as_deref(),
            Some("database unavailable: connection refused")
        );
    }

    #[test]
    fn records_inside_suppressed_scope_are_dropped() {
        let transport = InMemoryTransport::default();
        let bridge = bridge(&transport);

        {
            let _guard = sentryhook::suppression::SuppressionGuard::enter();
            bridge.log(&Record::builder().level(Level::Error).args(format_args!("loop")).build());
        }

        assert!(transport.get_captured_events().unwrap().is_empty());
    }
}
