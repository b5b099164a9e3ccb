//! # Sentryhook
//!
//! A hook that forwards log entries to an error-tracking service.
//!
//! Logging frameworks hand their records to a [`SentryHook`] through an
//! appender (see the `sentryhook-appender-log` and
//! `sentryhook-appender-tracing` crates). The hook renders each record with a
//! [`Formatter`](format::Formatter), maps it onto the service's [`Event`]
//! schema and hands it to a [`Transport`](transport::Transport), flushing the
//! transport after every event.
//!
//! ## Getting Started
//!
//! ```rust
//! use sentryhook::transport::NoopTransport;
//! use sentryhook::{Caller, LogEntry, LogLevel, SentryHook, StacktraceConfig};
//!
//! // Replace with a transport that talks to your service
//! let hook = SentryHook::builder(NoopTransport::new())
//!     .with_tag("service", "checkout")
//!     .with_stacktrace(StacktraceConfig {
//!         enable: true,
//!         ..Default::default()
//!     })
//!     .build()
//!     .unwrap();
//!
//! let entry = LogEntry::new(LogLevel::Error, "payment declined")
//!     .with_caller(Caller::new(file!(), Some(line!())))
//!     .with_field("order_id", 1234);
//! hook.fire(&entry);
//! ```
//!
//! ## Mapping details
//!
//! | Log entry        | Event                | Notes                                                   |
//! |------------------|----------------------|---------------------------------------------------------|
//! | formatted entry  | `message`            | Output of the configured formatter; empty if it fails   |
//! | timestamp        | `timestamp`          |                                                         |
//! | level            | `level`              | trace/debug → debug, warn → warning, fatal/panic → fatal |
//! | data             | `extra`              | Borrowed, not copied                                    |
//! | configured tags  | `tags`               | Borrowed, not copied                                    |
//! | message, caller  | `exception`          | Only when stack traces are enabled for the entry level  |
//! | error            | `breadcrumbs`        | Only with `include_error_breadcrumb`                    |
//!
//! ## Stack traces
//!
//! Errors opt into stack trace reporting through [`Traceable`]. Given an
//! error chain, [`trace::find_stacktrace`] returns the trace of the deepest
//! link that carries one. [`TracedError`](trace::TracedError) records the
//! call stack of the place where an error was wrapped.
//!
//! ## Feature Flags
//!
//! * `internal-logs` (default): the hook reports its own operation through
//!   `tracing`.
//! * `testing`: enables [`testing::InMemoryTransport`].
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]

#[macro_use]
mod internal_logging;

mod config;
mod hook;
mod sync;

pub mod entry;
pub mod error;
pub mod format;
pub mod hub;
pub mod protocol;
pub mod suppression;
pub mod trace;
pub mod transport;

/// In-memory transport for testing.
#[cfg(any(feature = "testing", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "testing")))]
pub mod testing;

pub use config::StacktraceConfig;
pub use entry::{Caller, LogEntry, LogLevel};
pub use error::{HookError, HookResult};
pub use hook::{SentryHook, SentryHookBuilder};
pub use protocol::{Event, Level};
pub use trace::Traceable;

#[cfg(feature = "internal-logs")]
#[doc(hidden)]
pub mod _private {
    pub use tracing::{debug, error, warn};
}
