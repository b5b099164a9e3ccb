//! Write error-tracking events to stdout.
//!
//! Useful while developing a logging setup: every event the hook submits is
//! printed as one JSON document instead of being sent to a service.
//!
//! # Examples
//!
//! ```no_run
//! use sentryhook::{LogEntry, LogLevel, SentryHook};
//! use sentryhook_stdout::EventTransport;
//!
//! let hook = SentryHook::new(EventTransport::default()).unwrap();
//! hook.fire(&LogEntry::new(LogLevel::Error, "payment declined"));
//!
//! // {"event_id":"5c1b...","message":"{\"level\":\"error\",\"msg\":\"payment declined\",...
//! ```
#![warn(missing_debug_implementations, missing_docs)]

mod encoder;
mod transport;

pub use transport::{EventTransport, EventTransportBuilder};
