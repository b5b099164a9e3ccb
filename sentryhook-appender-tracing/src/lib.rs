//! # Sentryhook-Appender-Tracing
//!
//! This crate provides a bridge between the [`tracing`](https://docs.rs/tracing/latest/tracing/)
//! crate and a [`SentryHook`](sentryhook::SentryHook). It converts `tracing`
//! events into log entries and fires those the hook is registered for.
//!
//! ## Getting Started
//!
//! ```rust
//! use sentryhook::transport::NoopTransport;
//! use sentryhook::SentryHook;
//! use sentryhook_appender_tracing::layer::SentryTracingBridge;
//! use std::sync::Arc;
//! use tracing_subscriber::prelude::*;
//!
//! let hook = Arc::new(SentryHook::new(NoopTransport::new()).unwrap());
//!
//! tracing_subscriber::registry()
//!     .with(SentryTracingBridge::new(hook))
//!     .init();
//!
//! tracing::error!(order_id = 1234, "payment declined");
//! ```
//!
//! ## Mapping details
//!
//! | `tracing`             | Log entry        | Notes                                                        |
//! |-----------------------|------------------|--------------------------------------------------------------|
//! | level of the event    | `level`          | `tracing` has no fatal or panic level                        |
//! | `message` field       | `message`        | Falls back to the event name                                 |
//! | file, line            | `caller`         | Falls back to the target when the file is unknown            |
//! | module path           | `caller.function`|                                                              |
//! | target                | `data["target"]` |                                                              |
//! | other fields          | `data`           | See below                                                    |
//! | first `&dyn Error`    | `error`          | Snapshot of the whole `source()` chain as an `ErrorReport`   |
//!
//! ### Data Type Mapping
//!
//! | `tracing` Type    | JSON value                                         |
//! |-------------------|----------------------------------------------------|
//! | `i64`, `u64`      | number                                             |
//! | `i128`, `u128`    | number if it fits 64 bits, otherwise string        |
//! | `f64`             | number                                             |
//! | `bool`            | bool                                               |
//! | `&str`            | string                                             |
//! | `&dyn Debug`      | string (via `Debug` formatting)                    |
//!
//! Events emitted while the hook is submitting (by the transport, or by the
//! hook's own internal logs) are ignored, so they cannot loop back into the
//! hook.
pub mod layer;
