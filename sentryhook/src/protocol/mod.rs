//! The event schema of the error-tracking service.
//!
//! These types describe what a [`Transport`](crate::transport::Transport)
//! receives. How they travel over the wire is up to the transport.
mod breadcrumb;
mod event;
mod level;
mod stacktrace;

pub use breadcrumb::Breadcrumb;
pub use event::{Event, Exception, PLATFORM};
pub use level::Level;
pub use stacktrace::{Frame, Stacktrace};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;
use std::time::SystemTime;

pub(crate) fn serialize_timestamp<S>(timestamp: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let datetime: DateTime<Utc> = (*timestamp).into();
    serializer.serialize_str(&datetime.to_rfc3339_opts(SecondsFormat::Micros, true))
}
