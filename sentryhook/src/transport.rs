//! The seam between the hook and the error-tracking service.
//!
//! The hook never speaks a wire protocol itself. It hands finished events to a
//! [`Transport`] and asks it to flush.
use crate::error::TransportResult;
use crate::hub::Scope;
use crate::protocol::Event;
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;
use uuid::Uuid;

/// Extra information passed alongside an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventHint {
    /// Requested id for the event.
    pub event_id: Option<Uuid>,
    /// Arbitrary data for the transport.
    pub data: Option<Value>,
}

/// `Transport` defines the interface that event transports implement.
pub trait Transport: Send + Sync + Debug {
    /// Sends one event to the service.
    ///
    /// `scope` carries the hub's tags and extras; transports merge it with
    /// [`Scope::apply_to_event`] before encoding. Returns the id of the
    /// submitted event.
    fn send_event(
        &self,
        event: &Event<'_>,
        hint: Option<&EventHint>,
        scope: &Scope,
    ) -> impl std::future::Future<Output = TransportResult<Uuid>> + Send;

    /// Waits up to `timeout` for buffered events to be delivered.
    ///
    /// Returns `false` if the timeout elapsed first.
    fn flush(&self, _timeout: Duration) -> bool {
        true
    }

    /// Shuts down the transport.
    fn shutdown(&self) -> TransportResult<()> {
        Ok(())
    }

    /// Sets the timeout for a single submission.
    fn set_timeout(&mut self, _timeout: Duration) {}
}

/// A no-op instance of a [`Transport`]. Accepts and discards every event.
#[derive(Debug, Default)]
pub struct NoopTransport {
    _private: (),
}

impl NoopTransport {
    /// Create a new noop transport.
    pub fn new() -> Self {
        NoopTransport { _private: () }
    }
}

impl Transport for NoopTransport {
    #[allow(clippy::manual_async_fn)]
    fn send_event(
        &self,
        event: &Event<'_>,
        _hint: Option<&EventHint>,
        _scope: &Scope,
    ) -> impl std::future::Future<Output = TransportResult<Uuid>> + Send {
        let event_id = event.event_id;
        async move { Ok(event_id) }
    }
}
