use crate::error::{TransportError, TransportResult};
use crate::hub::Scope;
use crate::protocol::Event;
use crate::transport::{EventHint, Transport};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// A transport that keeps submitted events in memory.
///
/// Clones share storage, so a test keeps one clone and hands the other to
/// the hook.
///
/// # Example
///
/// ```
/// use sentryhook::testing::InMemoryTransport;
/// use sentryhook::{LogEntry, LogLevel, SentryHook};
///
/// let transport = InMemoryTransport::default();
/// let hook = SentryHook::new(transport.clone()).unwrap();
///
/// hook.fire(&LogEntry::new(LogLevel::Error, "boom"));
///
/// let events = transport.get_captured_events().unwrap();
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryTransport {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    flushes: Arc<AtomicUsize>,
    timeout: Arc<Mutex<Option<Duration>>>,
    is_shutdown: Arc<AtomicBool>,
    delay: Option<Duration>,
    failure: Option<String>,
    should_reset_on_shutdown: bool,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        InMemoryTransportBuilder::new().build()
    }
}

/// An event as the transport received it.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    /// The event, detached from the data it borrowed.
    pub event: Event<'static>,
    /// The scope submitted with the event.
    pub scope: Scope,
    /// The hint submitted with the event.
    pub hint: Option<EventHint>,
}

impl CapturedEvent {
    /// The event with its scope applied, as a real transport would encode it.
    pub fn merged(&self) -> Event<'static> {
        self.scope.apply_to_event(self.event.clone())
    }
}

/// Builder for [`InMemoryTransport`].
#[derive(Debug, Clone)]
pub struct InMemoryTransportBuilder {
    delay: Option<Duration>,
    failure: Option<String>,
    reset_on_shutdown: bool,
}

impl Default for InMemoryTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransportBuilder {
    /// Creates a builder for a transport that accepts every event.
    pub fn new() -> Self {
        Self {
            delay: None,
            failure: None,
            reset_on_shutdown: true,
        }
    }

    /// Makes every submission block the calling thread for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every submission fail with [`TransportError::SendFailed`].
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Keeps captured events when the transport is shut down.
    pub fn keep_events_on_shutdown(mut self) -> Self {
        self.reset_on_shutdown = false;
        self
    }

    /// Creates the transport.
    pub fn build(&self) -> InMemoryTransport {
        InMemoryTransport {
            events: Arc::new(Mutex::new(Vec::new())),
            flushes: Arc::new(AtomicUsize::new(0)),
            timeout: Arc::new(Mutex::new(None)),
            is_shutdown: Arc::new(AtomicBool::new(false)),
            delay: self.delay,
            failure: self.failure.clone(),
            should_reset_on_shutdown: self.reset_on_shutdown,
        }
    }
}

impl InMemoryTransport {
    /// Creates a builder.
    pub fn builder() -> InMemoryTransportBuilder {
        InMemoryTransportBuilder::new()
    }

    /// Returns every event received so far, oldest first.
    pub fn get_captured_events(&self) -> TransportResult<Vec<CapturedEvent>> {
        let events = self.events.lock().map_err(|e| {
            TransportError::InternalFailure(format!("Failed to lock events: {}", e))
        })?;
        Ok(events.clone())
    }

    /// How many times the transport was asked to flush.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// The submission timeout handed over by the hook, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.lock().ok().and_then(|timeout| *timeout)
    }

    /// Whether [`Transport::shutdown`] was called.
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Clears the captured events.
    pub fn reset(&self) {
        let _ = self.events.lock().map(|mut events| events.clear());
    }
}

impl Transport for InMemoryTransport {
    #[allow(clippy::manual_async_fn)]
    fn send_event(
        &self,
        event: &Event<'_>,
        hint: Option<&EventHint>,
        scope: &Scope,
    ) -> impl std::future::Future<Output = TransportResult<Uuid>> + Send {
        async move {
            if self.is_shutdown() {
                return Err(TransportError::AlreadyShutdown);
            }
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            if let Some(reason) = &self.failure {
                return Err(TransportError::SendFailed(reason.clone()));
            }

            let mut events = self.events.lock()?;
            events.push(CapturedEvent {
                event: event.clone().into_owned(),
                scope: scope.clone(),
                hint: hint.cloned(),
            });
            Ok(event.event_id)
        }
    }

    fn flush(&self, _timeout: Duration) -> bool {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn shutdown(&self) -> TransportResult<()> {
        self.is_shutdown.store(true, Ordering::SeqCst);
        if self.should_reset_on_shutdown {
            self.reset();
        }
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        if let Ok(mut guard) = self.timeout.lock() {
            *guard = Some(timeout);
        }
    }
}
