use crate::encoder;
use core::fmt;
use sentryhook::error::{TransportError, TransportResult};
use sentryhook::hub::Scope;
use sentryhook::protocol::Event;
use sentryhook::transport::{EventHint, Transport};
use std::io::{self, Write};
use std::sync::atomic::{self, AtomicBool};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

type Encoder = fn(&mut dyn Write, &Event<'_>) -> TransportResult<()>;

/// A transport that writes events to stdout, or any other writer, as JSON.
///
/// The hub's scope is merged into each event before it is written.
pub struct EventTransport {
    writer: Mutex<Box<dyn Write + Send>>,
    encoder: Encoder,
    is_shutdown: AtomicBool,
}

impl fmt::Debug for EventTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventTransport")
    }
}

impl Default for EventTransport {
    fn default() -> Self {
        EventTransportBuilder::default().build()
    }
}

impl EventTransport {
    /// Creates a builder.
    pub fn builder() -> EventTransportBuilder {
        EventTransportBuilder::default()
    }
}

impl Transport for EventTransport {
    /// Write the event to the configured writer
    #[allow(clippy::manual_async_fn)]
    fn send_event(
        &self,
        event: &Event<'_>,
        _hint: Option<&EventHint>,
        scope: &Scope,
    ) -> impl std::future::Future<Output = TransportResult<Uuid>> + Send {
        async move {
            if self.is_shutdown.load(atomic::Ordering::SeqCst) {
                return Err(TransportError::AlreadyShutdown);
            }
            let event = scope.apply_to_event(event.clone());
            let mut writer = self.writer.lock()?;
            (self.encoder)(&mut **writer, &event)?;
            Ok(event.event_id)
        }
    }

    fn flush(&self, _timeout: Duration) -> bool {
        match self.writer.lock() {
            Ok(mut writer) => writer.flush().is_ok(),
            Err(_) => false,
        }
    }

    fn shutdown(&self) -> TransportResult<()> {
        self.is_shutdown.store(true, atomic::Ordering::SeqCst);
        let mut writer = self.writer.lock()?;
        writer.flush()?;
        Ok(())
    }
}

/// Builder for [`EventTransport`].
pub struct EventTransportBuilder {
    writer: Option<Box<dyn Write + Send>>,
    encoder: Encoder,
}

impl fmt::Debug for EventTransportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventTransportBuilder")
    }
}

impl Default for EventTransportBuilder {
    fn default() -> Self {
        EventTransportBuilder {
            writer: None,
            encoder: encoder::compact,
        }
    }
}

impl EventTransportBuilder {
    /// Writes to `writer` instead of stdout.
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Writes indented JSON instead of one line per event.
    pub fn with_pretty_print(mut self) -> Self {
        self.encoder = encoder::pretty;
        self
    }

    /// Creates the transport.
    pub fn build(self) -> EventTransport {
        EventTransport {
            writer: Mutex::new(self.writer.unwrap_or_else(|| Box::new(io::stdout()))),
            encoder: self.encoder,
            is_shutdown: AtomicBool::new(false),
        }
    }
}
