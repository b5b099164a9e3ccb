//! In-memory transport for testing purpose.

mod in_memory;

pub use in_memory::{CapturedEvent, InMemoryTransport, InMemoryTransportBuilder};
