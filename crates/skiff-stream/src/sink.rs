//! Transport sink — the single capability Skiff needs from a transport.
//!
//! The protocol never opens sockets, reconnects, or applies backpressure;
//! it hands finished units to a sink and expects ordered, no-silent-drop
//! delivery. Everything else (retries, flow control, acknowledgement) is
//! the transport's problem.

use bytes::Bytes;
use tokio::sync::mpsc;

/// One transmitted unit. The first envelope of a message goes out as text;
/// chunk envelopes go out as binary (descriptor + delimiter + raw bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireUnit {
    Text(String),
    Binary(Bytes),
}

impl WireUnit {
    /// Size of the unit in bytes as it crosses the transport.
    pub fn len(&self) -> usize {
        match self {
            WireUnit::Text(text) => text.len(),
            WireUnit::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered, fire-and-forget delivery of wire units.
///
/// Implementations must deliver units to the remote end in the order `send`
/// resolves. An error means the unit was not delivered; this crate never
/// retries an individual unit (the retry granularity, if any, is a whole
/// logical message under a fresh `msg_id`).
#[allow(async_fn_in_trait)]
pub trait TransportSink {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn send(&mut self, unit: WireUnit) -> Result<(), Self::Error>;
}

// ── Channel sink ──────────────────────────────────────────────────────────────

/// Sink backed by an unbounded tokio channel.
///
/// Stands in for a real transport in tests and demos, and wires the sender
/// to an in-process consumer. The channel preserves send order, which is
/// all the protocol asks of it.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<WireUnit>,
}

/// The receiving half of a [`ChannelSink`] was dropped.
#[derive(Debug, thiserror::Error)]
#[error("channel sink closed: receiver dropped")]
pub struct ChannelClosed;

impl ChannelSink {
    /// Create a sink together with the receiver it feeds.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WireUnit>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TransportSink for ChannelSink {
    type Error = ChannelClosed;

    async fn send(&mut self, unit: WireUnit) -> Result<(), ChannelClosed> {
        self.tx.send(unit).map_err(|_| ChannelClosed)
    }
}
