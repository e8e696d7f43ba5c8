//! Send orchestration — one logical message into an ordered envelope
//! sequence.
//!
//! [`EnvelopeBuilder::send_payload`] is the whole sender contract: split the
//! payload, emit the first envelope, then emit each chunk envelope in
//! ascending index order through the sink, awaiting each send before the
//! next is issued.

use std::num::NonZeroUsize;

use bytes::Bytes;

use skiff_core::envelope::{BusinessData, Header, MetaData};
use skiff_core::wire::{self, WireError, DEFAULT_CHUNK_SIZE};

use crate::sink::{TransportSink, WireUnit};
use crate::split;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure modes of one send operation.
#[derive(Debug, thiserror::Error)]
pub enum SendError<E: std::error::Error + 'static> {
    /// An envelope could not be serialized. Every unit is encoded before
    /// the first `send`, so nothing was transmitted; the caller may fix the
    /// inputs and retry the whole message.
    #[error("envelope serialization failed: {0}")]
    Serialization(#[from] WireError),

    /// The sink rejected a unit. Units before `index` were already issued;
    /// the message is left partially delivered and is not retried here.
    /// The retry unit, if any, is the whole message under a fresh `msg_id`.
    #[error("transport sink failed on envelope {index}: {source}")]
    Sink {
        index: u32,
        #[source]
        source: E,
    },
}

/// Summary of a completed send operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    /// Total payload bytes announced by the first envelope.
    pub payload_bytes: u64,
    /// Chunk envelopes emitted. 0 for a dataless message.
    pub chunk_total: u32,
    /// Units handed to the sink. Always `chunk_total + 1`.
    pub units_sent: u32,
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Orchestrates logical sends over any [`TransportSink`].
///
/// Holds only the split threshold; headers, metadata, and sinks are passed
/// per call so one builder can serve many messages and transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeBuilder {
    chunk_size: NonZeroUsize,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        // DEFAULT_CHUNK_SIZE is a non-zero constant.
        Self::new(NonZeroUsize::new(DEFAULT_CHUNK_SIZE).unwrap())
    }
}

impl EnvelopeBuilder {
    pub fn new(chunk_size: NonZeroUsize) -> Self {
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Send one logical message.
    ///
    /// Emits exactly `N + 1` units for an `N`-chunk payload: the first
    /// envelope (total length, chunk count, business data), then each chunk
    /// envelope with `chunkIndex` running `1..=N`. A dataless message is a
    /// single first envelope with `chunkTotal = 0`.
    ///
    /// All units are encoded up front, so a serialization failure leaves
    /// nothing in flight. Chunk emission is strictly sequential; a sink
    /// failure stops the sequence and surfaces the failing unit's index.
    pub async fn send_payload<S: TransportSink>(
        &self,
        sink: &mut S,
        header: &Header,
        metadata: &MetaData,
        business: &BusinessData,
        payload: Option<Bytes>,
    ) -> Result<SendReport, SendError<S::Error>> {
        let payload = payload.unwrap_or_default();
        let total = payload.len() as u64;
        let chunks = split::split(&payload, self.chunk_size);
        let chunk_total = chunks.len() as u32;

        let mut units = Vec::with_capacity(chunks.len() + 1);
        let first_meta = metadata.for_first(total, chunk_total);
        units.push(WireUnit::Text(wire::encode_first(
            header,
            &first_meta,
            business,
        )?));
        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_meta = first_meta.for_chunk(i as u32 + 1, chunk.len() as u64);
            units.push(WireUnit::Binary(wire::encode_chunk(
                header,
                &chunk_meta,
                chunk,
            )?));
        }

        for (index, unit) in units.into_iter().enumerate() {
            let index = index as u32;
            let bytes = unit.len();
            sink.send(unit)
                .await
                .map_err(|source| SendError::Sink { index, source })?;
            tracing::debug!(msg_id = %header.msg_id, index, bytes, "envelope sent");
        }

        tracing::info!(
            msg_id = %header.msg_id,
            payload_bytes = total,
            chunks = chunk_total,
            "payload sent"
        );

        Ok(SendReport {
            payload_bytes: total,
            chunk_total,
            units_sent: chunk_total + 1,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
