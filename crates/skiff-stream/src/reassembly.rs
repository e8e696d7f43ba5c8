//! Receiver-side reassembly — the dual of the send pipeline.
//!
//! A transport delivers units in send order; this module groups them by
//! `msg_id`, enforces the chunk sequence, and yields the original payload
//! when the terminal chunk arrives. Messages from different senders may
//! interleave on one transport; each assembles independently under its own
//! `msg_id`.

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use dashmap::DashMap;

use skiff_core::envelope::{BusinessData, Header, MetaData};
use skiff_core::wire::{self, ChunkEnvelope, FirstEnvelope, WireError};

use crate::sink::WireUnit;

/// Age after which an assembly that never completed is discarded. A sender
/// that failed mid-sequence never transmits the terminal chunk, so the
/// receiver has to give up on its own clock.
pub const ASSEMBLY_TIMEOUT: Duration = Duration::from_secs(300);

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ReassemblyError {
    #[error("malformed unit: {0}")]
    Wire(#[from] WireError),

    /// A chunk arrived for a `msg_id` with no open assembly. Either the
    /// first envelope was never seen or the assembly already timed out.
    #[error("chunk for unknown msg_id {msg_id}")]
    UnknownMessage { msg_id: String },

    /// The chunk index is not the next expected one. Ordered transports
    /// never recover from this, so the assembly is dropped.
    #[error("msg_id {msg_id}: expected chunk {expected}, received {received}")]
    OutOfSequence {
        msg_id: String,
        expected: u32,
        received: u32,
    },

    /// The terminal chunk arrived but the accumulated bytes disagree with
    /// the total the first envelope announced.
    #[error("msg_id {msg_id}: first envelope announced {announced} bytes, assembled {assembled}")]
    TotalLengthMismatch {
        msg_id: String,
        announced: u64,
        assembled: u64,
    },
}

// ── Completed messages ────────────────────────────────────────────────────────

/// A fully reassembled logical message.
#[derive(Debug, Clone)]
pub struct CompletedMessage {
    pub header: Header,
    /// The first envelope's metadata snapshot (total length, chunk count).
    pub metadata: MetaData,
    pub business: BusinessData,
    pub payload: Bytes,
}

// ── Reassembler ───────────────────────────────────────────────────────────────

struct Assembly {
    first: FirstEnvelope,
    buffer: BytesMut,
    next_index: u32,
    started_at: Instant,
}

/// Tracks in-flight messages and reassembles their payloads.
pub struct Reassembler {
    active: DashMap<String, Assembly>,
    timeout: Duration,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::with_timeout(ASSEMBLY_TIMEOUT)
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            active: DashMap::new(),
            timeout,
        }
    }

    /// Route one wire unit to the right handler.
    ///
    /// Returns the completed message when the unit finishes one: either the
    /// terminal chunk of a chunked message, or a dataless first envelope.
    pub fn accept(&self, unit: &WireUnit) -> Result<Option<CompletedMessage>, ReassemblyError> {
        match unit {
            WireUnit::Text(text) => self.accept_first(wire::decode_first(text)?),
            WireUnit::Binary(bytes) => self.accept_chunk(wire::decode_chunk(bytes)?),
        }
    }

    /// Open an assembly for a first envelope.
    ///
    /// A dataless message (`chunkTotal = 0`) completes immediately; no
    /// assembly is opened because no chunk will ever follow.
    pub fn accept_first(
        &self,
        first: FirstEnvelope,
    ) -> Result<Option<CompletedMessage>, ReassemblyError> {
        self.sweep_stale();

        if first.meta_data.chunk_total == 0 {
            return Ok(Some(CompletedMessage {
                header: first.header,
                metadata: first.meta_data,
                business: first.business_data,
                payload: Bytes::new(),
            }));
        }

        let msg_id = first.header.msg_id.clone();
        let capacity = first.meta_data.length as usize;
        let prior = self.active.insert(
            msg_id.clone(),
            Assembly {
                first,
                buffer: BytesMut::with_capacity(capacity),
                next_index: 1,
                started_at: Instant::now(),
            },
        );
        if prior.is_some() {
            tracing::warn!(msg_id = %msg_id, "replacing incomplete assembly for reused msg_id");
        }
        Ok(None)
    }

    /// Append one chunk envelope to its assembly.
    pub fn accept_chunk(
        &self,
        envelope: ChunkEnvelope,
    ) -> Result<Option<CompletedMessage>, ReassemblyError> {
        let msg_id = envelope.descriptor.header.msg_id.clone();

        // The entry is removed while worked on and re-inserted only if the
        // message is still incomplete, so a broken sequence leaves no
        // half-poisoned state behind.
        let Some((_, mut assembly)) = self.active.remove(&msg_id) else {
            return Err(ReassemblyError::UnknownMessage { msg_id });
        };

        let received = envelope.descriptor.meta_data.chunk_index;
        if received != assembly.next_index {
            let expected = assembly.next_index;
            tracing::warn!(msg_id = %msg_id, expected, received, "chunk sequence broken, dropping assembly");
            return Err(ReassemblyError::OutOfSequence {
                msg_id,
                expected,
                received,
            });
        }

        assembly.buffer.extend_from_slice(&envelope.chunk);
        assembly.next_index += 1;

        let chunk_total = assembly.first.meta_data.chunk_total;
        if received < chunk_total {
            self.active.insert(msg_id, assembly);
            return Ok(None);
        }

        let announced = assembly.first.meta_data.length;
        let assembled = assembly.buffer.len() as u64;
        if assembled != announced {
            return Err(ReassemblyError::TotalLengthMismatch {
                msg_id,
                announced,
                assembled,
            });
        }

        tracing::info!(
            msg_id = %msg_id,
            bytes = assembled,
            chunks = chunk_total,
            "message reassembled"
        );

        let FirstEnvelope {
            header,
            meta_data,
            business_data,
        } = assembly.first;
        Ok(Some(CompletedMessage {
            header,
            metadata: meta_data,
            business: business_data,
            payload: assembly.buffer.freeze(),
        }))
    }

    /// Discard assemblies older than the timeout. Runs on every new first
    /// envelope; callers with long-lived receivers may also invoke it
    /// periodically.
    pub fn sweep_stale(&self) {
        self.active.retain(|msg_id, assembly| {
            let stale = assembly.started_at.elapsed() > self.timeout;
            if stale {
                tracing::warn!(msg_id = %msg_id, "removing stale assembly (timed out)");
            }
            !stale
        });
    }

    /// Number of messages currently mid-assembly.
    pub fn in_progress(&self) -> usize {
        self.active.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
