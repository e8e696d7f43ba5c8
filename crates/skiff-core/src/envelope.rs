//! Envelope data model — the descriptor types carried by every wire unit.
//!
//! One logical message is a single [`Header`] plus a sequence of [`MetaData`]
//! snapshots, one per transmitted unit. [`BusinessData`] rides only in the
//! first envelope of a message.

use serde::{Deserialize, Serialize};

use crate::identity;
use crate::wire::PROTOCOL_VERSION;

// ── Header ────────────────────────────────────────────────────────────────────

/// Identity record for one logical message.
///
/// Constructed once per send operation and reused, unmodified, across the
/// first envelope and every chunk envelope. The receiver groups units by
/// `msg_id`, so regenerating the id between chunks breaks correlation.
/// There is intentionally no API to rewrite `msg_id` on an existing header;
/// a new message gets a new `Header`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Application id, constant per deployment. Comes from configuration.
    pub app_id: String,

    /// Session id assigned by a prior handshake. Opaque to this crate.
    pub session_id: String,

    /// `app_id + "_" + identifier`. Identical on every envelope of a message.
    pub msg_id: String,

    /// Protocol version tag, fixed at construction.
    pub version: String,

    /// Creation timestamp, RFC 3339.
    pub datetime: String,
}

impl Header {
    /// Build the header for a new logical message with a fresh `msg_id`.
    pub fn new(app_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        let app_id = app_id.into();
        let msg_id = format!("{}_{}", app_id, identity::quasi_unique_id());
        Self {
            app_id,
            session_id: session_id.into(),
            msg_id,
            version: PROTOCOL_VERSION.to_string(),
            datetime: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ── MetaData ──────────────────────────────────────────────────────────────────

/// Descriptor for the unit currently being transmitted.
///
/// `length` is overloaded by position: the first envelope announces the
/// total payload length, while each chunk envelope carries its own chunk's
/// length. The sender derives one immutable snapshot per envelope via
/// [`MetaData::for_first`] and [`MetaData::for_chunk`]; nothing mutates a
/// snapshot after serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    /// Stream name, e.g. a file or image name.
    pub name: String,

    /// Content category, e.g. "word", "img", "text".
    #[serde(rename = "type")]
    pub content_type: String,

    /// Byte length of the current unit. See the type-level note.
    pub length: u64,

    /// Total chunk count. 0 means the payload is unchunked or absent.
    pub chunk_total: u32,

    /// 0 in the first envelope; `1..=chunk_total` in chunk envelopes.
    /// Equality with `chunk_total` marks the last chunk.
    pub chunk_index: u32,
}

impl MetaData {
    /// Describe a stream before any sizing is known.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            length: 0,
            chunk_total: 0,
            chunk_index: 0,
        }
    }

    /// Snapshot for the first envelope: total payload length, total chunk
    /// count, and the index-0 sentinel.
    pub fn for_first(&self, total_length: u64, chunk_total: u32) -> Self {
        Self {
            length: total_length,
            chunk_total,
            chunk_index: 0,
            ..self.clone()
        }
    }

    /// Snapshot for one chunk envelope: the chunk's own length and its
    /// 1-based index. `chunk_total` is carried over from the first snapshot.
    pub fn for_chunk(&self, chunk_index: u32, chunk_length: u64) -> Self {
        Self {
            length: chunk_length,
            chunk_index,
            ..self.clone()
        }
    }

    /// Whether this snapshot describes the final chunk of its message.
    pub fn is_last_chunk(&self) -> bool {
        self.chunk_index > 0 && self.chunk_index == self.chunk_total
    }
}

// ── BusinessData ──────────────────────────────────────────────────────────────

/// Kind of work the receiver should perform for this message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Function,
    Script,
    Subscription,
}

/// Task descriptor. Present only in the first envelope; chunk envelopes
/// never repeat it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessData {
    /// Task execution kind.
    pub task_type: TaskType,

    /// Pre-serialized task parameters. Structure is task-specific; this
    /// crate treats it as opaque.
    pub task_params: String,
}

impl BusinessData {
    pub fn new(task_type: TaskType, task_params: impl Into<String>) -> Self {
        Self {
            task_type,
            task_params: task_params.into(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
