//! Skiff wire format — envelope framing for message-oriented transports.
//!
//! Every logical message opens with a self-contained UTF-8 JSON text unit
//! (the first envelope) and continues with zero or more binary chunk units.
//! A chunk unit is the JSON chunk descriptor, one delimiter byte, then
//! exactly `metaData.length` raw payload bytes. There is no trailing
//! delimiter or length prefix: the chunk boundary is known from the
//! descriptor plus transport framing (one send = one unit).

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::envelope::{BusinessData, Header, MetaData};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Envelope schema revision carried in every header. Free-form string;
/// cross-version compatibility is the receiver's concern.
pub const PROTOCOL_VERSION: &str = "v1.0.0";

/// Single byte separating a chunk descriptor from its raw payload bytes.
pub const DELIMITER: u8 = b'|';

/// Default split threshold: 512 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;

// ── Envelope bodies ───────────────────────────────────────────────────────────

/// Body of the first unit of a logical message. Announces the total payload
/// length and chunk count, and carries the business data; never carries
/// chunk bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstEnvelope {
    pub header: Header,
    #[serde(rename = "metaData")]
    pub meta_data: MetaData,
    #[serde(rename = "businessData")]
    pub business_data: BusinessData,
}

/// Descriptor half of a chunk unit. The raw chunk bytes follow the
/// delimiter on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    pub header: Header,
    #[serde(rename = "metaData")]
    pub meta_data: MetaData,
}

/// A decoded chunk unit: descriptor plus the raw bytes that followed it.
#[derive(Debug, Clone)]
pub struct ChunkEnvelope {
    pub descriptor: ChunkDescriptor,
    pub chunk: Bytes,
}

// Borrowed mirrors so encoding never clones the header shared across a
// message's envelopes.
#[derive(Serialize)]
struct FirstEnvelopeRef<'a> {
    header: &'a Header,
    #[serde(rename = "metaData")]
    meta_data: &'a MetaData,
    #[serde(rename = "businessData")]
    business_data: &'a BusinessData,
}

#[derive(Serialize)]
struct ChunkDescriptorRef<'a> {
    header: &'a Header,
    #[serde(rename = "metaData")]
    meta_data: &'a MetaData,
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Serialize a first envelope to its UTF-8 text unit.
pub fn encode_first(
    header: &Header,
    meta_data: &MetaData,
    business_data: &BusinessData,
) -> Result<String, WireError> {
    serde_json::to_string(&FirstEnvelopeRef {
        header,
        meta_data,
        business_data,
    })
    .map_err(WireError::Serialize)
}

/// Serialize a chunk envelope: descriptor, delimiter, raw chunk bytes.
///
/// `meta_data.length` must equal `chunk.len()`; the descriptor is the only
/// record of the chunk boundary a receiver gets.
pub fn encode_chunk(
    header: &Header,
    meta_data: &MetaData,
    chunk: &[u8],
) -> Result<Bytes, WireError> {
    let descriptor = serde_json::to_vec(&ChunkDescriptorRef { header, meta_data })
        .map_err(WireError::Serialize)?;
    let mut unit = BytesMut::with_capacity(descriptor.len() + 1 + chunk.len());
    unit.extend_from_slice(&descriptor);
    unit.put_u8(DELIMITER);
    unit.extend_from_slice(chunk);
    Ok(unit.freeze())
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Parse a first envelope from a text unit.
pub fn decode_first(text: &str) -> Result<FirstEnvelope, WireError> {
    serde_json::from_str(text).map_err(WireError::Descriptor)
}

/// Parse a chunk unit into its descriptor and raw bytes.
///
/// The descriptor is read as one complete JSON value from the front of the
/// unit, so a delimiter byte inside a JSON string (say, a file named
/// `a|b.bin`) never splits the unit in the wrong place. The byte after the
/// descriptor must be the delimiter, and the remainder must be exactly the
/// length the descriptor announces.
pub fn decode_chunk(unit: &Bytes) -> Result<ChunkEnvelope, WireError> {
    let mut stream = serde_json::Deserializer::from_slice(unit).into_iter::<ChunkDescriptor>();
    let descriptor = match stream.next() {
        Some(Ok(descriptor)) => descriptor,
        Some(Err(e)) => return Err(WireError::Descriptor(e)),
        None => return Err(WireError::EmptyUnit),
    };
    let offset = stream.byte_offset();

    match unit.get(offset) {
        Some(&DELIMITER) => {}
        _ => return Err(WireError::MissingDelimiter),
    }

    let chunk = unit.slice(offset + 1..);
    let announced = descriptor.meta_data.length;
    if chunk.len() as u64 != announced {
        return Err(WireError::ChunkLengthMismatch {
            announced,
            actual: chunk.len() as u64,
        });
    }

    Ok(ChunkEnvelope { descriptor, chunk })
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when encoding or interpreting wire units.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("envelope serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("envelope descriptor is not valid JSON: {0}")]
    Descriptor(#[source] serde_json::Error),

    #[error("unit is empty")]
    EmptyUnit,

    #[error("no delimiter after chunk descriptor")]
    MissingDelimiter,

    #[error("chunk length mismatch: descriptor announces {announced} bytes, unit carries {actual}")]
    ChunkLengthMismatch { announced: u64, actual: u64 },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
