//! Payload splitting — bounded, ordered, zero-copy chunks.

use std::num::NonZeroUsize;

use bytes::Bytes;

/// Split `payload` into contiguous slices of at most `chunk_size` bytes.
///
/// An empty payload yields no chunks. A payload that fits `chunk_size`
/// yields a single chunk holding the whole payload. Anything larger yields
/// `ceil(len / chunk_size)` slices in payload order, each `chunk_size` long
/// except possibly the last. Slices share the payload's buffer; the input
/// is never copied or mutated, so splitting is deterministic and
/// restartable.
pub fn split(payload: &Bytes, chunk_size: NonZeroUsize) -> Vec<Bytes> {
    if payload.is_empty() {
        return Vec::new();
    }
    let chunk_size = chunk_size.get();
    let count = payload.len().div_ceil(chunk_size);
    let mut chunks = Vec::with_capacity(count);
    for start in (0..payload.len()).step_by(chunk_size) {
        let end = usize::min(start + chunk_size, payload.len());
        chunks.push(payload.slice(start..end));
    }
    chunks
}
