//! Sequencing and round-trip laws: chunk counts, index order, and payload
//! reconstruction through the reassembler.

use crate::*;

use skiff_core::wire::{decode_chunk, decode_first};
use skiff_stream::Reassembler;

/// 12 bytes at chunk size 5 → chunks [5, 5, 2], indexes 0, 1, 2, 3 in
/// emission order.
#[tokio::test]
async fn example_a_twelve_bytes_chunk_five() -> Result<()> {
    let (units, _) = emit(5, Some(Bytes::from_static(b"abcdefghijkl"))).await?;
    assert_eq!(units.len(), 4);

    let mut indexes = Vec::new();
    let mut lengths = Vec::new();
    for unit in &units {
        match unit {
            WireUnit::Text(text) => {
                let first = decode_first(text)?;
                indexes.push(first.meta_data.chunk_index);
                assert_eq!(first.meta_data.chunk_total, 3);
                assert_eq!(first.meta_data.length, 12);
            }
            WireUnit::Binary(bytes) => {
                let envelope = decode_chunk(bytes)?;
                indexes.push(envelope.descriptor.meta_data.chunk_index);
                lengths.push(envelope.chunk.len());
            }
        }
    }
    assert_eq!(indexes, vec![0, 1, 2, 3]);
    assert_eq!(lengths, vec![5, 5, 2]);
    Ok(())
}

/// Absent payload → exactly one envelope, chunkTotal 0, chunkIndex 0, no
/// chunk envelopes.
#[tokio::test]
async fn example_b_absent_payload() -> Result<()> {
    let (units, _) = emit(5, None).await?;
    assert_eq!(units.len(), 1);

    let WireUnit::Text(text) = &units[0] else {
        panic!("expected text frame");
    };
    let first = decode_first(text)?;
    assert_eq!(first.meta_data.chunk_total, 0);
    assert_eq!(first.meta_data.chunk_index, 0);
    assert_eq!(first.meta_data.length, 0);
    Ok(())
}

/// Payload length equal to the chunk size → one chunk envelope with
/// chunkTotal 1, chunkIndex 1, chunk length 5.
#[tokio::test]
async fn example_c_payload_equals_chunk_size() -> Result<()> {
    let (units, _) = emit(5, Some(Bytes::from_static(b"12345"))).await?;
    assert_eq!(units.len(), 2);

    let WireUnit::Binary(bytes) = &units[1] else {
        panic!("expected binary frame");
    };
    let envelope = decode_chunk(bytes)?;
    assert_eq!(envelope.descriptor.meta_data.chunk_total, 1);
    assert_eq!(envelope.descriptor.meta_data.chunk_index, 1);
    assert_eq!(envelope.chunk.len(), 5);
    Ok(())
}

/// Chunk lengths always sum to the total the first envelope announces.
#[tokio::test]
async fn chunk_lengths_sum_to_total() -> Result<()> {
    for (len, size) in [(0usize, 5usize), (1, 5), (5, 5), (12, 5), (64, 7), (100, 9)] {
        let payload: Bytes = vec![0xA5u8; len].into();
        let (units, _) = emit(size, Some(payload)).await?;

        let WireUnit::Text(text) = &units[0] else {
            panic!("expected text frame");
        };
        let announced = decode_first(text)?.meta_data.length;

        let mut sum = 0u64;
        for unit in &units[1..] {
            let WireUnit::Binary(bytes) = unit else {
                panic!("expected binary frame");
            };
            sum += decode_chunk(bytes)?.chunk.len() as u64;
        }
        assert_eq!(sum, announced, "len={len} size={size}");
        assert_eq!(sum, len as u64);
    }
    Ok(())
}

/// Full round trip: what the sender emits, the receiver reassembles into
/// the original payload, byte for byte.
#[tokio::test]
async fn round_trip_law() -> Result<()> {
    // 8 KiB of varied bytes across an uneven chunk size.
    let payload: Bytes = (0..8192u32).map(|i| (i * 31 % 251) as u8).collect::<Vec<_>>().into();
    let (units, header) = emit(733, Some(payload.clone())).await?;

    let reassembler = Reassembler::new();
    let mut completed = None;
    for unit in &units {
        if let Some(message) = reassembler.accept(unit)? {
            completed = Some(message);
        }
    }

    let message = completed.expect("message should complete");
    assert_eq!(message.header.msg_id, header.msg_id);
    assert_eq!(message.payload, payload);
    assert_eq!(message.metadata.length, payload.len() as u64);
    Ok(())
}

/// Two messages interleaved on one transport reassemble independently,
/// keyed by msg_id.
#[tokio::test]
async fn interleaved_messages_round_trip() -> Result<()> {
    let payload_a = Bytes::from_static(b"payload of the first logical message");
    let payload_b = Bytes::from_static(b"and the second");
    let (units_a, header_a) = emit(9, Some(payload_a.clone())).await?;
    let (units_b, header_b) = emit(9, Some(payload_b.clone())).await?;

    let reassembler = Reassembler::new();
    let mut done = Vec::new();
    let (mut a, mut b) = (units_a.iter(), units_b.iter());
    loop {
        let pair = [a.next(), b.next()];
        if pair.iter().all(Option::is_none) {
            break;
        }
        for unit in pair.into_iter().flatten() {
            if let Some(message) = reassembler.accept(unit)? {
                done.push(message);
            }
        }
    }

    assert_eq!(done.len(), 2);
    for message in done {
        if message.header.msg_id == header_a.msg_id {
            assert_eq!(message.payload, payload_a);
        } else {
            assert_eq!(message.header.msg_id, header_b.msg_id);
            assert_eq!(message.payload, payload_b);
        }
    }
    Ok(())
}
