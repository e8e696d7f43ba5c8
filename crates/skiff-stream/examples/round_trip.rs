//! End-to-end demo: chunk a random payload through a channel sink and
//! reassemble it on the receiving side.
//!
//!   RUST_LOG=debug cargo run --example round_trip

use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use bytes::Bytes;
use rand::Rng;

use skiff_core::config::SkiffConfig;
use skiff_core::envelope::{BusinessData, Header, MetaData, TaskType};
use skiff_stream::{ChannelSink, EnvelopeBuilder, Reassembler};

fn random_payload(len: usize) -> Bytes {
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect::<Vec<u8>>()
        .into()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SkiffConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        SkiffConfig::default()
    });

    // Small chunk size so the demo actually splits something.
    let chunk_size = NonZeroUsize::new(5).context("chunk size")?;
    let payload = random_payload(77);
    println!("payload: {} bytes", payload.len());

    let header = Header::new(config.identity.app_id, config.identity.session_id);
    let metadata = MetaData::new("test", "word");
    let business = BusinessData::new(TaskType::Function, r#"{"name":"test"}"#);

    let (mut sink, mut rx) = ChannelSink::new();
    let report = EnvelopeBuilder::new(chunk_size)
        .send_payload(&mut sink, &header, &metadata, &business, Some(payload.clone()))
        .await?;
    drop(sink);
    println!(
        "sent {} units ({} chunks, {} payload bytes)",
        report.units_sent, report.chunk_total, report.payload_bytes
    );

    let reassembler = Reassembler::new();
    while let Some(unit) = rx.recv().await {
        println!("  unit: {} bytes", unit.len());
        if let Some(message) = reassembler.accept(&unit)? {
            println!(
                "reassembled {} bytes for {}",
                message.payload.len(),
                message.header.msg_id
            );
            assert_eq!(message.payload, payload);
        }
    }

    Ok(())
}
