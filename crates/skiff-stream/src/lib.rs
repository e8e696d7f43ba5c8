//! skiff-stream — payload splitting, envelope emission, and reassembly.
//!
//! The send half turns one logical message into an ordered sequence of wire
//! units handed to a [`sink::TransportSink`]. The receive half is the dual:
//! it groups arriving units by `msg_id` and yields the original payload.

pub mod reassembly;
pub mod send;
pub mod sink;
pub mod split;

pub use reassembly::{CompletedMessage, Reassembler};
pub use send::{EnvelopeBuilder, SendError, SendReport};
pub use sink::{ChannelSink, TransportSink, WireUnit};
