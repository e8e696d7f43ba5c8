//! Quasi-unique message identifiers.
//!
//! An identifier combines a random 12-digit value with the current
//! Unix-millisecond clock and re-encodes the result in base-36. Collisions
//! are statistically unlikely but never enforced against: the id exists to
//! correlate the envelopes of one message, not to resist an adversary.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// Shifts the random digits left past the 13-digit millisecond clock, so the
// combined value reads as random digits followed by the timestamp.
const CLOCK_SHIFT: u128 = 10_000_000_000_000;

/// Generate a fresh identifier from the thread RNG and the system clock.
///
/// The random component carries 12 digits so ids minted within the same
/// millisecond still have a large enough space not to collide in practice.
pub fn quasi_unique_id() -> String {
    let frac: u64 = rand::thread_rng().gen_range(0..1_000_000_000_000);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    to_base36(frac as u128 * CLOCK_SHIFT + millis)
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}
