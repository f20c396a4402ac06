//! Time-ordered note identifiers.
//!
//! # Responsibility
//! - Issue ULIDs whose sortable prefix is the creation millisecond.
//! - Keep ids strictly increasing for one generator, even when the clock
//!   does not advance between calls.
//!
//! # Invariants
//! - The generator never reads the ambient clock or entropy; callers pass
//!   both, which keeps id sequences reproducible in tests.
//! - Cross-process uniqueness relies on the 80 random bits only.

use chrono::{DateTime, Utc};
use rand::RngCore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use ulid::Ulid;

/// Length of the canonical ULID text form.
pub const NOTE_ID_LEN: usize = 26;

const MAX_TIMESTAMP_MS: u64 = (1 << 48) - 1;

/// Error raised when the monotonic suffix cannot be incremented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// 80-bit random suffix exhausted within one millisecond.
    MonotonicOverflow { timestamp_ms: u64 },
}

impl Display for IdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonotonicOverflow { timestamp_ms } => write!(
                f,
                "cannot issue another id for millisecond {timestamp_ms}: random suffix exhausted"
            ),
        }
    }
}

impl Error for IdError {}

/// Monotonic ULID generator.
///
/// Holds only the last issued id. A call whose timestamp is not newer than
/// the last one reuses that millisecond and increments the previous id, so
/// ordering by id text matches issue order.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: Option<Ulid>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next id for `now` using `rng` for fresh randomness.
    ///
    /// # Errors
    /// - Returns [`IdError::MonotonicOverflow`] when 2^80 ids were already
    ///   issued for the same millisecond.
    pub fn generate<R>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Result<String, IdError>
    where
        R: RngCore + ?Sized,
    {
        let timestamp_ms = clamp_timestamp(now);

        let next = match self.last {
            Some(last) if timestamp_ms <= last.timestamp_ms() => {
                last.increment().ok_or(IdError::MonotonicOverflow {
                    timestamp_ms: last.timestamp_ms(),
                })?
            }
            _ => Ulid::from_parts(timestamp_ms, random_suffix(rng)),
        };

        self.last = Some(next);
        Ok(next.to_string())
    }
}

/// Returns whether `value` is a canonical 26-character ULID.
///
/// Accepts Crockford base32 in either case. Rejects values whose first
/// character would overflow 128 bits.
pub fn is_valid_note_id(value: &str) -> bool {
    if value.len() != NOTE_ID_LEN {
        return false;
    }
    match value.as_bytes().first() {
        Some(b'0'..=b'7') => {}
        _ => return false,
    }
    Ulid::from_string(&value.to_ascii_uppercase()).is_ok()
}

/// Millisecond timestamp embedded in an id, when the id is well formed.
pub fn id_timestamp_ms(value: &str) -> Option<u64> {
    if !is_valid_note_id(value) {
        return None;
    }
    Ulid::from_string(&value.to_ascii_uppercase())
        .ok()
        .map(|id| id.timestamp_ms())
}

fn clamp_timestamp(now: DateTime<Utc>) -> u64 {
    let millis = now.timestamp_millis();
    if millis <= 0 {
        0
    } else {
        (millis as u64).min(MAX_TIMESTAMP_MS)
    }
}

fn random_suffix<R: RngCore + ?Sized>(rng: &mut R) -> u128 {
    let high = u128::from(rng.next_u64());
    let low = u128::from(rng.next_u32() & 0xFFFF);
    (high << 16) | low
}
