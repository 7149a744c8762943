// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The 64-bit NTP timestamp and its conversions.
//!
//! The high 32 bits count whole seconds since 1900-01-01T00:00:00Z and the low
//! 32 bits are a binary fraction of a second (units of 2^-32 s, about 233 ps).
//!
//! ```ignore
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            Seconds                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            Fraction                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Utc};

use crate::difference::TimestampDifference;
use crate::error::{ParseError, TimeError};

/// The number of seconds from 1st January 1900 UTC to the start of the Unix epoch.
pub const EPOCH_DELTA: i64 = 2_208_988_800;

/// The number of seconds in one NTP era (2^32 seconds, approximately 136 years).
pub const ERA_SECONDS: i64 = 1 << 32;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Scale a sub-second nanosecond count into 2^-32 s units, truncating.
fn fraction_from_nanos(nanos: u32) -> u64 {
    // chrono reports a leap second as nanos >= 1e9.
    let nanos = u64::from(nanos).min(NANOS_PER_SEC - 1);
    (nanos << 32) / NANOS_PER_SEC
}

/// Scale a 2^-32 s fraction back into nanoseconds, truncating.
pub(crate) fn nanos_from_fraction(fraction: u64) -> u64 {
    (fraction * NANOS_PER_SEC) >> 32
}

/// An NTP timestamp: unsigned 32.32 fixed-point seconds since the NTP epoch.
///
/// Ordering compares the combined 64-bit value. The all-zero value means
/// "unset" on the wire, see [`Timestamp::is_valid`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The all-zero (unset) timestamp.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Wrap a raw 32.32 fixed-point value.
    pub const fn from_bits(bits: u64) -> Self {
        Timestamp(bits)
    }

    /// Build a timestamp from its seconds and fraction halves.
    pub const fn from_parts(seconds: u32, fraction: u32) -> Self {
        Timestamp(((seconds as u64) << 32) | fraction as u64)
    }

    /// The raw 32.32 fixed-point value.
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Whole seconds since 1900-01-01T00:00:00Z.
    pub const fn seconds(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Binary fraction of a second.
    pub const fn fraction(self) -> u32 {
        self.0 as u32
    }

    /// Whether the timestamp carries a value (is non-zero).
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Convert a UTC date-time into an era-0 NTP timestamp.
    ///
    /// Fails for date-times before 1900 or after 2036-02-07T06:28:15Z.
    pub fn from_date_time(t: DateTime<Utc>) -> Result<Self, TimeError> {
        let seconds = t.timestamp() + EPOCH_DELTA;
        if seconds < 0 {
            return Err(TimeError::BeforeNtpEpoch);
        }
        let seconds = u32::try_from(seconds).map_err(|_| TimeError::BeyondEra { seconds })?;
        let fraction = fraction_from_nanos(t.timestamp_subsec_nanos());
        Ok(Timestamp((u64::from(seconds) << 32) | fraction))
    }

    /// The current system time with its least-significant byte randomized.
    ///
    /// XOR cannot carry, so only the low 8 fraction bits (about 60 ns) change.
    /// Past era 0 the seconds field wraps modulo 2^32, as it does on the wire.
    pub fn now() -> Self {
        let t = Utc::now();
        let seconds = ((t.timestamp() + EPOCH_DELTA) as u64) & 0xFFFF_FFFF;
        let bits = (seconds << 32) | fraction_from_nanos(t.timestamp_subsec_nanos());
        Timestamp(bits ^ u64::from(rand::random::<u8>()))
    }

    /// Decode the 8 big-endian bytes starting at `offset`.
    pub fn from_wire_bytes(buf: &[u8], offset: usize) -> Result<Self, ParseError> {
        let end = offset.saturating_add(8);
        if buf.len() < end {
            return Err(ParseError::BufferTooShort {
                needed: end,
                available: buf.len(),
            });
        }
        Ok(Timestamp(BigEndian::read_u64(&buf[offset..end])))
    }

    /// Encode as 32-bit big-endian seconds followed by 32-bit big-endian fraction.
    pub fn to_bytes(self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        BigEndian::write_u64(&mut bytes, self.0);
        bytes
    }

    /// Convert to a UTC date-time, truncating to whole nanoseconds.
    pub fn to_date_time(self) -> DateTime<Utc> {
        let secs = i64::from(self.seconds()) - EPOCH_DELTA;
        let nanos = nanos_from_fraction(u64::from(self.fraction())) as i64;
        // Era 0 spans roughly +/-2.2e18 ns around 1970, inside i64.
        DateTime::from_timestamp_nanos(secs * NANOS_PER_SEC as i64 + nanos)
    }

    /// Whole seconds since the Unix epoch.
    pub fn to_unix_seconds(self) -> Result<u64, TimeError> {
        let secs = i64::from(self.seconds()) - EPOCH_DELTA;
        u64::try_from(secs).map_err(|_| TimeError::BeforeUnixEpoch)
    }

    /// Sub-second part in microseconds, `0..=999_999`.
    pub fn microsecond(self) -> u32 {
        ((u64::from(self.fraction()) * 1_000_000) >> 32) as u32
    }

    /// Add a signed difference, failing if the result leaves the `u64` range.
    pub fn checked_add(self, diff: TimestampDifference) -> Result<Self, TimeError> {
        self.0
            .checked_add_signed(diff.to_bits())
            .map(Timestamp)
            .ok_or(TimeError::Overflow)
    }

    /// Subtract a signed difference, failing if the result leaves the `u64` range.
    pub fn checked_sub(self, diff: TimestampDifference) -> Result<Self, TimeError> {
        let bits = diff.to_bits();
        let result = if bits >= 0 {
            self.0.checked_sub(bits as u64)
        } else {
            self.0.checked_add(bits.unsigned_abs())
        };
        result.map(Timestamp).ok_or(TimeError::Overflow)
    }

    /// `self - other` as a two's-complement wrapping difference.
    pub fn difference(self, other: Timestamp) -> TimestampDifference {
        TimestampDifference::from_bits(self.0.wrapping_sub(other.0) as i64)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08x}", self.seconds(), self.fraction())
    }
}
