// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::TimeDelta;

use crate::error::TimeError;
use crate::timestamp::nanos_from_fraction;

const FRACTION_MASK: u64 = 0xFFFF_FFFF;

/// Signed difference between two [`Timestamp`](crate::Timestamp)s.
///
/// Stored as a two's-complement 32.32 fixed-point value, covering about
/// +/-68 years at sub-nanosecond resolution.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimestampDifference(i64);

impl TimestampDifference {
    /// A zero-length difference.
    pub const ZERO: TimestampDifference = TimestampDifference(0);

    /// Wrap a raw signed 32.32 fixed-point value.
    pub const fn from_bits(bits: i64) -> Self {
        TimestampDifference(bits)
    }

    /// The raw signed 32.32 fixed-point value.
    pub const fn to_bits(self) -> i64 {
        self.0
    }

    /// Sum of two differences, failing on signed 64-bit overflow.
    pub fn checked_add(self, other: TimestampDifference) -> Result<Self, TimeError> {
        self.0
            .checked_add(other.0)
            .map(TimestampDifference)
            .ok_or(TimeError::Overflow)
    }

    /// `self - other`, failing on signed 64-bit overflow.
    pub fn checked_sub(self, other: TimestampDifference) -> Result<Self, TimeError> {
        self.0
            .checked_sub(other.0)
            .map(TimestampDifference)
            .ok_or(TimeError::Overflow)
    }

    /// Divide by two, rounding toward zero.
    pub const fn halve(self) -> Self {
        TimestampDifference(self.0 / 2)
    }

    /// Flip the sign. Only `i64::MIN` has no negation.
    pub fn negate(self) -> Result<Self, TimeError> {
        self.0
            .checked_neg()
            .map(TimestampDifference)
            .ok_or(TimeError::Overflow)
    }

    /// Convert to a chrono duration, truncating toward zero at nanosecond resolution.
    pub fn to_duration(self) -> TimeDelta {
        let magnitude = self.0.unsigned_abs();
        let secs = (magnitude >> 32) as i64;
        let nanos = nanos_from_fraction(magnitude & FRACTION_MASK) as i64;
        // |secs| <= 2^31, so the nanosecond total stays inside i64.
        let total = secs * 1_000_000_000 + nanos;
        TimeDelta::nanoseconds(if self.0 < 0 { -total } else { total })
    }

    /// The difference in (fractional) seconds.
    pub fn total_seconds(self) -> f64 {
        self.0 as f64 / (1u64 << 32) as f64
    }

    /// Signed sub-second part in microseconds, `-999_999..=999_999`.
    pub fn microsecond(self) -> i32 {
        let fraction = self.0.unsigned_abs() & FRACTION_MASK;
        let micros = ((fraction * 1_000_000) >> 32) as i32;
        if self.0 < 0 { -micros } else { micros }
    }
}

impl fmt::Display for TimestampDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.9}s", self.total_seconds())
    }
}
