// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for packet decoding and timestamp arithmetic.
//!
//! Both types implement [`std::error::Error`] and convert into [`std::io::Error`]
//! so callers working on `io::Result` can propagate them with `?` and downcast
//! back to the original value.

use std::fmt;
use std::io;

/// Errors raised while decoding or packing the fixed NTP header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The buffer is too short for the expected data.
    BufferTooShort {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// An invalid or unrecognized field value was encountered.
    InvalidField {
        /// Name of the field that was invalid.
        field: &'static str,
        /// The invalid value.
        value: u32,
    },
    /// A bit field does not lie within a single byte.
    BitRange {
        /// Bit offset from the least-significant bit.
        offset: u8,
        /// Width of the field in bits.
        length: u8,
    },
    /// A value does not fit the width of the bit field it is written to.
    ValueTooWide {
        /// The rejected value.
        value: u8,
        /// Width of the field in bits.
        length: u8,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BufferTooShort { needed, available } => {
                write!(
                    f,
                    "buffer too short: needed {} bytes, got {}",
                    needed, available
                )
            }
            ParseError::InvalidField { field, value } => {
                write!(f, "invalid {} value: {}", field, value)
            }
            ParseError::BitRange { offset, length } => {
                write!(
                    f,
                    "bit field at offset {} with length {} exceeds one byte",
                    offset, length
                )
            }
            ParseError::ValueTooWide { value, length } => {
                write!(f, "value {} does not fit in {} bits", value, length)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for io::Error {
    fn from(err: ParseError) -> io::Error {
        let kind = match &err {
            ParseError::BufferTooShort { .. } => io::ErrorKind::UnexpectedEof,
            ParseError::InvalidField { .. } => io::ErrorKind::InvalidData,
            ParseError::BitRange { .. } | ParseError::ValueTooWide { .. } => {
                io::ErrorKind::InvalidInput
            }
        };
        io::Error::new(kind, err)
    }
}

/// Errors raised by timestamp conversion and checked arithmetic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeError {
    /// A checked add, subtract or negate left the representable range.
    Overflow,
    /// The date-time precedes 1900-01-01T00:00:00Z.
    BeforeNtpEpoch,
    /// The date-time lies past the last second of NTP era 0 (2036-02-07T06:28:15Z).
    BeyondEra {
        /// Seconds since the NTP epoch that were requested.
        seconds: i64,
    },
    /// The timestamp precedes 1970-01-01T00:00:00Z.
    BeforeUnixEpoch,
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::Overflow => write!(f, "timestamp arithmetic overflow"),
            TimeError::BeforeNtpEpoch => write!(f, "date-time precedes the NTP epoch (1900)"),
            TimeError::BeyondEra { seconds } => {
                write!(f, "{} seconds since 1900 exceeds NTP era 0", seconds)
            }
            TimeError::BeforeUnixEpoch => write!(f, "timestamp precedes the Unix epoch (1970)"),
        }
    }
}

impl std::error::Error for TimeError {}

impl From<TimeError> for io::Error {
    fn from(err: TimeError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}
