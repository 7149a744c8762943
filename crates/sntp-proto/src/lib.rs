// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! SNTP wire types: NTP timestamps, signed timestamp differences, and the fixed
//! 48-byte packet header codec (RFC 4330 / RFC 5905).
//!
//! # Example
//!
//! ```
//! use sntp_proto::{Mode, Packet, Timestamp};
//!
//! let request = Packet::new_request(Mode::Client, 4, Timestamp::now()).unwrap();
//! let echoed = Packet::from_bytes(request.as_bytes()).unwrap();
//! assert_eq!(echoed.mode(), Mode::Client);
//! assert_eq!(echoed.version(), 4);
//! ```

/// Error types for packet decoding and timestamp arithmetic.
pub mod error;

/// Signed differences between NTP timestamps.
pub mod difference;

/// Header types, bit-field helpers and the packet codec.
pub mod protocol;

/// The 64-bit NTP timestamp.
pub mod timestamp;

pub use difference::TimestampDifference;
pub use error::{ParseError, TimeError};
pub use protocol::{KissOfDeath, LeapIndicator, Mode, Packet, Stratum};
pub use timestamp::{EPOCH_DELTA, Timestamp};
