// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Header types and constants for the fixed 48-byte SNTP packet.
//!
//! Documentation is largely derived from IETF RFC 5905 and RFC 4330.

/// NTP port number.
pub const PORT: u16 = 123;

/// Size of the fixed NTP header in bytes.
pub const PACKET_LEN: usize = 48;

/// Maximum poll exponent (2^17 s, about 36 h).
pub const MAXPOLL: u8 = 17;

/// Maximum dispersion in seconds.
pub const MAXDISP: f64 = 16.0;

/// Maximum stratum number; a server at this stratum is unsynchronized.
pub const MAXSTRAT: u8 = 16;

// Convert an ascii string to a big-endian u32.
macro_rules! code_to_u32 {
    ($w:expr) => {
        u32::from_be_bytes(*$w)
    };
}

mod packet;
mod types;

pub use self::packet::*;
pub use self::types::*;
