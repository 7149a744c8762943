// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use byteorder::{BigEndian, ByteOrder};

use super::{LeapIndicator, Mode, PACKET_LEN, Stratum};
use crate::error::ParseError;
use crate::timestamp::Timestamp;

/// A bit field inside a single header byte, counted from the least-significant bit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitField {
    /// Offset of the lowest bit of the field.
    pub offset: u8,
    /// Width of the field in bits.
    pub length: u8,
}

/// Leap indicator: 2 bits at offset 6 of byte 0.
pub const LEAP_INDICATOR: BitField = BitField {
    offset: 6,
    length: 2,
};
/// Version number: 3 bits at offset 3 of byte 0.
pub const VERSION: BitField = BitField {
    offset: 3,
    length: 3,
};
/// Association mode: 3 bits at offset 0 of byte 0.
pub const MODE: BitField = BitField {
    offset: 0,
    length: 3,
};

const STRATUM_OFFSET: usize = 1;
const POLL_OFFSET: usize = 2;
const PRECISION_OFFSET: usize = 3;
const ROOT_DELAY_OFFSET: usize = 4;
const ROOT_DISPERSION_OFFSET: usize = 8;
const REFERENCE_ID_OFFSET: usize = 12;
const REFERENCE_TIMESTAMP_OFFSET: usize = 16;
const ORIGINATE_TIMESTAMP_OFFSET: usize = 24;
const RECEIVE_TIMESTAMP_OFFSET: usize = 32;
const TRANSMIT_TIMESTAMP_OFFSET: usize = 40;

fn check_geometry(offset: u8, length: u8) -> Result<u8, ParseError> {
    if length == 0 || u16::from(offset) + u16::from(length) > 8 {
        return Err(ParseError::BitRange { offset, length });
    }
    Ok(((1u16 << length) - 1) as u8)
}

/// Read `length` bits starting at bit `offset` of `byte`.
pub fn get_bits(byte: u8, offset: u8, length: u8) -> Result<u8, ParseError> {
    let mask = check_geometry(offset, length)?;
    Ok((byte >> offset) & mask)
}

/// Return `byte` with `length` bits at bit `offset` replaced by `value`.
///
/// Fails if the field does not fit in one byte or `value` is wider than the field.
pub fn set_bits(byte: u8, offset: u8, length: u8, value: u8) -> Result<u8, ParseError> {
    let mask = check_geometry(offset, length)?;
    if value & !mask != 0 {
        return Err(ParseError::ValueTooWide { value, length });
    }
    Ok((byte & !(mask << offset)) | (value << offset))
}

/// **Packet Header** - the fixed 48-byte NTP header, kept in wire form.
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |LI | VN  |Mode |    Stratum     |     Poll      |  Precision   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Delay                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Dispersion                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Reference ID                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// +                     Reference Timestamp (64)                  +
/// +                      Origin Timestamp (64)                    +
/// +                      Receive Timestamp (64)                   +
/// +                      Transmit Timestamp (64)                  +
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The destination timestamp (T4) never travels on the wire. It is recorded
/// locally when a reply arrives and is the only field that may change after
/// construction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Packet {
    buf: [u8; PACKET_LEN],
    destination: Timestamp,
}

impl Packet {
    /// A client request: mode and version set, the given transmit timestamp, all
    /// other header bytes zero. The destination timestamp is set to now.
    pub fn new_request(mode: Mode, version: u8, transmit: Timestamp) -> Result<Self, ParseError> {
        let mut byte0 = set_bits(0, MODE.offset, MODE.length, mode as u8)?;
        byte0 = set_bits(byte0, VERSION.offset, VERSION.length, version)?;

        let mut buf = [0u8; PACKET_LEN];
        buf[0] = byte0;
        buf[TRANSMIT_TIMESTAMP_OFFSET..].copy_from_slice(&transmit.to_bytes());
        Ok(Packet {
            buf,
            destination: Timestamp::now(),
        })
    }

    /// An all-zero header with the destination timestamp set to now.
    pub fn new_empty() -> Self {
        Packet {
            buf: [0u8; PACKET_LEN],
            destination: Timestamp::now(),
        }
    }

    /// Copy the first 48 bytes of a received datagram. Trailing bytes are ignored.
    ///
    /// The destination timestamp starts as zero; set it with
    /// [`Packet::set_destination_timestamp`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        let header = data
            .get(..PACKET_LEN)
            .ok_or(ParseError::BufferTooShort {
                needed: PACKET_LEN,
                available: data.len(),
            })?;
        let mut buf = [0u8; PACKET_LEN];
        buf.copy_from_slice(header);
        Ok(Packet {
            buf,
            destination: Timestamp::ZERO,
        })
    }

    /// The wire bytes of the header.
    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.buf
    }

    fn field(&self, field: BitField) -> u8 {
        (self.buf[0] >> field.offset) & (((1u16 << field.length) - 1) as u8)
    }

    fn timestamp_at(&self, offset: usize) -> Timestamp {
        Timestamp::from_bits(BigEndian::read_u64(&self.buf[offset..offset + 8]))
    }

    // 16.16 fixed-point seconds, reported in milliseconds.
    fn short_format_ms(&self, offset: usize) -> f64 {
        1000.0 * (f64::from(BigEndian::read_u32(&self.buf[offset..offset + 4])) / 65536.0)
    }

    /// Leap indicator warning of an impending leap second.
    pub fn leap_indicator(&self) -> LeapIndicator {
        LeapIndicator::from_bits(self.field(LEAP_INDICATOR))
    }

    /// Protocol version number (0-7).
    pub fn version(&self) -> u8 {
        self.field(VERSION)
    }

    /// Association mode.
    pub fn mode(&self) -> Mode {
        Mode::from_bits(self.field(MODE))
    }

    /// Stratum of the server.
    pub fn stratum(&self) -> Stratum {
        Stratum(self.buf[STRATUM_OFFSET])
    }

    /// Maximum interval between successive messages, as a signed log2 seconds exponent.
    pub fn poll(&self) -> i8 {
        self.buf[POLL_OFFSET] as i8
    }

    /// Precision of the server clock, as a signed log2 seconds exponent.
    pub fn precision(&self) -> i8 {
        self.buf[PRECISION_OFFSET] as i8
    }

    /// The opaque 4-byte reference identifier.
    pub fn reference_identifier(&self) -> [u8; 4] {
        let mut id = [0u8; 4];
        id.copy_from_slice(&self.buf[REFERENCE_ID_OFFSET..REFERENCE_ID_OFFSET + 4]);
        id
    }

    /// Total round-trip delay to the reference clock, in milliseconds.
    pub fn root_delay(&self) -> f64 {
        self.short_format_ms(ROOT_DELAY_OFFSET)
    }

    /// Total dispersion to the reference clock, in milliseconds.
    pub fn root_dispersion(&self) -> f64 {
        self.short_format_ms(ROOT_DISPERSION_OFFSET)
    }

    /// Time the server clock was last set or corrected.
    pub fn reference_timestamp(&self) -> Timestamp {
        self.timestamp_at(REFERENCE_TIMESTAMP_OFFSET)
    }

    /// T1: client transmit time echoed back by the server.
    pub fn originate_timestamp(&self) -> Timestamp {
        self.timestamp_at(ORIGINATE_TIMESTAMP_OFFSET)
    }

    /// T2: time the request arrived at the server.
    pub fn receive_timestamp(&self) -> Timestamp {
        self.timestamp_at(RECEIVE_TIMESTAMP_OFFSET)
    }

    /// T3: time the reply left the server.
    pub fn transmit_timestamp(&self) -> Timestamp {
        self.timestamp_at(TRANSMIT_TIMESTAMP_OFFSET)
    }

    /// T4: time the reply arrived locally.
    pub fn destination_timestamp(&self) -> Timestamp {
        self.destination
    }

    /// Record the arrival time of the packet.
    pub fn set_destination_timestamp(&mut self, t: Timestamp) {
        self.destination = t;
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_bytes() -> [u8; PACKET_LEN] {
        let mut buf = [0u8; PACKET_LEN];
        buf[0] = 0b00_100_100; // LI=0, VN=4, Mode=4
        buf[1] = 2;
        buf[2] = 6;
        buf[3] = 0xEC; // -20
        buf[4..8].copy_from_slice(&0x0000_8000u32.to_be_bytes()); // 0.5 s
        buf[8..12].copy_from_slice(&0x0001_4000u32.to_be_bytes()); // 1.25 s
        buf[12..16].copy_from_slice(&[192, 0, 2, 1]);
        buf[16..24].copy_from_slice(&Timestamp::from_parts(1000, 0).to_bytes());
        buf[24..32].copy_from_slice(&Timestamp::from_parts(1001, 1).to_bytes());
        buf[32..40].copy_from_slice(&Timestamp::from_parts(1002, 2).to_bytes());
        buf[40..48].copy_from_slice(&Timestamp::from_parts(1003, 3).to_bytes());
        buf
    }

    #[test]
    fn test_get_bits() {
        assert_eq!(get_bits(0b1110_0011, 6, 2), Ok(0b11));
        assert_eq!(get_bits(0b1110_0011, 3, 3), Ok(0b100));
        assert_eq!(get_bits(0b1110_0011, 0, 3), Ok(0b011));
        assert_eq!(get_bits(0xFF, 0, 8), Ok(0xFF));
    }

    #[test]
    fn test_set_bits() {
        assert_eq!(set_bits(0, 3, 3, 4), Ok(0b0010_0000));
        assert_eq!(set_bits(0xFF, 3, 3, 0), Ok(0b1100_0111));
        assert_eq!(set_bits(0, 0, 8, 0xAB), Ok(0xAB));
    }

    #[test]
    fn test_bit_geometry_rejected() {
        assert_eq!(
            get_bits(0, 6, 3),
            Err(ParseError::BitRange {
                offset: 6,
                length: 3
            })
        );
        assert!(get_bits(0, 0, 0).is_err());
        assert!(set_bits(0, 8, 1, 0).is_err());
        assert!(set_bits(0, 200, 200, 0).is_err());
    }

    #[test]
    fn test_set_bits_value_too_wide() {
        assert_eq!(
            set_bits(0, 3, 3, 8),
            Err(ParseError::ValueTooWide {
                value: 8,
                length: 3
            })
        );
        assert!(set_bits(0, 6, 2, 4).is_err());
    }

    #[test]
    fn test_new_request_layout() {
        let transmit = Timestamp::from_parts(0xE93C_7D00, 0x1234_5678);
        let packet = Packet::new_request(Mode::Client, 3, transmit).unwrap();
        let bytes = packet.as_bytes();
        assert_eq!(bytes[0], 0b00_011_011);
        assert!(bytes[1..40].iter().all(|&b| b == 0));
        assert_eq!(bytes[40..48], transmit.to_bytes());
        assert_eq!(packet.mode(), Mode::Client);
        assert_eq!(packet.version(), 3);
        assert_eq!(packet.leap_indicator(), LeapIndicator::NoLeap);
        assert_eq!(packet.transmit_timestamp(), transmit);
        assert!(packet.destination_timestamp().is_valid());
    }

    #[test]
    fn test_new_request_rejects_wide_version() {
        assert_eq!(
            Packet::new_request(Mode::Client, 8, Timestamp::ZERO),
            Err(ParseError::ValueTooWide {
                value: 8,
                length: 3
            })
        );
    }

    #[test]
    fn test_new_empty() {
        let packet = Packet::new_empty();
        assert!(packet.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(packet.mode(), Mode::Reserved);
        assert!(packet.destination_timestamp().is_valid());
    }

    #[test]
    fn test_from_bytes_accessors() {
        let packet = Packet::from_bytes(&reply_bytes()).unwrap();
        assert_eq!(packet.leap_indicator(), LeapIndicator::NoLeap);
        assert_eq!(packet.version(), 4);
        assert_eq!(packet.mode(), Mode::Server);
        assert_eq!(packet.stratum(), Stratum(2));
        assert_eq!(packet.poll(), 6);
        assert_eq!(packet.precision(), -20);
        assert_eq!(packet.reference_identifier(), [192, 0, 2, 1]);
        assert_eq!(packet.root_delay(), 500.0);
        assert_eq!(packet.root_dispersion(), 1250.0);
        assert_eq!(packet.reference_timestamp(), Timestamp::from_parts(1000, 0));
        assert_eq!(packet.originate_timestamp(), Timestamp::from_parts(1001, 1));
        assert_eq!(packet.receive_timestamp(), Timestamp::from_parts(1002, 2));
        assert_eq!(packet.transmit_timestamp(), Timestamp::from_parts(1003, 3));
        assert_eq!(packet.destination_timestamp(), Timestamp::ZERO);
    }

    #[test]
    fn test_from_bytes_ignores_trailing() {
        let mut long = reply_bytes().to_vec();
        long.extend_from_slice(&[0xAA; 20]);
        let packet = Packet::from_bytes(&long).unwrap();
        assert_eq!(packet.as_bytes(), &reply_bytes());
    }

    #[test]
    fn test_from_bytes_too_short() {
        assert_eq!(
            Packet::from_bytes(&reply_bytes()[..47]),
            Err(ParseError::BufferTooShort {
                needed: 48,
                available: 47
            })
        );
    }

    #[test]
    fn test_leap_indicator_from_header() {
        let mut buf = reply_bytes();
        for (bits, expected) in [
            (0u8, LeapIndicator::NoLeap),
            (1, LeapIndicator::OneSecondMore),
            (2, LeapIndicator::OneSecondLess),
            (3, LeapIndicator::AlarmCondition),
        ] {
            buf[0] = set_bits(buf[0], LEAP_INDICATOR.offset, LEAP_INDICATOR.length, bits).unwrap();
            let packet = Packet::from_bytes(&buf).unwrap();
            assert_eq!(packet.leap_indicator(), expected);
            assert_eq!(packet.mode(), Mode::Server);
            assert_eq!(packet.version(), 4);
        }
    }

    #[test]
    fn test_set_destination_timestamp() {
        let mut packet = Packet::from_bytes(&reply_bytes()).unwrap();
        let t4 = Timestamp::from_parts(1004, 4);
        packet.set_destination_timestamp(t4);
        assert_eq!(packet.destination_timestamp(), t4);
    }
}
