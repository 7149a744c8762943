// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::error::ParseError;

/// A 2-bit integer warning of an impending leap second to be inserted or deleted in the last
/// minute of the current day.
///
/// Every 2-bit value has a meaning, so decoding from the header never fails.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum LeapIndicator {
    /// No leap required.
    #[default]
    NoLeap = 0,
    /// Last minute of the day has 61 seconds.
    OneSecondMore = 1,
    /// Last minute of the day has 59 seconds.
    OneSecondLess = 2,
    /// Clock unsynchronized.
    AlarmCondition = 3,
}

impl LeapIndicator {
    /// Decode the low two bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => LeapIndicator::NoLeap,
            1 => LeapIndicator::OneSecondMore,
            2 => LeapIndicator::OneSecondLess,
            _ => LeapIndicator::AlarmCondition,
        }
    }
}

impl TryFrom<u8> for LeapIndicator {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 0b11 {
            return Err(ParseError::InvalidField {
                field: "leap indicator",
                value: u32::from(value),
            });
        }
        Ok(LeapIndicator::from_bits(value))
    }
}

/// A 3-bit integer representing the association mode.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Reserved mode (value 0).
    Reserved = 0,
    /// Symmetric active mode (value 1).
    SymmetricActive = 1,
    /// Symmetric passive mode (value 2).
    SymmetricPassive = 2,
    /// Client mode (value 3).
    #[default]
    Client = 3,
    /// Server mode (value 4).
    Server = 4,
    /// Broadcast mode (value 5).
    Broadcast = 5,
    /// NTP control message mode (value 6).
    NtpControlMessage = 6,
    /// Reserved for private use (value 7).
    ReservedForPrivateUse = 7,
}

impl Mode {
    /// Decode the low three bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Mode::Reserved,
            1 => Mode::SymmetricActive,
            2 => Mode::SymmetricPassive,
            3 => Mode::Client,
            4 => Mode::Server,
            5 => Mode::Broadcast,
            6 => Mode::NtpControlMessage,
            _ => Mode::ReservedForPrivateUse,
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 0b111 {
            return Err(ParseError::InvalidField {
                field: "mode",
                value: u32::from(value),
            });
        }
        Ok(Mode::from_bits(value))
    }
}

/// An 8-bit integer representing the stratum.
///
/// ```ignore
/// +--------+-----------------------------------------------------+
/// | Value  | Meaning                                             |
/// +--------+-----------------------------------------------------+
/// | 0      | unspecified or invalid (kiss-o'-death)              |
/// | 1      | primary server (e.g., equipped with a GPS receiver) |
/// | 2-15   | secondary server (via NTP)                          |
/// | 16     | unsynchronized                                      |
/// | 17-255 | reserved                                            |
/// +--------+-----------------------------------------------------+
/// ```
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Stratum(pub u8);

impl Stratum {
    /// Unspecified or invalid. Carries a kiss code in the reference identifier.
    pub const UNSPECIFIED: Stratum = Stratum(0);
    /// Primary server.
    pub const PRIMARY: Stratum = Stratum(1);
    /// Highest secondary-server stratum.
    pub const MAX_SECONDARY: Stratum = Stratum(15);
    /// Unsynchronized.
    pub const UNSYNCHRONIZED: Stratum = Stratum(16);

    /// Whether this stratum marks a kiss-o'-death packet.
    pub const fn is_kiss_of_death(self) -> bool {
        self.0 == 0
    }

    /// Whether this is a secondary server stratum (2-15).
    pub const fn is_secondary(self) -> bool {
        self.0 >= 2 && self.0 <= 15
    }
}

impl fmt::Display for Stratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// If the Stratum field is 0, which implies unspecified or invalid, the Reference Identifier
/// field can be used to convey messages useful for status reporting and access control. These
/// are called **Kiss-o'-Death** (KoD) packets and the ASCII messages they convey are called
/// kiss codes.
///
/// Kiss codes are encoded in four-character ASCII strings that are left justified and zero
/// filled.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KissOfDeath {
    /// Access denied; the client should stop sending packets to the server.
    Deny = code_to_u32!(b"DENY"),
    /// Access restricted; the client should stop sending packets to the server.
    Rstr = code_to_u32!(b"RSTR"),
    /// Rate exceeded; the client should reduce its polling interval.
    Rate = code_to_u32!(b"RATE"),
}

impl KissOfDeath {
    /// The four ASCII bytes of the code.
    pub const fn code(self) -> [u8; 4] {
        (self as u32).to_be_bytes()
    }
}

impl TryFrom<u32> for KissOfDeath {
    type Error = ParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            v if v == code_to_u32!(b"DENY") => Ok(KissOfDeath::Deny),
            v if v == code_to_u32!(b"RSTR") => Ok(KissOfDeath::Rstr),
            v if v == code_to_u32!(b"RATE") => Ok(KissOfDeath::Rate),
            _ => Err(ParseError::InvalidField {
                field: "kiss code",
                value,
            }),
        }
    }
}

impl fmt::Display for KissOfDeath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KissOfDeath::Deny => "DENY",
            KissOfDeath::Rstr => "RSTR",
            KissOfDeath::Rate => "RATE",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_indicator_table() {
        assert_eq!(LeapIndicator::from_bits(0), LeapIndicator::NoLeap);
        assert_eq!(LeapIndicator::from_bits(1), LeapIndicator::OneSecondMore);
        assert_eq!(LeapIndicator::from_bits(2), LeapIndicator::OneSecondLess);
        assert_eq!(LeapIndicator::from_bits(3), LeapIndicator::AlarmCondition);
        assert!(LeapIndicator::try_from(4).is_err());
    }

    #[test]
    fn test_mode_try_from() {
        for v in 0u8..8 {
            assert_eq!(Mode::try_from(v).unwrap() as u8, v);
        }
        assert_eq!(
            Mode::try_from(8),
            Err(ParseError::InvalidField {
                field: "mode",
                value: 8
            })
        );
    }

    #[test]
    fn test_stratum_classes() {
        assert!(Stratum::UNSPECIFIED.is_kiss_of_death());
        assert!(!Stratum::PRIMARY.is_secondary());
        assert!(Stratum(2).is_secondary());
        assert!(Stratum::MAX_SECONDARY.is_secondary());
        assert!(!Stratum::UNSYNCHRONIZED.is_secondary());
    }

    #[test]
    fn test_kiss_codes() {
        assert_eq!(KissOfDeath::try_from(u32::from_be_bytes(*b"RATE")), Ok(KissOfDeath::Rate));
        assert_eq!(KissOfDeath::Deny.code(), *b"DENY");
        assert_eq!(KissOfDeath::Rstr.to_string(), "RSTR");
        assert!(KissOfDeath::try_from(u32::from_be_bytes(*b"INIT")).is_err());
    }
}
