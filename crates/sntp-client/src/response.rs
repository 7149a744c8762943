// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! A received server reply and the values derived from it.

use std::ops::Deref;
use std::time::Duration;

use sntp_proto::protocol::{self, Packet};
use sntp_proto::{KissOfDeath, LeapIndicator, Mode, Stratum, TimeError, TimestampDifference};

use crate::error::ValidationError;

/// Bounds applied by [`Response::validate_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidationLimits {
    /// Highest acceptable stratum.
    pub max_stratum: Stratum,
    /// Longest acceptable gap between the reference and transmit timestamps.
    pub max_poll_interval: Duration,
    /// Largest acceptable root delay / 2 + root dispersion.
    pub max_dispersion: Duration,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            max_stratum: Stratum::MAX_SECONDARY,
            max_poll_interval: Duration::from_secs(1 << protocol::MAXPOLL),
            max_dispersion: Duration::from_secs_f64(protocol::MAXDISP),
        }
    }
}

/// A server reply with its locally recorded destination timestamp.
///
/// Derefs to [`Packet`], so header fields are available directly
/// (e.g. `response.stratum()`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Response {
    packet: Packet,
}

impl Response {
    /// Wrap a received packet. Its destination timestamp should already be set.
    pub fn new(packet: Packet) -> Self {
        Response { packet }
    }

    /// The underlying packet.
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Unwrap into the underlying packet.
    pub fn into_packet(self) -> Packet {
        self.packet
    }

    /// Clock offset `((T2 - T1) + (T3 - T4)) / 2`.
    ///
    /// Positive when the local clock is behind the server.
    pub fn offset(&self) -> Result<TimestampDifference, TimeError> {
        let p = &self.packet;
        let outbound = p.receive_timestamp().difference(p.originate_timestamp());
        let inbound = p.transmit_timestamp().difference(p.destination_timestamp());
        Ok(outbound.checked_add(inbound)?.halve())
    }

    /// Round-trip delay `(T4 - T1) - (T3 - T2)`.
    pub fn round_trip_delay(&self) -> Result<TimestampDifference, TimeError> {
        let p = &self.packet;
        let total = p.destination_timestamp().difference(p.originate_timestamp());
        let held = p.transmit_timestamp().difference(p.receive_timestamp());
        total.checked_sub(held)
    }

    /// [`Response::offset`] in seconds.
    pub fn offset_seconds(&self) -> Result<f64, TimeError> {
        Ok(self.offset()?.total_seconds())
    }

    /// The kiss code of a stratum-0 reply, when it carries a known one.
    pub fn kiss_code(&self) -> Option<KissOfDeath> {
        if !self.packet.stratum().is_kiss_of_death() {
            return None;
        }
        KissOfDeath::try_from(u32::from_be_bytes(self.packet.reference_identifier())).ok()
    }

    /// [`Response::validate_with`] using [`ValidationLimits::default`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&ValidationLimits::default())
    }

    /// Sanity-check the reply. Checks run in order and the first failure is
    /// returned: mode, leap indicator, stratum, freshness, dispersion, causality.
    ///
    /// A zero reference timestamp fails the freshness check with an infinite age.
    pub fn validate_with(&self, limits: &ValidationLimits) -> Result<(), ValidationError> {
        let p = &self.packet;

        let mode = p.mode();
        if mode != Mode::Server && mode != Mode::Broadcast {
            return Err(ValidationError::UnexpectedMode { mode });
        }

        if p.leap_indicator() == LeapIndicator::AlarmCondition {
            return Err(ValidationError::Unsynchronized);
        }

        let stratum = p.stratum();
        if stratum < Stratum::PRIMARY || stratum > limits.max_stratum {
            return Err(ValidationError::InvalidStratum { stratum });
        }

        // An unset reference means the server clock was never set.
        let reference = p.reference_timestamp();
        let age_seconds = if reference.is_valid() {
            p.transmit_timestamp().difference(reference).total_seconds()
        } else {
            f64::INFINITY
        };
        if age_seconds > limits.max_poll_interval.as_secs_f64() {
            return Err(ValidationError::ClockNotFresh { age_seconds });
        }

        let dispersion_ms = p.root_delay() / 2.0 + p.root_dispersion();
        if dispersion_ms > limits.max_dispersion.as_secs_f64() * 1000.0 {
            return Err(ValidationError::DispersionTooLarge { dispersion_ms });
        }

        if p.transmit_timestamp() < p.reference_timestamp() {
            return Err(ValidationError::NonCausal);
        }
        Ok(())
    }
}

impl Deref for Response {
    type Target = Packet;
    fn deref(&self) -> &Self::Target {
        &self.packet
    }
}

impl From<Packet> for Response {
    fn from(packet: Packet) -> Self {
        Response::new(packet)
    }
}
