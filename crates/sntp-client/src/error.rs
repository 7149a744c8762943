// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for the SNTP client and time keeper.
//!
//! Every fallible operation returns [`NtpError`], whose variants follow the
//! stage that failed: configuration, transport, protocol, validation,
//! timestamp arithmetic or decoding. Callers working on `io::Result` can
//! convert with `?` and recover the typed error by downcasting:
//!
//! ```no_run
//! use sntp_client::SntpClient;
//! use sntp_client::error::{NtpError, TransportError};
//!
//! fn query() -> std::io::Result<()> {
//!     let client = SntpClient::new("time.nist.gov", 123)?;
//!     client.get_time()?;
//!     Ok(())
//! }
//!
//! if let Err(e) = query() {
//!     match e.get_ref().and_then(|inner| inner.downcast_ref::<NtpError>()) {
//!         Some(NtpError::Transport(TransportError::Timeout { after })) => {
//!             eprintln!("no reply within {after:?}")
//!         }
//!         Some(other) => eprintln!("SNTP error: {other}"),
//!         None => eprintln!("I/O error: {e}"),
//!     }
//! }
//! ```

pub use sntp_proto::error::{ParseError, TimeError};

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use sntp_proto::{Mode, Stratum};

/// Errors that can occur during SNTP client operations.
#[derive(Debug)]
pub enum NtpError {
    /// Invalid configuration (host, port, timeout, version, poll interval) or
    /// a host that resolves to no usable address.
    Config(ConfigError),
    /// The UDP exchange failed.
    Transport(TransportError),
    /// The reply is not a usable SNTP server response.
    Protocol(ProtocolError),
    /// The reply failed an explicit sanity check.
    Validation(ValidationError),
    /// Timestamp arithmetic overflowed or a conversion left its range.
    Time(TimeError),
    /// A header field could not be encoded or decoded.
    Parse(ParseError),
    /// The time keeper already has an active background worker.
    AlreadyRunning,
    /// The background worker thread could not be spawned.
    Spawn(io::Error),
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The hostname is empty.
    EmptyHost,
    /// Port 0 is not a valid server port.
    InvalidPort,
    /// The timeout must be positive.
    InvalidTimeout,
    /// The protocol version must be in `1..=4`.
    InvalidVersion {
        /// The rejected version.
        version: u8,
    },
    /// The poll interval must be positive.
    InvalidPollInterval,
    /// The host resolved to no IPv4 or IPv6 address.
    NoAddresses {
        /// The host that failed to resolve.
        host: String,
    },
    /// The resolver rejected the host.
    Resolution {
        /// The host that failed to resolve.
        host: String,
        /// The resolver error.
        source: io::Error,
    },
}

/// Failures of the UDP exchange itself. Nothing is retried.
#[derive(Debug)]
pub enum TransportError {
    /// The peer reset or refused the exchange.
    NoTimeServer {
        /// The address that was queried.
        addr: SocketAddr,
    },
    /// No reply arrived within the configured timeout.
    Timeout {
        /// The timeout that elapsed.
        after: Duration,
    },
    /// Any other socket failure.
    Socket {
        /// The underlying socket error.
        source: io::Error,
    },
}

impl TransportError {
    /// The native OS error code of a socket failure, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            TransportError::Socket { source } => source.raw_os_error(),
            _ => None,
        }
    }
}

/// Replies that cannot be used at all.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolError {
    /// Reply shorter than the 48-byte header.
    ResponseTooShort {
        /// Number of bytes received.
        received: usize,
    },
    /// Reply mode is not Server.
    UnexpectedMode {
        /// The mode the reply carried.
        mode: Mode,
    },
}

/// Sanity-check failures reported by [`Response::validate`](crate::Response::validate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValidationError {
    /// Mode is neither Server nor Broadcast.
    UnexpectedMode {
        /// The mode the reply carried.
        mode: Mode,
    },
    /// The leap indicator reports an unsynchronized server clock.
    Unsynchronized,
    /// Stratum is 0 or above the configured maximum.
    InvalidStratum {
        /// The stratum the reply carried.
        stratum: Stratum,
    },
    /// The server clock was last set longer ago than the maximum poll interval.
    ClockNotFresh {
        /// Seconds between the reference and transmit timestamps; infinite
        /// when the reference timestamp is unset.
        age_seconds: f64,
    },
    /// Root delay / 2 + root dispersion exceeds the maximum dispersion.
    DispersionTooLarge {
        /// The computed dispersion in milliseconds.
        dispersion_ms: f64,
    },
    /// The transmit timestamp precedes the reference timestamp.
    NonCausal,
}

impl fmt::Display for NtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NtpError::Config(e) => write!(f, "SNTP config error: {e}"),
            NtpError::Transport(e) => write!(f, "SNTP transport error: {e}"),
            NtpError::Protocol(e) => write!(f, "SNTP protocol error: {e}"),
            NtpError::Validation(e) => write!(f, "SNTP validation error: {e}"),
            NtpError::Time(e) => write!(f, "{e}"),
            NtpError::Parse(e) => write!(f, "{e}"),
            NtpError::AlreadyRunning => write!(f, "time keeper is already running"),
            NtpError::Spawn(e) => write!(f, "failed to spawn time keeper thread: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyHost => write!(f, "hostname must not be empty"),
            ConfigError::InvalidPort => write!(f, "port must be non-zero"),
            ConfigError::InvalidTimeout => write!(f, "timeout must be positive"),
            ConfigError::InvalidVersion { version } => {
                write!(f, "protocol version {version} is outside 1..=4")
            }
            ConfigError::InvalidPollInterval => write!(f, "poll interval must be positive"),
            ConfigError::NoAddresses { host } => {
                write!(f, "host resolved to no socket addresses: {host}")
            }
            ConfigError::Resolution { host, source } => {
                write!(f, "failed to resolve {host}: {source}")
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NoTimeServer { addr } => {
                write!(f, "no time server at this address: {addr}")
            }
            TransportError::Timeout { after } => {
                write!(f, "request timed out after {} ms", after.as_millis())
            }
            TransportError::Socket { source } => write!(f, "socket error: {source}"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::ResponseTooShort { received } => {
                write!(f, "malformed packet: response too short ({received} bytes)")
            }
            ProtocolError::UnexpectedMode { mode } => {
                write!(f, "unexpected response mode {mode:?} (expected Server)")
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnexpectedMode { mode } => {
                write!(f, "mode {mode:?} is neither Server nor Broadcast")
            }
            ValidationError::Unsynchronized => write!(f, "server reports unsynchronized clock"),
            ValidationError::InvalidStratum { stratum } => {
                write!(f, "stratum {stratum} is out of range")
            }
            ValidationError::ClockNotFresh { age_seconds } => {
                write!(f, "clock not fresh: last set {age_seconds:.0} s before transmit")
            }
            ValidationError::DispersionTooLarge { dispersion_ms } => {
                write!(f, "dispersion too large: {dispersion_ms:.3} ms")
            }
            ValidationError::NonCausal => {
                write!(f, "non-causal timestamps: transmit precedes reference")
            }
        }
    }
}

impl std::error::Error for NtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NtpError::Config(ConfigError::Resolution { source, .. }) => Some(source),
            NtpError::Transport(TransportError::Socket { source }) => Some(source),
            NtpError::Time(e) => Some(e),
            NtpError::Parse(e) => Some(e),
            NtpError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for TransportError {}
impl std::error::Error for ProtocolError {}
impl std::error::Error for ValidationError {}

impl From<NtpError> for io::Error {
    fn from(err: NtpError) -> io::Error {
        let kind = match &err {
            NtpError::Config(_) => io::ErrorKind::InvalidInput,
            NtpError::Transport(TransportError::NoTimeServer { .. }) => {
                io::ErrorKind::ConnectionRefused
            }
            NtpError::Transport(TransportError::Timeout { .. }) => io::ErrorKind::TimedOut,
            NtpError::Transport(TransportError::Socket { source }) => source.kind(),
            NtpError::Protocol(_) | NtpError::Validation(_) | NtpError::Time(_) => {
                io::ErrorKind::InvalidData
            }
            NtpError::Parse(_) => io::ErrorKind::InvalidData,
            NtpError::AlreadyRunning => io::ErrorKind::AlreadyExists,
            NtpError::Spawn(e) => e.kind(),
        };
        io::Error::new(kind, err)
    }
}

impl From<ConfigError> for NtpError {
    fn from(err: ConfigError) -> NtpError {
        NtpError::Config(err)
    }
}

impl From<TransportError> for NtpError {
    fn from(err: TransportError) -> NtpError {
        NtpError::Transport(err)
    }
}

impl From<ProtocolError> for NtpError {
    fn from(err: ProtocolError) -> NtpError {
        NtpError::Protocol(err)
    }
}

impl From<ValidationError> for NtpError {
    fn from(err: ValidationError) -> NtpError {
        NtpError::Validation(err)
    }
}

impl From<TimeError> for NtpError {
    fn from(err: TimeError) -> NtpError {
        NtpError::Time(err)
    }
}

impl From<ParseError> for NtpError {
    fn from(err: ParseError) -> NtpError {
        NtpError::Parse(err)
    }
}
