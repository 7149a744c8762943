// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Blocking one-shot SNTP exchange.
//!
//! An [`SntpClient`] owns one resolved server endpoint. Each call to
//! [`SntpClient::get_time`] binds a fresh UDP socket, sends a single client
//! request and waits for one reply. Nothing is retried; the socket is closed
//! when the call returns.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), sntp_client::error::NtpError> {
//! let client = sntp_client::SntpClient::new("time.nist.gov", 123)?;
//! let response = client.get_time()?;
//! response.validate()?;
//! println!("offset: {:+.6}s", response.offset_seconds()?);
//! # Ok(())
//! # }
//! ```

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use log::debug;
use sntp_proto::protocol::{self, Mode, PACKET_LEN, Packet};
use sntp_proto::Timestamp;

use crate::error::{ConfigError, NtpError, ProtocolError, TransportError};
use crate::resolve::{bind_addr_for, resolve};
use crate::response::Response;

/// Default server port.
pub const DEFAULT_PORT: u16 = protocol::PORT;

/// Default receive timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default protocol version for direct use.
pub const DEFAULT_VERSION: u8 = 3;

// Room for extension fields or a MAC appended to the header; only the first
// 48 bytes are decoded.
const RECV_BUF_LEN: usize = 1024;

/// A blocking SNTP client bound to one server endpoint.
#[derive(Clone, Debug)]
pub struct SntpClient {
    host: String,
    server: SocketAddr,
    timeout: Duration,
    version: u8,
}

impl SntpClient {
    /// Resolve `host` and create a client with the default timeout and version.
    ///
    /// Fails with a configuration error for an empty host, port 0, or a host
    /// that resolves to no address.
    pub fn new(host: &str, port: u16) -> Result<Self, NtpError> {
        let server = resolve(host, port)?;
        debug!("{}:{} -> {}", host, port, server);
        Ok(SntpClient {
            host: host.to_owned(),
            server,
            timeout: DEFAULT_TIMEOUT,
            version: DEFAULT_VERSION,
        })
    }

    /// The hostname the client was created with.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The resolved server endpoint.
    pub fn server_addr(&self) -> SocketAddr {
        self.server
    }

    /// The receive timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the receive timeout. Zero is rejected.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<(), NtpError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout.into());
        }
        self.timeout = timeout;
        Ok(())
    }

    /// The protocol version sent in requests.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Set the protocol version sent in requests (1-4).
    pub fn set_version(&mut self, version: u8) -> Result<(), NtpError> {
        if !(1..=4).contains(&version) {
            return Err(ConfigError::InvalidVersion { version }.into());
        }
        self.version = version;
        Ok(())
    }

    /// Query the server once.
    ///
    /// The reply must be at least 48 bytes and carry mode Server; its
    /// destination timestamp is stamped as soon as it arrives. The reply is
    /// not validated further, see [`Response::validate`].
    pub fn get_time(&self) -> Result<Response, NtpError> {
        let sock = UdpSocket::bind(bind_addr_for(&self.server)).map_err(|e| self.transport(e))?;
        sock.set_read_timeout(Some(self.timeout))
            .map_err(|e| self.transport(e))?;
        sock.set_write_timeout(Some(self.timeout))
            .map_err(|e| self.transport(e))?;

        // Connected, so ICMP port-unreachable surfaces as ConnectionRefused
        // and datagrams from other sources are dropped.
        sock.connect(self.server).map_err(|e| self.transport(e))?;

        let request = Packet::new_request(Mode::Client, self.version, Timestamp::now())?;
        let sz = sock
            .send(request.as_bytes())
            .map_err(|e| self.transport(e))?;
        debug!("{:?}", sock.local_addr());
        debug!("sent: {}", sz);

        let mut recv_buf = [0u8; RECV_BUF_LEN];
        let recv_len = sock
            .recv(&mut recv_buf[..])
            .map_err(|e| self.transport(e))?;
        let destination = Timestamp::now();
        debug!("recv: {} bytes from {}", recv_len, self.server);

        if recv_len < PACKET_LEN {
            return Err(ProtocolError::ResponseTooShort { received: recv_len }.into());
        }
        let mut packet = Packet::from_bytes(&recv_buf[..recv_len])?;
        packet.set_destination_timestamp(destination);

        let mode = packet.mode();
        if mode != Mode::Server {
            return Err(ProtocolError::UnexpectedMode { mode }.into());
        }
        Ok(Response::new(packet))
    }

    fn transport(&self, err: io::Error) -> NtpError {
        map_transport_error(err, self.server, self.timeout)
    }
}

fn map_transport_error(err: io::Error, addr: SocketAddr, timeout: Duration) -> NtpError {
    let err = match err.kind() {
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused => {
            TransportError::NoTimeServer { addr }
        }
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            TransportError::Timeout { after: timeout }
        }
        _ => TransportError::Socket { source: err },
    };
    NtpError::Transport(err)
}
