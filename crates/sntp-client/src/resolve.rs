// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Server endpoint resolution.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use log::debug;

use crate::error::{ConfigError, NtpError};

/// Resolve `host` to a single server endpoint.
///
/// IPv4 and IPv6 literals (the latter optionally in brackets) are used as-is.
/// Names go through the platform resolver; the first IPv4 result wins, then
/// the first IPv6 result.
pub(crate) fn resolve(host: &str, port: u16) -> Result<SocketAddr, NtpError> {
    if host.is_empty() {
        return Err(ConfigError::EmptyHost.into());
    }
    if port == 0 {
        return Err(ConfigError::InvalidPort.into());
    }

    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ConfigError::Resolution {
            host: host.to_owned(),
            source,
        })?
        .collect();
    debug!("{} resolved to {:?}", host, addrs);

    prefer_ipv4(&addrs).ok_or_else(|| {
        ConfigError::NoAddresses {
            host: host.to_owned(),
        }
        .into()
    })
}

/// The first IPv4 address, or failing that the first IPv6 address.
pub(crate) fn prefer_ipv4(addrs: &[SocketAddr]) -> Option<SocketAddr> {
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.iter().find(|a| a.is_ipv6()))
        .copied()
}

/// Select the appropriate bind address based on the target address family.
///
/// Returns `0.0.0.0:0` for IPv4 targets and `[::]:0` for IPv6 targets.
pub(crate) fn bind_addr_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_literal() {
        let addr = resolve("192.0.2.7", 123).unwrap();
        assert_eq!(addr, "192.0.2.7:123".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_ipv6_literal_plain_and_bracketed() {
        let expected: SocketAddr = "[2001:db8::1]:4123".parse().unwrap();
        assert_eq!(resolve("2001:db8::1", 4123).unwrap(), expected);
        assert_eq!(resolve("[2001:db8::1]", 4123).unwrap(), expected);
    }

    #[test]
    fn test_localhost_name() {
        let addr = resolve("localhost", 123).unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 123);
    }

    #[test]
    fn test_empty_host_rejected() {
        assert!(matches!(
            resolve("", 123),
            Err(NtpError::Config(ConfigError::EmptyHost))
        ));
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(matches!(
            resolve("127.0.0.1", 0),
            Err(NtpError::Config(ConfigError::InvalidPort))
        ));
    }

    #[test]
    fn test_prefer_ipv4() {
        let v6: SocketAddr = "[::1]:123".parse().unwrap();
        let v4: SocketAddr = "127.0.0.1:123".parse().unwrap();
        assert_eq!(prefer_ipv4(&[v6, v4]), Some(v4));
        assert_eq!(prefer_ipv4(&[v6]), Some(v6));
        assert_eq!(prefer_ipv4(&[]), None);
    }

    #[test]
    fn test_bind_addr_matches_family() {
        let v4: SocketAddr = "192.0.2.1:123".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::1]:123".parse().unwrap();
        assert!(bind_addr_for(&v4).is_ipv4());
        assert!(bind_addr_for(&v6).is_ipv6());
        assert_eq!(bind_addr_for(&v4).port(), 0);
    }
}
