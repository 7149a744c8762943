// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for integration tests.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`, but not every file uses every helper.
#![allow(unreachable_pub, dead_code)]

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use sntp_client::error::{ConfigError, NtpError, TransportError};
use sntp_client::protocol::Packet;
use sntp_client::{Timestamp, TimestampDifference};

/// How the mock server answers each request.
#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    /// A conforming server reply whose clock runs `offset` ahead of ours.
    Good { offset: TimestampDifference },
    /// A good reply followed by 20 bytes of trailing data.
    Trailing,
    /// Only the first 40 bytes of a good reply.
    Short,
    /// A full reply carrying mode Client instead of Server.
    ClientMode,
    /// Drop every request.
    Silent,
}

impl Behavior {
    /// A good reply with the server clock `secs` seconds ahead.
    pub fn ahead(secs: i64) -> Self {
        Behavior::Good {
            offset: TimestampDifference::from_bits(secs << 32),
        }
    }
}

struct State {
    behavior: Mutex<Behavior>,
    requests: AtomicUsize,
    last_byte0: AtomicU8,
    shutdown: AtomicBool,
}

/// An in-process SNTP server on a loopback UDP port.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<State>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start(behavior: Behavior) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let state = Arc::new(State {
            behavior: Mutex::new(behavior),
            requests: AtomicUsize::new(0),
            last_byte0: AtomicU8::new(0),
            shutdown: AtomicBool::new(false),
        });
        let thread_state = Arc::clone(&state);
        let handle = thread::spawn(move || serve(socket, &thread_state));
        MockServer {
            addr,
            state,
            handle: Some(handle),
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.state.behavior.lock().unwrap() = behavior;
    }

    /// Number of requests received so far.
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// The first header byte (LI/VN/Mode) of the last request.
    pub fn last_byte0(&self) -> u8 {
        self.state.last_byte0.load(Ordering::SeqCst)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.state.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(socket: UdpSocket, state: &State) {
    let mut buf = [0u8; 1024];
    while !state.shutdown.load(Ordering::SeqCst) {
        let Ok((len, peer)) = socket.recv_from(&mut buf) else {
            continue;
        };
        let received = Timestamp::now();
        state.requests.fetch_add(1, Ordering::SeqCst);
        if len < 48 {
            continue;
        }
        state.last_byte0.store(buf[0], Ordering::SeqCst);
        let Ok(request) = Packet::from_bytes(&buf[..len]) else {
            continue;
        };

        let behavior = *state.behavior.lock().unwrap();
        let offset = match behavior {
            Behavior::Good { offset } => offset,
            Behavior::Silent => continue,
            _ => TimestampDifference::ZERO,
        };
        let mode = if matches!(behavior, Behavior::ClientMode) { 3 } else { 4 };
        let mut reply = server_reply(request.transmit_timestamp(), received, offset, mode).to_vec();
        match behavior {
            Behavior::Short => reply.truncate(40),
            Behavior::Trailing => reply.extend_from_slice(&[0xA5; 20]),
            _ => {}
        }
        let _ = socket.send_to(&reply, peer);
    }
}

/// A stratum-2, version-4 reply to a request sent at `originate`.
pub fn server_reply(
    originate: Timestamp,
    received: Timestamp,
    offset: TimestampDifference,
    mode: u8,
) -> [u8; 48] {
    let shift = |t: Timestamp| t.checked_add(offset).unwrap();
    let transmit = shift(Timestamp::now());
    let reference = transmit
        .checked_sub(TimestampDifference::from_bits(10 << 32))
        .unwrap();

    let mut buf = [0u8; 48];
    buf[0] = (4 << 3) | mode;
    buf[1] = 2;
    buf[2] = 6;
    buf[3] = 0xEC;
    buf[4..8].copy_from_slice(&0x0000_0100u32.to_be_bytes());
    buf[8..12].copy_from_slice(&0x0000_0200u32.to_be_bytes());
    buf[12..16].copy_from_slice(&[127, 0, 0, 1]);
    buf[16..24].copy_from_slice(&reference.to_bytes());
    buf[24..32].copy_from_slice(&originate.to_bytes());
    buf[32..40].copy_from_slice(&shift(received).to_bytes());
    buf[40..48].copy_from_slice(&transmit.to_bytes());
    buf
}

/// Returns `true` if the error indicates a network-level failure that should
/// cause a live-server test to be **skipped** (not panicked).
///
/// CI runners occasionally lack DNS or outbound UDP/123 access.
pub fn is_network_skip_error(e: &NtpError) -> bool {
    match e {
        NtpError::Config(ConfigError::Resolution { .. } | ConfigError::NoAddresses { .. }) => true,
        NtpError::Transport(TransportError::Socket { source }) => {
            matches!(source.kind(), io::ErrorKind::AddrNotAvailable)
                || source.raw_os_error() == Some(101) // ENETUNREACH  (Network is unreachable)
                || source.raw_os_error() == Some(113) // EHOSTUNREACH (No route to host)
        }
        NtpError::Transport(_) => true,
        _ => false,
    }
}

/// Poll `cond` every 10 ms until it holds or `within` elapses.
pub fn wait_for(within: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}
