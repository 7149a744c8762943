// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Background clock-offset tracking.
//!
//! A [`TimeKeeper`] queries one server on a dedicated thread at a fixed poll
//! interval and keeps the latest offset, stratum and server transmit time as a
//! single [`SyncSnapshot`]. Any thread can read the adjusted clock while the
//! worker runs.
//!
//! # Architecture
//!
//! The snapshot lives behind `Arc<RwLock<Option<SyncSnapshot>>>` and is
//! replaced whole on every successful sync, so readers never see fields from
//! two different replies. The worker waits on `mpsc::Receiver::recv_timeout`:
//! the timeout drives the next poll, and a stop message (or the sender being
//! dropped) wakes it immediately. Stop is checked between exchanges, never
//! during one.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), sntp_client::error::NtpError> {
//! use std::time::Duration;
//! use sntp_client::TimeKeeper;
//!
//! let keeper = TimeKeeper::builder()
//!     .timeout(Duration::from_secs(5))
//!     .on_failure(|e| eprintln!("sync failed: {e}"))
//!     .build();
//! keeper.start("time.nist.gov", Duration::from_secs(64))?;
//! println!("adjusted now: {}", keeper.adjusted_now());
//! keeper.stop();
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::mem;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, trace, warn};
use sntp_proto::{Stratum, TimestampDifference};

use crate::client::{DEFAULT_PORT, DEFAULT_TIMEOUT, SntpClient};
use crate::error::{ConfigError, NtpError};

/// Protocol version the keeper sends.
pub const KEEPER_VERSION: u8 = 4;

/// Default interval between background syncs.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

type SuccessHook = Box<dyn Fn(&SyncSnapshot) + Send + Sync>;
type FailureHook = Box<dyn Fn(&NtpError) + Send + Sync>;

/// The result of one successful sync.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncSnapshot {
    /// Clock offset; positive when the local clock is behind the server.
    pub offset: TimestampDifference,
    /// Stratum the server reported.
    pub stratum: Stratum,
    /// The server's transmit timestamp (T3) as civil time.
    pub transmit_time: DateTime<Utc>,
}

/// Builder for configuring and creating a [`TimeKeeper`].
pub struct TimeKeeperBuilder {
    port: u16,
    timeout: Duration,
    on_success: Option<SuccessHook>,
    on_failure: Option<FailureHook>,
}

impl TimeKeeperBuilder {
    fn new() -> Self {
        TimeKeeperBuilder {
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            on_success: None,
            on_failure: None,
        }
    }

    /// Server port (default 123).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Receive timeout for each exchange (default 30 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Called after every successful sync, on the thread that performed it.
    pub fn on_success(mut self, hook: impl Fn(&SyncSnapshot) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    /// Called when a background sync fails. The previous snapshot is kept.
    pub fn on_failure(mut self, hook: impl Fn(&NtpError) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Box::new(hook));
        self
    }

    /// Create the keeper. Nothing runs until [`TimeKeeper::start`].
    pub fn build(self) -> TimeKeeper {
        TimeKeeper {
            port: self.port,
            timeout: self.timeout,
            shared: Arc::new(Shared {
                state: RwLock::new(None),
                on_success: self.on_success,
                on_failure: self.on_failure,
            }),
            slot: Mutex::new(Slot::Idle),
        }
    }
}

struct Shared {
    state: RwLock<Option<SyncSnapshot>>,
    on_success: Option<SuccessHook>,
    on_failure: Option<FailureHook>,
}

impl Shared {
    fn sync(&self, client: &SntpClient) -> Result<SyncSnapshot, NtpError> {
        let response = client.get_time()?;
        let snapshot = SyncSnapshot {
            offset: response.offset()?,
            stratum: response.stratum(),
            transmit_time: response.transmit_timestamp().to_date_time(),
        };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        debug!(
            "synced with {}: offset {}, stratum {}",
            client.server_addr(),
            snapshot.offset,
            snapshot.stratum
        );
        if let Some(hook) = &self.on_success {
            hook(&snapshot);
        }
        Ok(snapshot)
    }

    fn snapshot(&self) -> Option<SyncSnapshot> {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Worker {
    handle: JoinHandle<()>,
    stop_tx: Sender<()>,
}

enum Slot {
    Idle,
    Starting,
    Running(Worker),
}

/// Keeps a running clock-offset estimate against one server.
///
/// At most one background worker runs per keeper. Dropping a running keeper
/// stops and joins its worker.
pub struct TimeKeeper {
    port: u16,
    timeout: Duration,
    shared: Arc<Shared>,
    slot: Mutex<Slot>,
}

impl TimeKeeper {
    /// Create a new builder with default configuration.
    pub fn builder() -> TimeKeeperBuilder {
        TimeKeeperBuilder::new()
    }

    /// Sync once with `host`, then keep syncing every `poll_interval` on a
    /// background thread.
    ///
    /// The first sync runs on the calling thread and its error aborts the
    /// start. Fails with [`NtpError::AlreadyRunning`] while a worker is active
    /// or another start is still in its first sync.
    pub fn start(&self, host: &str, poll_interval: Duration) -> Result<(), NtpError> {
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval.into());
        }
        {
            let mut slot = self.lock_slot();
            if !matches!(*slot, Slot::Idle) {
                return Err(NtpError::AlreadyRunning);
            }
            *slot = Slot::Starting;
        }

        // Runs without the slot lock.
        let result = self.launch(host, poll_interval);

        let mut slot = self.lock_slot();
        match result {
            Ok(worker) => {
                debug!("time keeper started for {host}, polling every {poll_interval:?}");
                *slot = Slot::Running(worker);
                Ok(())
            }
            Err(e) => {
                *slot = Slot::Idle;
                Err(e)
            }
        }
    }

    fn launch(&self, host: &str, poll_interval: Duration) -> Result<Worker, NtpError> {
        let mut client = SntpClient::new(host, self.port)?;
        client.set_version(KEEPER_VERSION)?;
        client.set_timeout(self.timeout)?;
        self.shared.sync(&client)?;

        let (stop_tx, stop_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(format!("sntp-keeper-{host}"))
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(poll_interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            trace!("polling {}", client.server_addr());
                            if let Err(e) = shared.sync(&client) {
                                warn!("sync with {} failed: {}", client.server_addr(), e);
                                if let Some(hook) = &shared.on_failure {
                                    hook(&e);
                                }
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("time keeper worker for {} exiting", client.host());
            })
            .map_err(NtpError::Spawn)?;
        Ok(Worker { handle, stop_tx })
    }

    /// Signal the worker and wait for it to exit. A no-op when idle.
    ///
    /// A start still in its first sync is not interrupted.
    pub fn stop(&self) {
        let worker = {
            let mut slot = self.lock_slot();
            match mem::replace(&mut *slot, Slot::Idle) {
                Slot::Running(worker) => Some(worker),
                other => {
                    *slot = other;
                    None
                }
            }
        };
        if let Some(Worker { handle, stop_tx }) = worker {
            // A send error means the worker already exited.
            let _ = stop_tx.send(());
            if handle.join().is_err() {
                warn!("time keeper worker panicked");
            }
            debug!("time keeper stopped");
        }
    }

    /// Whether a background worker is active.
    pub fn is_running(&self) -> bool {
        matches!(*self.lock_slot(), Slot::Running(_))
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The latest snapshot, if any sync has succeeded.
    pub fn snapshot(&self) -> Option<SyncSnapshot> {
        self.shared.snapshot()
    }

    /// Current offset estimate; zero before the first sync.
    pub fn offset(&self) -> TimestampDifference {
        self.snapshot()
            .map_or(TimestampDifference::ZERO, |s| s.offset)
    }

    /// System time corrected by the current offset.
    pub fn adjusted_now(&self) -> DateTime<Utc> {
        Utc::now() + self.offset().to_duration()
    }

    /// [`TimeKeeper::adjusted_now`] as nanoseconds since the Unix epoch.
    ///
    /// Saturates at `i64::MAX` past the year 2262.
    pub fn adjusted_now_ticks(&self) -> i64 {
        self.adjusted_now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }

    /// Stratum reported by the last successful sync.
    pub fn last_stratum(&self) -> Option<Stratum> {
        self.snapshot().map(|s| s.stratum)
    }

    /// Server transmit time of the last successful sync.
    pub fn last_transmit_time(&self) -> Option<DateTime<Utc>> {
        self.snapshot().map(|s| s.transmit_time)
    }

    /// Time elapsed since the last sync, measured on the adjusted clock:
    /// `now - last transmit time + offset`.
    pub fn time_since_last_sync(&self) -> Option<TimeDelta> {
        self.snapshot()
            .map(|s| Utc::now() - s.transmit_time + s.offset.to_duration())
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        TimeKeeper::builder().build()
    }
}

impl Drop for TimeKeeper {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for TimeKeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeKeeper")
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("running", &self.is_running())
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
