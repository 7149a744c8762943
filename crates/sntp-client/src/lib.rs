// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
Blocking SNTP client and background time keeper.

# Example
Queries a server once and prints the server time and the local clock offset.

```rust,no_run
use sntp_client::SntpClient;

fn main() -> Result<(), sntp_client::error::NtpError> {
    let client = SntpClient::new("time.nist.gov", sntp_client::DEFAULT_PORT)?;
    let response = client.get_time()?;
    response.validate()?;
    println!("{}", response.transmit_timestamp().to_date_time());
    println!("Offset: {:.6} seconds", response.offset_seconds()?);
    Ok(())
}
```

For a continuously corrected clock, see [`TimeKeeper`].

# Logging

The crate logs through the [`log`](https://docs.rs/log) facade and never
installs a logger: `debug!` for socket activity and keeper lifecycle,
`trace!` for each background poll and `warn!` when a background sync fails.
*/

// Re-export protocol types from sntp_proto for convenience.
pub use sntp_proto::{protocol, timestamp};
pub use sntp_proto::{KissOfDeath, LeapIndicator, Mode, Packet, Stratum, Timestamp, TimestampDifference};

/// Error types for the client and time keeper.
pub mod error;

/// Blocking one-shot SNTP exchange.
pub mod client;

/// Received replies, offset and delay computation, and sanity validation.
pub mod response;

/// Background clock-offset tracking.
pub mod timekeeper;

mod resolve;

pub use client::{DEFAULT_PORT, DEFAULT_TIMEOUT, DEFAULT_VERSION, SntpClient};
pub use error::NtpError;
pub use response::{Response, ValidationLimits};
pub use timekeeper::{
    DEFAULT_POLL_INTERVAL, KEEPER_VERSION, SyncSnapshot, TimeKeeper, TimeKeeperBuilder,
};
