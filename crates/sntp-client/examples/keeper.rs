// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Keep a corrected clock against one server and print it every few seconds.
//!
//! ```text
//! cargo run -p sntp_kit-client --example keeper -- [host] [poll-seconds]
//! ```

use std::thread;
use std::time::Duration;

use sntp_client::{DEFAULT_POLL_INTERVAL, TimeKeeper};

fn main() -> Result<(), sntp_client::NtpError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "pool.ntp.org".to_owned());
    let poll = args
        .next()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL);

    let keeper = TimeKeeper::builder()
        .timeout(Duration::from_secs(5))
        .on_success(|s| println!("sync: offset {} stratum {}", s.offset, s.stratum))
        .on_failure(|e| eprintln!("sync failed: {e}"))
        .build();
    keeper.start(&host, poll)?;

    for _ in 0..10 {
        println!(
            "adjusted {}  (offset {}, {:?} since last sync)",
            keeper.adjusted_now(),
            keeper.offset(),
            keeper.time_since_last_sync().map(|d| d.num_seconds()),
        );
        thread::sleep(Duration::from_secs(5));
    }
    keeper.stop();
    Ok(())
}
