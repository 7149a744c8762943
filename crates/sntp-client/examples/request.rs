// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Query one SNTP server and print the decoded reply.
//!
//! ```text
//! cargo run -p sntp_kit-client --example request -- [host] [port]
//! RUST_LOG=debug cargo run -p sntp_kit-client --example request
//! ```

use std::time::Duration;

use chrono::Local;
use sntp_client::{DEFAULT_PORT, SntpClient};

fn main() -> Result<(), sntp_client::NtpError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "time.nist.gov".to_owned());
    let port = args
        .next()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let mut client = SntpClient::new(&host, port)?;
    client.set_timeout(Duration::from_secs(5))?;
    client.set_version(4)?;
    println!("Querying {} ({})...", host, client.server_addr());

    let response = client.get_time()?;
    match response.validate() {
        Ok(()) => println!("  Reply passed validation"),
        Err(e) => println!("  Reply failed validation: {e}"),
    }
    if let Some(code) = response.kiss_code() {
        println!("  Kiss-o'-Death: {code}");
    }

    println!("  Version: {}", response.version());
    println!("  Stratum: {}", response.stratum());
    println!("  Leap: {:?}", response.leap_indicator());
    println!("  Precision: 2^{} s", response.precision());
    println!("  Root delay: {:.3} ms", response.root_delay());
    println!("  Root dispersion: {:.3} ms", response.root_dispersion());
    println!(
        "  Server time: {}",
        response
            .transmit_timestamp()
            .to_date_time()
            .with_timezone(&Local)
    );
    println!("  Offset: {:+.6} s", response.offset_seconds()?);
    println!(
        "  Delay: {:.6} s",
        response.round_trip_delay()?.total_seconds()
    );
    Ok(())
}
