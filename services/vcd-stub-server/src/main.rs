// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Standalone stub vCloud Director server for testing and development
//!
//! Run with:
//! ```bash
//! cargo run -p vcd-stub-server
//! ```
//!
//! Then point the CLI at it:
//! ```bash
//! VCD_URL=http://localhost:9191/api/ VCD_SCOPE=admin cargo run -p vcd-cli -- org list
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vcd_stub_server::{SEED_ORG_ID, StubConfig, start};

#[derive(Parser, Debug)]
#[command(name = "vcd-stub-server", about = "In-memory vCloud Director stub")]
struct Args {
    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    address: IpAddr,

    /// Port to listen on
    #[arg(long, short, default_value_t = 9191)]
    port: u16,

    /// Polls a task needs before it completes
    #[arg(long, default_value_t = 2)]
    polls_to_complete: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let stub = start(
        SocketAddr::new(args.address, args.port),
        StubConfig {
            polls_to_complete: args.polls_to_complete,
        },
    )?;

    tracing::info!("Stub vCloud Director listening on {}", stub.api_url());
    tracing::info!("Seeded organization: urn:vcloud:org:{}", SEED_ORG_ID);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    stub.close().await
}
