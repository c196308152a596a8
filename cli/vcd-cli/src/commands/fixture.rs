// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Fixture lifecycle: set up temporary fixtures, verify them, tear down

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use vcd_client::{
    FixtureCheck, FixtureSpec, FixtureState, NewCatalog, TeardownReport, VcdClient,
};

use super::parse_address;
use crate::output::json;

#[derive(Subcommand, Clone)]
pub enum FixtureCommand {
    /// Run setup, verification, and teardown against an organization (admin)
    Run(FixtureRunArgs),
}

#[derive(Args, Clone)]
pub struct FixtureRunArgs {
    /// Organization URN or href
    pub org: String,

    /// Metadata key written during setup
    #[arg(long, default_value = "KEY")]
    pub key: String,

    /// Metadata value written during setup
    #[arg(long, default_value = "VALUE")]
    pub value: String,

    /// Name of the temporary catalog (defaults to a timestamped name)
    #[arg(long)]
    pub catalog_name: Option<String>,
}

#[derive(Serialize)]
struct FixtureReport<'a> {
    state: &'a FixtureState,
    check: Option<&'a FixtureCheck>,
    error: Option<String>,
    teardown: &'a TeardownReport,
}

impl FixtureCommand {
    pub async fn run(self, client: &VcdClient, use_json: bool) -> Result<()> {
        match self {
            Self::Run(args) => run_fixtures(args, client, use_json).await,
        }
    }
}

async fn run_fixtures(args: FixtureRunArgs, client: &VcdClient, use_json: bool) -> Result<()> {
    let mut spec = FixtureSpec::new(parse_address(&args.org)?).with_metadata(args.key, args.value);
    if let Some(name) = args.catalog_name {
        spec = spec.with_catalog(
            NewCatalog::new(name).with_description("created by fixture lifecycle"),
        );
    }

    let result = client.run_lifecycle(&spec).await;

    if use_json {
        json::print_json(&FixtureReport {
            state: &result.state,
            check: result.outcome.as_ref().ok(),
            error: result.outcome.as_ref().err().map(ToString::to_string),
            teardown: &result.teardown,
        })?;
    } else {
        if let Ok(check) = &result.outcome {
            println!(
                "Metadata value: {} ({})",
                check.metadata_value,
                if check.metadata_matches { "matches" } else { "MISMATCH" }
            );
            println!(
                "Catalog listed: {}",
                if check.catalog_listed { "yes" } else { "NO" }
            );
        }
        for released in &result.teardown.released {
            println!("Released {}", released);
        }
        for warning in &result.teardown.warnings {
            eprintln!("warning: {}", warning);
        }
    }

    let check = result.outcome?;
    if !check.metadata_matches || !check.catalog_listed {
        anyhow::bail!("fixture verification failed");
    }
    if !result.teardown.is_clean() {
        anyhow::bail!("teardown left fixtures behind");
    }
    Ok(())
}
