// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! CLI commands

pub mod catalog;
pub mod fixture;
pub mod locator;
pub mod metadata;
pub mod org;
pub mod task;

pub use catalog::CatalogCommand;
pub use fixture::FixtureCommand;
pub use locator::LocatorCommand;
pub use metadata::MetadataCommand;
pub use org::OrgCommand;
pub use task::TaskCommand;

use anyhow::{Context, Result};
use vcd_client::{EntityAddress, Reference, TaskHandle, VcdClient};

use crate::output::{json, table};

/// Parse a URN or href given on the command line
pub fn parse_address(input: &str) -> Result<EntityAddress> {
    EntityAddress::parse(input.trim())
        .with_context(|| format!("'{}' is neither a URN nor an href", input))
}

pub fn print_references(references: &[Reference], use_json: bool) -> Result<()> {
    if use_json {
        return json::print_json(&references);
    }

    let mut tbl = table::create_table(&["NAME", "ID", "HREF"]);
    for reference in references {
        tbl.add_row(vec![
            reference.name.as_deref().unwrap_or("-"),
            reference.id.as_deref().unwrap_or("-"),
            reference.href.as_deref().unwrap_or("-"),
        ]);
    }
    table::print_table(tbl);
    Ok(())
}

/// Wait for a task unless the caller asked not to, failing on a failed task
pub async fn finish_task(client: &VcdClient, mut handle: TaskHandle, wait: bool) -> Result<()> {
    if !wait {
        println!("Task {} is {}", handle.locator(), handle.status());
        return Ok(());
    }
    client.tasks().await_success(&mut handle).await?;
    Ok(())
}
