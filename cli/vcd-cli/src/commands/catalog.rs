// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Catalog commands

use anyhow::Result;
use clap::{Args, Subcommand};
use vcd_client::{Catalog, EntityKind, NewCatalog, VcdClient};

use super::{finish_task, parse_address, print_references};
use crate::output::{json, table};

#[derive(Subcommand, Clone)]
pub enum CatalogCommand {
    /// List catalogs of every visible organization
    #[command(visible_alias = "ls")]
    List,
    /// Show a catalog
    Get(CatalogArgs),
    /// Create a catalog in an organization (admin)
    Create(CatalogCreateArgs),
    /// Delete a catalog (admin)
    #[command(visible_alias = "rm")]
    Delete(CatalogDeleteArgs),
}

#[derive(Args, Clone)]
pub struct CatalogArgs {
    /// Catalog URN or href
    pub catalog: String,
}

#[derive(Args, Clone)]
pub struct CatalogCreateArgs {
    /// Organization URN or href
    pub org: String,

    /// Catalog name
    pub name: String,

    /// Catalog description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Return once the request is accepted instead of waiting for the task
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Clone)]
pub struct CatalogDeleteArgs {
    /// Catalog URN or href
    pub catalog: String,

    /// Return once the request is accepted instead of waiting for the task
    #[arg(long)]
    pub no_wait: bool,
}

impl CatalogCommand {
    pub async fn run(self, client: &VcdClient, use_json: bool) -> Result<()> {
        match self {
            Self::List => {
                let catalogs = client.list_entities(EntityKind::Catalog).await?;
                print_references(&catalogs, use_json)
            }
            Self::Get(args) => {
                let catalog = client.catalogs().get(&parse_address(&args.catalog)?).await?;
                if use_json {
                    json::print_json(&catalog)
                } else {
                    print_catalog(&catalog);
                    Ok(())
                }
            }
            Self::Create(args) => create_catalog(args, client, use_json).await,
            Self::Delete(args) => {
                let address = parse_address(&args.catalog)?;
                let handle = client.catalogs().delete(&address).await?;
                finish_task(client, handle, !args.no_wait).await?;
                if !args.no_wait {
                    println!("Deleted catalog {}", args.catalog);
                }
                Ok(())
            }
        }
    }
}

async fn create_catalog(args: CatalogCreateArgs, client: &VcdClient, use_json: bool) -> Result<()> {
    let org = parse_address(&args.org)?;
    let mut params = NewCatalog::new(&args.name);
    if let Some(description) = &args.description {
        params = params.with_description(description);
    }

    let created = client.catalogs().create_in_org(&org, &params).await?;
    if let Some(handle) = created.task {
        finish_task(client, handle, !args.no_wait).await?;
    }

    if use_json {
        json::print_json(&created.catalog)
    } else {
        println!("Created catalog {} ({})", created.catalog.name, created.catalog.id);
        Ok(())
    }
}

fn print_catalog(catalog: &Catalog) {
    let owner = catalog
        .owner
        .as_ref()
        .and_then(|o| o.name.clone().or_else(|| o.href.clone()))
        .unwrap_or_else(|| "-".to_string());
    table::print_table(table::create_detail_table(&[
        ("NAME", catalog.name.clone()),
        ("ID", catalog.id.clone()),
        ("HREF", catalog.href.clone()),
        (
            "DESCRIPTION",
            catalog.description.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("PUBLISHED", catalog.is_published.to_string()),
        ("OWNER", owner),
        ("PENDING TASKS", catalog.tasks.len().to_string()),
    ]));
}
