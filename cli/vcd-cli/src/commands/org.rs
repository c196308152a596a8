// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Organization commands

use anyhow::Result;
use clap::{Args, Subcommand};
use vcd_client::{Entity, EntityKind, Org, VcdClient};

use super::{parse_address, print_references};
use crate::output::{json, table};

#[derive(Subcommand, Clone)]
pub enum OrgCommand {
    /// List organizations visible to the session
    #[command(visible_alias = "ls")]
    List,
    /// Show an organization
    Get(OrgArgs),
    /// List an organization's catalogs, including unpublished ones (admin)
    Catalogs(OrgArgs),
}

#[derive(Args, Clone)]
pub struct OrgArgs {
    /// Organization URN or href
    pub org: String,
}

impl OrgCommand {
    pub async fn run(self, client: &VcdClient, use_json: bool) -> Result<()> {
        match self {
            Self::List => {
                let orgs = client.list_entities(EntityKind::Organization).await?;
                print_references(&orgs, use_json)
            }
            Self::Get(args) => get_org(args, client, use_json).await,
            Self::Catalogs(args) => {
                let address = parse_address(&args.org)?;
                let catalogs = client.catalogs().list_in_org(&address).await?;
                print_references(&catalogs, use_json)
            }
        }
    }
}

async fn get_org(args: OrgArgs, client: &VcdClient, use_json: bool) -> Result<()> {
    let address = parse_address(&args.org)?;
    let org = match client
        .get_entity(EntityKind::Organization, &address)
        .await?
    {
        Entity::Org(org) => org,
        Entity::Catalog(catalog) => {
            anyhow::bail!("{} is a catalog, not an organization", catalog.href)
        }
    };

    if use_json {
        json::print_json(&org)
    } else {
        print_org(&org);
        Ok(())
    }
}

fn print_org(org: &Org) {
    let catalogs: Vec<&str> = org
        .catalogs
        .iter()
        .filter_map(|c| c.name.as_deref())
        .collect();
    table::print_table(table::create_detail_table(&[
        ("NAME", org.name.clone()),
        ("FULL NAME", org.full_name.clone()),
        ("ID", org.id.clone()),
        ("HREF", org.href.clone()),
        (
            "DESCRIPTION",
            org.description.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("CATALOGS", catalogs.join(", ")),
        ("VDCS", org.vdcs.len().to_string()),
    ]));
}
