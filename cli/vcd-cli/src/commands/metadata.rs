// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Metadata commands for organizations, catalogs, and other entities

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use vcd_client::{Locator, MetadataChange, MetadataSet, VcdClient};

use super::parse_address;
use crate::output::{json, table};

#[derive(Subcommand, Clone)]
pub enum MetadataCommand {
    /// List metadata of an entity
    #[command(visible_alias = "ls")]
    List(MetadataListArgs),
    /// Get a metadata value
    Get(MetadataGetArgs),
    /// Set one or more metadata entries
    Set(MetadataSetArgs),
    /// Delete a metadata entry, or all of them
    #[command(visible_alias = "rm")]
    Delete(MetadataDeleteArgs),
}

#[derive(Args, Clone)]
pub struct MetadataListArgs {
    /// Entity URN or href
    pub entity: String,
}

#[derive(Args, Clone)]
pub struct MetadataGetArgs {
    /// Entity URN or href
    pub entity: String,

    /// Metadata key
    pub key: String,
}

#[derive(Args, Clone)]
pub struct MetadataSetArgs {
    /// Entity URN or href
    pub entity: String,

    /// Entries as key=value
    #[arg(required = true)]
    pub entries: Vec<String>,
}

#[derive(Args, Clone)]
pub struct MetadataDeleteArgs {
    /// Entity URN or href
    pub entity: String,

    /// Metadata key
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub key: Option<String>,

    /// Delete every entry
    #[arg(long)]
    pub all: bool,
}

impl MetadataCommand {
    pub async fn run(self, client: &VcdClient, use_json: bool) -> Result<()> {
        match self {
            Self::List(args) => list_metadata(args, client, use_json).await,
            Self::Get(args) => {
                let locator = entity_locator(&args.entity, client).await?;
                let value = client.metadata().get_value(&locator, &args.key).await?;
                println!("{}", value);
                Ok(())
            }
            Self::Set(args) => set_metadata(args, client).await,
            Self::Delete(args) => delete_metadata(args, client).await,
        }
    }
}

async fn entity_locator(entity: &str, client: &VcdClient) -> Result<Locator> {
    let address = parse_address(entity)?;
    Ok(client.resolver().resolve_address(&address).await?)
}

async fn list_metadata(args: MetadataListArgs, client: &VcdClient, use_json: bool) -> Result<()> {
    let locator = entity_locator(&args.entity, client).await?;
    let entries: BTreeMap<String, String> =
        client.metadata().get_all(&locator).await?.into_iter().collect();

    if use_json {
        json::print_json(&entries)
    } else {
        let mut tbl = table::create_table(&["KEY", "VALUE"]);
        for (key, value) in &entries {
            tbl.add_row(vec![key.clone(), table::truncate(value, 60)]);
        }
        table::print_table(tbl);
        Ok(())
    }
}

fn parse_entries(raw: &[String]) -> Result<MetadataSet> {
    let mut entries = MetadataSet::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            anyhow::bail!("Invalid metadata format '{}', expected key=value", entry);
        };
        if key.is_empty() {
            anyhow::bail!("Invalid metadata format '{}', key is empty", entry);
        }
        entries.insert(key.to_string(), value.to_string());
    }
    Ok(entries)
}

async fn set_metadata(args: MetadataSetArgs, client: &VcdClient) -> Result<()> {
    let mut entries = parse_entries(&args.entries)?;
    let locator = entity_locator(&args.entity, client).await?;

    if entries.len() == 1 {
        if let Some((key, value)) = entries.drain().next() {
            client
                .mutate_metadata(&locator, &key, MetadataChange::Set(value))
                .await?
                .into_result()?;
            println!("Set metadata {}", key);
        }
        return Ok(());
    }

    let mut handle = client.metadata().merge(&locator, &entries).await?;
    client.tasks().await_success(&mut handle).await?;
    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort();
    for key in keys {
        println!("Set metadata {}", key);
    }
    Ok(())
}

async fn delete_metadata(args: MetadataDeleteArgs, client: &VcdClient) -> Result<()> {
    let locator = entity_locator(&args.entity, client).await?;

    match args.key {
        Some(key) => {
            client
                .mutate_metadata(&locator, &key, MetadataChange::Delete)
                .await?
                .into_result()?;
            println!("Deleted metadata {}", key);
        }
        None => {
            let handles = client.metadata().delete_all(&locator).await?;
            let count = handles.len();
            for mut handle in handles {
                client.tasks().await_success(&mut handle).await?;
            }
            println!("Deleted {} metadata entries", count);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_split_on_first_equals() {
        let entries = parse_entries(&["url=http://x/?a=b".to_string()]).unwrap();
        assert_eq!(entries.get("url").map(String::as_str), Some("http://x/?a=b"));
    }

    #[test]
    fn entries_without_equals_are_rejected() {
        assert!(parse_entries(&["novalue".to_string()]).is_err());
        assert!(parse_entries(&["=value".to_string()]).is_err());
    }
}
