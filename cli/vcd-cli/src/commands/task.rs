// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Task commands

use anyhow::Result;
use clap::{Args, Subcommand};
use vcd_client::{Task, TaskHandle, VcdClient};

use super::parse_address;
use crate::output::{json, table};

#[derive(Subcommand, Clone)]
pub enum TaskCommand {
    /// Show the current state of a task
    Get(TaskArgs),
    /// Wait for a task to reach a terminal state
    Wait(TaskArgs),
}

#[derive(Args, Clone)]
pub struct TaskArgs {
    /// Task URN or href
    pub task: String,
}

impl TaskCommand {
    pub async fn run(self, client: &VcdClient, use_json: bool) -> Result<()> {
        match self {
            Self::Get(args) => {
                let task = fetch(&args.task, client).await?;
                print_task(&task, use_json)
            }
            Self::Wait(args) => {
                let task = fetch(&args.task, client).await?;
                let mut handle = TaskHandle::from_task(task)?;
                let outcome = client.tasks().await_terminal(&mut handle).await?;
                print_task(outcome.task(), use_json)?;
                outcome.into_result()?;
                Ok(())
            }
        }
    }
}

async fn fetch(task: &str, client: &VcdClient) -> Result<Task> {
    let address = parse_address(task)?;
    let locator = client.resolver().resolve_address(&address).await?;
    Ok(client.tasks().fetch(&locator).await?)
}

fn print_task(task: &Task, use_json: bool) -> Result<()> {
    if use_json {
        return json::print_json(task);
    }

    let mut rows = vec![
        ("ID", task.id.clone()),
        ("OPERATION", task.operation_name.clone()),
        ("STATUS", task.status.to_string()),
        ("STARTED", task.start_time.to_rfc3339()),
    ];
    if let Some(end) = task.end_time {
        rows.push(("FINISHED", end.to_rfc3339()));
    }
    if let Some(error) = &task.error {
        rows.push((
            "ERROR",
            format!("{} ({})", error.message, error.minor_error_code),
        ));
    }
    table::print_table(table::create_detail_table(&rows));
    Ok(())
}
