// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! vcd - command-line client for vCloud Director

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vcd_client::{ClientConfig, Scope, VcdClient, WaitPolicy};

mod commands;
mod output;

use commands::{
    CatalogCommand, FixtureCommand, LocatorCommand, MetadataCommand, OrgCommand, TaskCommand,
};

#[derive(Parser)]
#[command(
    name = "vcd",
    version,
    about = "vCloud Director management CLI",
    long_about = "Command-line client for the vCloud Director organization, catalog, metadata, and task APIs"
)]
struct Cli {
    /// API base URL of the user view, e.g. https://vcd.example.com/api/
    #[arg(short = 'U', long, global = true, env = "VCD_URL")]
    url: Option<String>,

    /// API base URL of the admin view (defaults to <url>/admin/)
    #[arg(long, global = true, env = "VCD_ADMIN_URL")]
    admin_url: Option<String>,

    /// Session token sent with every request
    #[arg(long, global = true, env = "VCD_SESSION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Privilege scope of the session (user or admin)
    #[arg(short, long, global = true, env = "VCD_SCOPE", default_value_t = Scope::User)]
    scope: Scope,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = "VCD_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    http_timeout: u64,

    /// Delay between task polls in milliseconds
    #[arg(long, global = true, env = "VCD_TASK_POLL_INTERVAL_MS", default_value_t = 2000)]
    poll_interval: u64,

    /// Maximum time to wait for a task in seconds
    #[arg(long, global = true, env = "VCD_TASK_TIMEOUT_SECS", default_value_t = 600)]
    task_timeout: u64,

    /// Consecutive failed polls tolerated before giving up
    #[arg(long, global = true, env = "VCD_TASK_MAX_POLL_FAILURES", default_value_t = 3)]
    max_poll_failures: u32,

    /// Output as JSON
    #[arg(short, long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage organizations
    Org {
        #[command(subcommand)]
        command: OrgCommand,
    },

    /// Manage catalogs
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Manage entity metadata
    #[command(alias = "meta")]
    Metadata {
        #[command(subcommand)]
        command: MetadataCommand,
    },

    /// Inspect and wait for tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Rewrite locators between the user and admin views
    Locator {
        #[command(subcommand)]
        command: LocatorCommand,
    },

    /// Run the temporary fixture lifecycle
    Fixture {
        #[command(subcommand)]
        command: FixtureCommand,
    },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let url = non_empty(&self.url).ok_or_else(|| {
            anyhow::anyhow!("No API URL configured. Set VCD_URL or pass --url")
        })?;

        let policy = WaitPolicy::new(
            Duration::from_millis(self.poll_interval),
            Duration::from_secs(self.task_timeout),
        )
        .with_max_poll_failures(self.max_poll_failures);

        let mut config = ClientConfig::new(url)?
            .with_scope(self.scope)
            .with_wait_policy(policy);
        config.http_timeout = Duration::from_secs(self.http_timeout);

        if let Some(admin_url) = non_empty(&self.admin_url) {
            config = config.with_admin_url(admin_url)?;
        }
        if let Some(token) = non_empty(&self.token) {
            config = config.with_session_token(token);
        }
        Ok(config)
    }

    fn build_client(&self) -> Result<VcdClient> {
        Ok(VcdClient::new(&self.client_config()?)?)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("vcd=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vcd=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Org { command } => {
            let client = cli.build_client()?;
            command.clone().run(&client, cli.json).await
        }
        Commands::Catalog { command } => {
            let client = cli.build_client()?;
            command.clone().run(&client, cli.json).await
        }
        Commands::Metadata { command } => {
            let client = cli.build_client()?;
            command.clone().run(&client, cli.json).await
        }
        Commands::Task { command } => {
            let client = cli.build_client()?;
            command.clone().run(&client, cli.json).await
        }
        Commands::Locator { command } => {
            let context = cli.client_config()?.privilege_context()?;
            command.clone().run(&context)
        }
        Commands::Fixture { command } => {
            let client = cli.build_client()?;
            command.clone().run(&client, cli.json).await
        }
    }
}
