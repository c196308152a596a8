// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! vCloud Director client
//!
//! A typed client for the organization, catalog, metadata, and task
//! resources of the vCloud Director REST API.
//!
//! - [`ReferenceResolver`] turns URNs and hrefs into locators
//! - [`PrivilegeContext`] maps locators between the user and admin views
//!   and gates admin-only mutations
//! - [`TaskMonitor`] polls the task returned by every mutation
//! - [`LifecycleCoordinator`] sets up and tears down temporary fixtures
//!
//! # Example
//!
//! ```no_run
//! use vcd_client::{ClientConfig, EntityAddress, MetadataChange, VcdClient};
//!
//! # async fn example() -> vcd_client::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let client = VcdClient::new(&config)?;
//!
//! let orgs = client.orgs().list().await?;
//! if let Some(first) = orgs.first() {
//!     let org = client.orgs().get(&EntityAddress::try_from(first)?).await?;
//!     let locator = vcd_client::Locator::parse(&org.href)?;
//!     let outcome = client
//!         .mutate_metadata(&locator, "owner", MetadataChange::Set("ops".into()))
//!         .await?;
//!     println!("{}", outcome.status());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
mod codec;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metadata;
pub mod org;
pub mod reference;
pub mod scope;
pub mod task;
pub mod transport;

pub use catalog::{CatalogApi, CreatedCatalog};
pub use client::{Entity, MetadataChange, VcdClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use lifecycle::{
    FixtureCheck, FixtureSpec, FixtureState, Fixtures, LifecycleCoordinator, LifecyclePhase,
    LifecycleResult, TeardownReport,
};
pub use metadata::MetadataApi;
pub use org::OrgApi;
pub use reference::{EntityAddress, Locator, ReferenceResolver};
pub use scope::{PrivilegeContext, Scope};
pub use task::{TaskHandle, TaskMonitor, TerminalOutcome, WaitPolicy};
pub use transport::{HttpTransport, Transport};

// Re-export wire types so callers need only this crate
pub use vcd_api::{
    Catalog, EntityKind, Metadata, MetadataSet, NewCatalog, Org, Reference, Task, TaskError,
    TaskStatus, Urn,
};
