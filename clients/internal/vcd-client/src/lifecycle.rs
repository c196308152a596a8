// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Fixture lifecycle
//!
//! Sets up temporary admin fixtures on an organization, runs a workflow body
//! against them, and tears them down again:
//!
//! 1. resolve the organization and move to its admin view
//! 2. write one metadata entry and wait for its task to succeed
//! 3. create a catalog in the organization and wait for its task
//! 4. run the body
//! 5. delete the metadata entry and the catalog, independently
//!
//! Each fixture is recorded in [`FixtureState`] as soon as the server has
//! accepted its creation. Teardown releases exactly the recorded fixtures,
//! so it also runs after a partial setup. Teardown failures become warnings
//! in the [`TeardownReport`] and never replace the workflow outcome.

use std::future::Future;

use chrono::Utc;
use serde::Serialize;
use vcd_api::{NewCatalog, Reference};

use crate::client::VcdClient;
use crate::error::{Error, Result};
use crate::reference::{EntityAddress, Locator};

/// What to create
#[derive(Debug, Clone)]
pub struct FixtureSpec {
    pub org: EntityAddress,
    pub metadata_key: String,
    pub metadata_value: String,
    pub catalog: NewCatalog,
}

impl FixtureSpec {
    pub fn new(org: EntityAddress) -> Self {
        let name = format!("Test Catalog {}", Utc::now().format("%Y%m%d-%H%M%S"));
        Self {
            org,
            metadata_key: "KEY".to_string(),
            metadata_value: "VALUE".to_string(),
            catalog: NewCatalog::new(name).with_description("created by fixture lifecycle"),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata_key = key.into();
        self.metadata_value = value.into();
        self
    }

    pub fn with_catalog(mut self, catalog: NewCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecyclePhase {
    NotSetup,
    SetupInProgress,
    SetupComplete,
    TeardownAttempted,
}

/// Fixtures recorded so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureState {
    pub phase: LifecyclePhase,
    /// Admin-view locator of the organization
    pub org: Option<Locator>,
    /// Set once the metadata write was accepted
    pub metadata_key: Option<String>,
    /// Set once the catalog creation was accepted
    pub catalog: Option<Reference>,
}

impl Default for FixtureState {
    fn default() -> Self {
        Self {
            phase: LifecyclePhase::NotSetup,
            org: None,
            metadata_key: None,
            catalog: None,
        }
    }
}

/// Fully set-up fixtures, handed to the workflow body
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub org: Locator,
    pub metadata_key: String,
    pub metadata_value: String,
    pub catalog: Reference,
}

/// Result of the default verification body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureCheck {
    pub metadata_value: String,
    pub metadata_matches: bool,
    pub catalog_listed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub released: Vec<String>,
    pub warnings: Vec<String>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Debug)]
pub struct LifecycleResult<T> {
    pub state: FixtureState,
    pub outcome: Result<T>,
    pub teardown: TeardownReport,
}

pub struct LifecycleCoordinator<'a> {
    client: &'a VcdClient,
}

impl<'a> LifecycleCoordinator<'a> {
    pub(crate) fn new(client: &'a VcdClient) -> Self {
        Self { client }
    }

    /// Set up, run `body`, tear down
    ///
    /// A setup failure becomes the outcome and `body` is not run.
    pub async fn run<T, F, Fut>(&self, spec: &FixtureSpec, body: F) -> LifecycleResult<T>
    where
        F: FnOnce(Fixtures) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut state = FixtureState::default();

        let outcome = match self.setup(spec, &mut state).await {
            Ok(fixtures) => body(fixtures).await,
            Err(e) => {
                tracing::warn!(phase = ?state.phase, error = %e, "fixture setup failed");
                Err(e)
            }
        };

        let teardown = self.teardown(&mut state).await;
        LifecycleResult {
            state,
            outcome,
            teardown,
        }
    }

    /// Run with a body that reads the fixtures back
    pub async fn run_with_check(&self, spec: &FixtureSpec) -> LifecycleResult<FixtureCheck> {
        let client = self.client;
        self.run(spec, |fixtures| async move {
            let value = client
                .metadata()
                .get_value(&fixtures.org, &fixtures.metadata_key)
                .await?;
            let catalogs = client
                .catalogs()
                .list_in_org(&EntityAddress::Locator(fixtures.org.clone()))
                .await?;
            let catalog_listed = catalogs
                .iter()
                .any(|c| c.id.is_some() && c.id == fixtures.catalog.id);

            Ok::<_, Error>(FixtureCheck {
                metadata_matches: value == fixtures.metadata_value,
                metadata_value: value,
                catalog_listed,
            })
        })
        .await
    }

    pub async fn setup(&self, spec: &FixtureSpec, state: &mut FixtureState) -> Result<Fixtures> {
        let context = self.client.context();
        context.require_admin("fixture setup")?;

        state.phase = LifecyclePhase::SetupInProgress;
        tracing::info!(org = %spec.org, "setting up fixtures");

        let org = self.client.resolver().resolve_address(&spec.org).await?;
        let org = context.to_admin_locator(&org)?;
        state.org = Some(org.clone());

        let mut task = self
            .client
            .metadata()
            .put_entry(&org, &spec.metadata_key, &spec.metadata_value)
            .await?;
        state.metadata_key = Some(spec.metadata_key.clone());
        self.client.tasks().await_success(&mut task).await?;

        let created = self
            .client
            .catalogs()
            .create_in_org(&EntityAddress::Locator(org.clone()), &spec.catalog)
            .await?;
        let catalog = created.catalog.reference();
        state.catalog = Some(catalog.clone());
        if let Some(mut task) = created.task {
            self.client.tasks().await_success(&mut task).await?;
        }

        state.phase = LifecyclePhase::SetupComplete;
        tracing::info!(org = %org, catalog = %created.catalog.href, "fixtures ready");

        Ok(Fixtures {
            org,
            metadata_key: spec.metadata_key.clone(),
            metadata_value: spec.metadata_value.clone(),
            catalog,
        })
    }

    /// Release every recorded fixture; never fails
    pub async fn teardown(&self, state: &mut FixtureState) -> TeardownReport {
        let mut report = TeardownReport::default();
        if state.phase == LifecyclePhase::NotSetup {
            return report;
        }

        if let (Some(org), Some(key)) = (&state.org, &state.metadata_key) {
            let label = format!("metadata '{}' on {}", key, org);
            match self.release_metadata(org, key).await {
                Ok(()) => report.released.push(label),
                Err(Error::KeyNotFound { .. }) => {
                    tracing::debug!(fixture = %label, "already absent");
                    report.released.push(label);
                }
                Err(e) => {
                    tracing::warn!(fixture = %label, error = %e, "teardown step failed");
                    report.warnings.push(format!("{}: {}", label, e));
                }
            }
        }

        if let Some(catalog) = &state.catalog {
            let label = format!(
                "catalog {}",
                catalog.name.as_deref().unwrap_or("(unnamed)")
            );
            match self.release_catalog(catalog).await {
                Ok(()) => report.released.push(label),
                Err(Error::NotFound { .. }) => {
                    tracing::debug!(fixture = %label, "already absent");
                    report.released.push(label);
                }
                Err(e) => {
                    tracing::warn!(fixture = %label, error = %e, "teardown step failed");
                    report.warnings.push(format!("{}: {}", label, e));
                }
            }
        }

        state.phase = LifecyclePhase::TeardownAttempted;
        tracing::info!(
            released = report.released.len(),
            warnings = report.warnings.len(),
            "fixture teardown attempted"
        );
        report
    }

    async fn release_metadata(&self, org: &Locator, key: &str) -> Result<()> {
        let mut task = self.client.metadata().delete_entry(org, key).await?;
        self.client.tasks().await_success(&mut task).await?;
        Ok(())
    }

    async fn release_catalog(&self, catalog: &Reference) -> Result<()> {
        let address = EntityAddress::try_from(catalog)?;
        let mut task = self.client.catalogs().delete(&address).await?;
        self.client.tasks().await_success(&mut task).await?;
        Ok(())
    }
}
