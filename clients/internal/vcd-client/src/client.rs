// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Top-level client

use std::sync::Arc;

use serde::de::DeserializeOwned;
use vcd_api::{Catalog, EntityKind, Org, Reference};

use crate::catalog::CatalogApi;
use crate::codec;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::lifecycle::{FixtureCheck, FixtureSpec, LifecycleCoordinator, LifecycleResult};
use crate::metadata::MetadataApi;
use crate::org::OrgApi;
use crate::reference::{EntityAddress, Locator, ReferenceResolver};
use crate::scope::PrivilegeContext;
use crate::task::{TaskMonitor, TerminalOutcome, WaitPolicy};
use crate::transport::{HttpTransport, Transport};

/// An organization or catalog, as returned by [`VcdClient::get_entity`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Org(Org),
    Catalog(Catalog),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Org(org) => org.kind,
            Entity::Catalog(catalog) => catalog.kind,
        }
    }

    pub fn reference(&self) -> Reference {
        match self {
            Entity::Org(org) => org.reference(),
            Entity::Catalog(catalog) => catalog.reference(),
        }
    }
}

/// Change applied by [`VcdClient::mutate_metadata`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataChange {
    Set(String),
    Delete,
}

/// Payloads that name their own entity kind
pub(crate) trait Typed {
    fn kind(&self) -> EntityKind;
}

impl Typed for Org {
    fn kind(&self) -> EntityKind {
        self.kind
    }
}

impl Typed for Catalog {
    fn kind(&self) -> EntityKind {
        self.kind
    }
}

/// vCloud Director client
///
/// Cheap to clone; clones share the transport and the lookup cache.
#[derive(Clone)]
pub struct VcdClient {
    transport: Arc<dyn Transport>,
    context: PrivilegeContext,
    resolver: ReferenceResolver,
    tasks: TaskMonitor,
}

impl VcdClient {
    /// Client over HTTP, configured from `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.session_token.as_ref(), config.http_timeout)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            config.privilege_context()?,
            config.wait_policy,
        ))
    }

    /// Client over an arbitrary transport
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        context: PrivilegeContext,
        wait_policy: WaitPolicy,
    ) -> Self {
        let resolver = ReferenceResolver::new(transport.clone(), context.clone());
        let tasks = TaskMonitor::new(transport.clone(), wait_policy);
        Self {
            transport,
            context,
            resolver,
            tasks,
        }
    }

    /// Same client with a different default wait policy
    pub fn with_wait_policy(mut self, wait_policy: WaitPolicy) -> Self {
        self.tasks = TaskMonitor::new(self.transport.clone(), wait_policy);
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn context(&self) -> &PrivilegeContext {
        &self.context
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    pub fn tasks(&self) -> &TaskMonitor {
        &self.tasks
    }

    pub fn orgs(&self) -> OrgApi<'_> {
        OrgApi::new(self)
    }

    pub fn catalogs(&self) -> CatalogApi<'_> {
        CatalogApi::new(self)
    }

    pub fn metadata(&self) -> MetadataApi<'_> {
        MetadataApi::new(self)
    }

    pub fn lifecycle(&self) -> LifecycleCoordinator<'_> {
        LifecycleCoordinator::new(self)
    }

    /// References to every visible entity of `kind`
    ///
    /// Catalogs are gathered from each visible organization.
    pub async fn list_entities(&self, kind: EntityKind) -> Result<Vec<Reference>> {
        match kind {
            EntityKind::Organization => self.orgs().list().await,
            EntityKind::Catalog => {
                let mut catalogs = Vec::new();
                for org in self.orgs().list().await? {
                    let org = self.orgs().get(&EntityAddress::try_from(&org)?).await?;
                    catalogs.extend(org.catalogs);
                }
                Ok(catalogs)
            }
            other => Err(Error::UnsupportedKind {
                kind: other,
                operation: "listing",
            }),
        }
    }

    /// Fetch one organization or catalog
    pub async fn get_entity(&self, kind: EntityKind, address: &EntityAddress) -> Result<Entity> {
        match address {
            EntityAddress::Identifier(urn) if urn.kind() != kind => {
                return Err(Error::UnexpectedKind {
                    expected: kind,
                    actual: urn.kind(),
                    locator: urn.to_string(),
                });
            }
            _ => {}
        }

        match kind {
            EntityKind::Organization => self.orgs().get(address).await.map(Entity::Org),
            EntityKind::Catalog => self.catalogs().get(address).await.map(Entity::Catalog),
            other => Err(Error::UnsupportedKind {
                kind: other,
                operation: "retrieval",
            }),
        }
    }

    /// Write or delete one metadata entry and wait for the task
    ///
    /// A failed task is reported through the returned outcome, not as an
    /// error.
    pub async fn mutate_metadata(
        &self,
        locator: &Locator,
        key: &str,
        change: MetadataChange,
    ) -> Result<TerminalOutcome> {
        let mut handle = match change {
            MetadataChange::Set(value) => self.metadata().put_entry(locator, key, &value).await?,
            MetadataChange::Delete => self.metadata().delete_entry(locator, key).await?,
        };
        self.tasks.await_terminal(&mut handle).await
    }

    /// Run the fixture lifecycle with the default verification body
    pub async fn run_lifecycle(&self, spec: &FixtureSpec) -> LifecycleResult<FixtureCheck> {
        self.lifecycle().run_with_check(spec).await
    }

    /// GET an entity payload and check its kind
    pub(crate) async fn fetch_entity<T>(
        &self,
        locator: &Locator,
        expected: EntityKind,
        what: &'static str,
    ) -> Result<T>
    where
        T: DeserializeOwned + Typed,
    {
        let payload = self
            .transport
            .get(locator)
            .await
            .map_err(|e| not_found_as(e, expected, locator))?;
        let entity: T = codec::decode(&payload, locator, what)?;
        if entity.kind() != expected {
            return Err(Error::UnexpectedKind {
                expected,
                actual: entity.kind(),
                locator: locator.to_string(),
            });
        }
        Ok(entity)
    }
}

/// Map a 404 transport failure to [`Error::NotFound`]
pub(crate) fn not_found_as(error: Error, kind: EntityKind, locator: &Locator) -> Error {
    if error.status() == Some(404) {
        Error::NotFound {
            kind,
            locator: locator.to_string(),
        }
    } else {
        error
    }
}
