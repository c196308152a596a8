// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Catalog operations
//!
//! Creation and deletion are admin-only. Creation answers with the new
//! catalog right away and embeds the creation task in it.

use vcd_api::{Catalog, EntityKind, NewCatalog, Reference, Task};

use crate::client::{VcdClient, not_found_as};
use crate::codec;
use crate::error::Result;
use crate::reference::EntityAddress;
use crate::task::TaskHandle;

/// A catalog accepted for creation, with its creation task if still running
#[derive(Debug, Clone)]
pub struct CreatedCatalog {
    pub catalog: Catalog,
    pub task: Option<TaskHandle>,
}

pub struct CatalogApi<'a> {
    client: &'a VcdClient,
}

impl<'a> CatalogApi<'a> {
    pub(crate) fn new(client: &'a VcdClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, address: &EntityAddress) -> Result<Catalog> {
        let locator = self.client.resolver().resolve_address(address).await?;
        self.client
            .fetch_entity(&locator, EntityKind::Catalog, "catalog")
            .await
    }

    /// Catalogs of an organization, including unpublished ones
    pub async fn list_in_org(&self, org: &EntityAddress) -> Result<Vec<Reference>> {
        let org = self.client.orgs().get_admin(org).await?;
        Ok(org.catalogs)
    }

    pub async fn create_in_org(
        &self,
        org: &EntityAddress,
        params: &NewCatalog,
    ) -> Result<CreatedCatalog> {
        let context = self.client.context();
        context.require_admin("catalog creation")?;
        let org_locator = self.client.resolver().resolve_address(org).await?;
        let target = context.to_admin_locator(&org_locator)?.child(&["catalogs"]);

        tracing::info!(org = %org_locator, name = %params.name, "creating catalog");
        let payload = self
            .client
            .transport()
            .post(&target, codec::encode(params)?)
            .await
            .map_err(|e| not_found_as(e, EntityKind::Organization, &org_locator))?;
        let catalog: Catalog = codec::decode(&payload, &target, "catalog")?;

        let task = catalog
            .tasks
            .first()
            .cloned()
            .map(TaskHandle::from_task)
            .transpose()?;

        Ok(CreatedCatalog { catalog, task })
    }

    pub async fn delete(&self, address: &EntityAddress) -> Result<TaskHandle> {
        let context = self.client.context();
        context.require_admin("catalog deletion")?;
        let locator = self.client.resolver().resolve_address(address).await?;
        let target = context.mutation_target(&locator, "catalog deletion")?;

        tracing::info!(catalog = %target, "deleting catalog");
        let payload = self
            .client
            .transport()
            .delete(&target)
            .await
            .map_err(|e| not_found_as(e, EntityKind::Catalog, &target))?;
        let task: Task = codec::decode(&payload, &target, "task")?;
        TaskHandle::from_task(task)
    }
}
