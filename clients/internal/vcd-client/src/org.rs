// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Organization operations

use vcd_api::{EntityKind, Org, OrgList, Reference};

use crate::client::{VcdClient, not_found_as};
use crate::codec;
use crate::error::Result;
use crate::reference::EntityAddress;

pub struct OrgApi<'a> {
    client: &'a VcdClient,
}

impl<'a> OrgApi<'a> {
    pub(crate) fn new(client: &'a VcdClient) -> Self {
        Self { client }
    }

    /// References to every organization visible to the session
    pub async fn list(&self) -> Result<Vec<Reference>> {
        let locator = self.client.context().user_base().child(&["org"]);
        let payload = self
            .client
            .transport()
            .get(&locator)
            .await
            .map_err(|e| not_found_as(e, EntityKind::Organization, &locator))?;
        let list: OrgList = codec::decode(&payload, &locator, "organization list")?;

        for org in &list.orgs {
            org.validate()?;
        }
        tracing::debug!(count = list.orgs.len(), "listed organizations");
        Ok(list.orgs)
    }

    /// User view of an organization
    pub async fn get(&self, address: &EntityAddress) -> Result<Org> {
        let locator = self.client.resolver().resolve_address(address).await?;
        self.client
            .fetch_entity(&locator, EntityKind::Organization, "organization")
            .await
    }

    /// Admin view of an organization, which lists every catalog it owns
    pub async fn get_admin(&self, address: &EntityAddress) -> Result<Org> {
        let context = self.client.context();
        context.require_admin("admin organization view")?;
        let locator = self.client.resolver().resolve_address(address).await?;
        let locator = context.to_admin_locator(&locator)?;
        self.client
            .fetch_entity(&locator, EntityKind::Organization, "organization")
            .await
    }
}
