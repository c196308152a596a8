// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Entity metadata
//!
//! Reads go to the locator as given. Writes to organizations and catalogs
//! are sent through the admin view and require an admin session; the check
//! happens before anything is sent.

use vcd_api::{EntityKind, Metadata, MetadataSet, MetadataValue, Task};

use crate::client::{VcdClient, not_found_as};
use crate::codec;
use crate::error::{Error, Result};
use crate::reference::Locator;
use crate::task::TaskHandle;

pub struct MetadataApi<'a> {
    client: &'a VcdClient,
}

impl<'a> MetadataApi<'a> {
    pub(crate) fn new(client: &'a VcdClient) -> Self {
        Self { client }
    }

    /// Every metadata entry of the entity
    pub async fn get_all(&self, locator: &Locator) -> Result<MetadataSet> {
        let target = locator.child(&["metadata"]);
        let payload = self
            .client
            .transport()
            .get(&target)
            .await
            .map_err(|e| not_found_as(e, self.kind_of(locator), locator))?;
        let metadata: Metadata = codec::decode(&payload, &target, "metadata")?;
        Ok(metadata.into_set())
    }

    pub async fn get_value(&self, locator: &Locator, key: &str) -> Result<String> {
        let target = locator.child(&["metadata", key]);
        let payload = self
            .client
            .transport()
            .get(&target)
            .await
            .map_err(|e| key_not_found_as(e, locator, key))?;
        let value: MetadataValue = codec::decode(&payload, &target, "metadata value")?;
        Ok(value.value)
    }

    /// Create or overwrite one entry
    pub async fn put_entry(&self, locator: &Locator, key: &str, value: &str) -> Result<TaskHandle> {
        let target = self
            .client
            .context()
            .mutation_target(locator, "metadata update")?
            .child(&["metadata", key]);

        tracing::info!(entity = %locator, key, "writing metadata entry");
        let payload = self
            .client
            .transport()
            .put(&target, codec::encode(&MetadataValue::new(value))?)
            .await
            .map_err(|e| not_found_as(e, self.kind_of(locator), locator))?;
        task_handle(&payload, &target)
    }

    pub async fn delete_entry(&self, locator: &Locator, key: &str) -> Result<TaskHandle> {
        let target = self
            .client
            .context()
            .mutation_target(locator, "metadata deletion")?
            .child(&["metadata", key]);

        tracing::info!(entity = %locator, key, "deleting metadata entry");
        let payload = self
            .client
            .transport()
            .delete(&target)
            .await
            .map_err(|e| key_not_found_as(e, locator, key))?;
        task_handle(&payload, &target)
    }

    /// Write several entries in one task; existing keys not named are kept
    pub async fn merge(&self, locator: &Locator, entries: &MetadataSet) -> Result<TaskHandle> {
        let target = self
            .client
            .context()
            .mutation_target(locator, "metadata update")?
            .child(&["metadata"]);

        tracing::info!(entity = %locator, count = entries.len(), "merging metadata");
        let payload = self
            .client
            .transport()
            .post(&target, codec::encode(&Metadata::from(entries))?)
            .await
            .map_err(|e| not_found_as(e, self.kind_of(locator), locator))?;
        task_handle(&payload, &target)
    }

    /// Delete every entry, one task per key, in key order
    pub async fn delete_all(&self, locator: &Locator) -> Result<Vec<TaskHandle>> {
        let mut keys: Vec<String> = self.get_all(locator).await?.into_keys().collect();
        keys.sort();

        let mut handles = Vec::with_capacity(keys.len());
        for key in keys {
            handles.push(self.delete_entry(locator, &key).await?);
        }
        Ok(handles)
    }

    fn kind_of(&self, locator: &Locator) -> EntityKind {
        self.client
            .context()
            .entity_kind_of(locator)
            .ok()
            .flatten()
            .unwrap_or(EntityKind::Organization)
    }
}

fn task_handle(payload: &[u8], target: &Locator) -> Result<TaskHandle> {
    let task: Task = codec::decode(payload, target, "task")?;
    TaskHandle::from_task(task)
}

fn key_not_found_as(error: Error, locator: &Locator, key: &str) -> Error {
    if error.status() == Some(404) {
        Error::KeyNotFound {
            locator: locator.to_string(),
            key: key.to_string(),
        }
    } else {
        error
    }
}
