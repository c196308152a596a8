// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Organization types

use super::common::{EntityKind, Reference};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Organization listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OrgList {
    /// References to every organization visible to the session
    #[serde(default)]
    pub orgs: Vec<Reference>,
}

/// Organization (tenant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Org {
    pub href: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Short name
    pub name: String,
    /// Display name
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Catalogs owned by the organization
    #[serde(default)]
    pub catalogs: Vec<Reference>,
    /// Virtual datacenters of the organization
    #[serde(default)]
    pub vdcs: Vec<Reference>,
}

impl Org {
    pub fn reference(&self) -> Reference {
        Reference {
            href: Some(self.href.clone()),
            id: Some(self.id.clone()),
            kind: self.kind,
            name: Some(self.name.clone()),
        }
    }
}
