// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Reference resolution
//!
//! Every entity can be addressed by its stable URN or by its locator (href).
//! [`ReferenceResolver`] turns either form into a locator:
//!
//! - a reference that already carries an href is returned as-is
//! - a URN of a structural kind (org, catalog, task, vdc) is turned into
//!   `<api base>/<kind>/<uuid>` without touching the network
//! - any other URN is looked up once through `GET <api base>/entity/<urn>`
//!   and the answer is cached for the lifetime of the resolver

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use url::Url;
use vcd_api::{InvalidReference, Reference, URN_PREFIX, Urn};

use crate::codec;
use crate::error::{Error, Result};
use crate::scope::PrivilegeContext;
use crate::transport::Transport;

/// Directly dereferenceable address of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(Url);

impl Locator {
    pub fn parse(s: &str) -> Result<Self> {
        let url = Url::parse(s)
            .map_err(|e| InvalidReference(format!("'{}' is not a valid locator: {}", s, e)))?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(InvalidReference(format!("'{}' is not an http(s) locator", url)).into());
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Locator with `segments` appended as path segments
    pub fn child(&self, segments: &[&str]) -> Self {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Self(url)
    }

    /// Same locator with a trailing slash, for use as a prefix
    pub(crate) fn as_prefix(&self) -> Self {
        let mut url = self.0.clone();
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Self(url)
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.0
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Either addressing form of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityAddress {
    Identifier(Urn),
    Locator(Locator),
}

impl EntityAddress {
    /// Parse a URN (`urn:vcloud:...`) or an http(s) locator
    pub fn parse(s: &str) -> Result<Self> {
        if s.starts_with(URN_PREFIX) {
            Ok(EntityAddress::Identifier(Urn::parse(s)?))
        } else {
            Ok(EntityAddress::Locator(Locator::parse(s)?))
        }
    }
}

impl fmt::Display for EntityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityAddress::Identifier(urn) => write!(f, "{}", urn),
            EntityAddress::Locator(locator) => write!(f, "{}", locator),
        }
    }
}

impl FromStr for EntityAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Urn> for EntityAddress {
    fn from(urn: Urn) -> Self {
        EntityAddress::Identifier(urn)
    }
}

impl From<Locator> for EntityAddress {
    fn from(locator: Locator) -> Self {
        EntityAddress::Locator(locator)
    }
}

impl TryFrom<&Reference> for EntityAddress {
    type Error = Error;

    /// Prefers the locator when the reference carries both forms
    fn try_from(reference: &Reference) -> Result<Self> {
        reference.validate()?;
        match (&reference.href, reference.urn()?) {
            (Some(href), _) => Ok(EntityAddress::Locator(Locator::parse(href)?)),
            (None, Some(urn)) => Ok(EntityAddress::Identifier(urn)),
            (None, None) => Err(InvalidReference(format!(
                "{} reference has neither id nor href",
                reference.kind
            ))
            .into()),
        }
    }
}

/// Normalizes entity identity into locators
#[derive(Clone)]
pub struct ReferenceResolver {
    transport: Arc<dyn Transport>,
    context: PrivilegeContext,
    lookups: Arc<Mutex<HashMap<Urn, Locator>>>,
}

impl ReferenceResolver {
    pub fn new(transport: Arc<dyn Transport>, context: PrivilegeContext) -> Self {
        Self {
            transport,
            context,
            lookups: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Locator of a reference, validating it first
    pub async fn resolve(&self, reference: &Reference) -> Result<Locator> {
        let address = EntityAddress::try_from(reference)?;
        self.resolve_address(&address).await
    }

    pub async fn resolve_address(&self, address: &EntityAddress) -> Result<Locator> {
        match address {
            EntityAddress::Locator(locator) => Ok(locator.clone()),
            EntityAddress::Identifier(urn) => self.resolve_urn(urn).await,
        }
    }

    /// User-scope locator of a URN
    pub async fn resolve_urn(&self, urn: &Urn) -> Result<Locator> {
        if let Some(locator) = self.derive(urn) {
            return Ok(locator);
        }

        if let Some(locator) = self.cached(urn) {
            return Ok(locator);
        }

        let lookup = self
            .context
            .user_base()
            .child(&["entity", &urn.to_string()]);
        tracing::debug!(urn = %urn, locator = %lookup, "looking up entity locator");

        let payload = self.transport.get(&lookup).await.map_err(|e| {
            if e.status() == Some(404) {
                Error::NotFound {
                    kind: urn.kind(),
                    locator: lookup.to_string(),
                }
            } else {
                e
            }
        })?;
        let reference: Reference = codec::decode(&payload, &lookup, "entity reference")?;
        reference.validate()?;

        let href = reference.href.ok_or_else(|| Error::MalformedResponse {
            what: "entity reference",
            locator: lookup.to_string(),
            message: format!("lookup of {} returned no href", urn),
        })?;
        let locator = Locator::parse(&href)?;

        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(*urn, locator.clone());

        Ok(locator)
    }

    /// Rewrite a user-scope locator into its admin-scope counterpart
    pub fn to_admin_locator(&self, locator: &Locator) -> Result<Locator> {
        self.context.to_admin_locator(locator)
    }

    /// Rewrite an admin-scope locator into its user-scope counterpart
    pub fn to_user_locator(&self, locator: &Locator) -> Result<Locator> {
        self.context.to_user_locator(locator)
    }

    /// Structural derivation, when the URN kind permits it
    fn derive(&self, urn: &Urn) -> Option<Locator> {
        let segment = urn.kind().path_segment()?;
        Some(
            self.context
                .user_base()
                .child(&[segment, &urn.uuid().to_string()]),
        )
    }

    fn cached(&self, urn: &Urn) -> Option<Locator> {
        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(urn)
            .cloned()
    }
}
