// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Identity types shared by every vCloud Director entity

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UUID type
pub type Uuid = uuid::Uuid;

/// Prefix shared by every vCloud Director URN
pub const URN_PREFIX: &str = "urn:vcloud:";

/// Kind of entity a reference points at
///
/// Serialized as the vCloud media type carried in the `type` attribute of
/// references and entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EntityKind {
    #[serde(rename = "application/vnd.vmware.vcloud.org+json")]
    Organization,
    #[serde(rename = "application/vnd.vmware.vcloud.catalog+json")]
    Catalog,
    #[serde(rename = "application/vnd.vmware.vcloud.task+json")]
    Task,
    #[serde(rename = "application/vnd.vmware.vcloud.vdc+json")]
    Vdc,
    #[serde(rename = "application/vnd.vmware.vcloud.vApp+json")]
    VApp,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Organization,
        EntityKind::Catalog,
        EntityKind::Task,
        EntityKind::Vdc,
        EntityKind::VApp,
    ];

    /// Media type sent in the `type` attribute
    pub fn media_type(self) -> &'static str {
        match self {
            EntityKind::Organization => "application/vnd.vmware.vcloud.org+json",
            EntityKind::Catalog => "application/vnd.vmware.vcloud.catalog+json",
            EntityKind::Task => "application/vnd.vmware.vcloud.task+json",
            EntityKind::Vdc => "application/vnd.vmware.vcloud.vdc+json",
            EntityKind::VApp => "application/vnd.vmware.vcloud.vApp+json",
        }
    }

    /// Segment used inside URNs (`urn:vcloud:<segment>:<uuid>`)
    pub fn urn_segment(self) -> &'static str {
        match self {
            EntityKind::Organization => "org",
            EntityKind::Catalog => "catalog",
            EntityKind::Task => "task",
            EntityKind::Vdc => "vdc",
            EntityKind::VApp => "vapp",
        }
    }

    pub fn from_urn_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.urn_segment() == segment)
    }

    /// Path segment under the API base when the locator can be derived from
    /// the URN alone.
    ///
    /// vApps are addressed as `vApp/vapp-<uuid>`, which is not a pure
    /// function of the URN as far as clients are concerned, so they must go
    /// through the entity resolver.
    pub fn path_segment(self) -> Option<&'static str> {
        match self {
            EntityKind::Organization => Some("org"),
            EntityKind::Catalog => Some("catalog"),
            EntityKind::Task => Some("task"),
            EntityKind::Vdc => Some("vdc"),
            EntityKind::VApp => None,
        }
    }

    /// Inverse of the locator path segment, including the vApp collection
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "org" => Some(EntityKind::Organization),
            "catalog" => Some(EntityKind::Catalog),
            "task" => Some(EntityKind::Task),
            "vdc" => Some(EntityKind::Vdc),
            "vApp" => Some(EntityKind::VApp),
            _ => None,
        }
    }

    /// Human-readable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Organization => "organization",
            EntityKind::Catalog => "catalog",
            EntityKind::Task => "task",
            EntityKind::Vdc => "vdc",
            EntityKind::VApp => "vApp",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = InvalidReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| {
                k.name().eq_ignore_ascii_case(s)
                    || k.urn_segment() == s
                    || k.media_type() == s
            })
            .ok_or_else(|| InvalidReference(format!("unknown entity kind '{}'", s)))
    }
}

/// Stable identifier of an entity, e.g. `urn:vcloud:org:6a5f...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Urn {
    kind: EntityKind,
    uuid: Uuid,
}

impl Urn {
    pub fn new(kind: EntityKind, uuid: Uuid) -> Self {
        Self { kind, uuid }
    }

    pub fn parse(s: &str) -> Result<Self, InvalidReference> {
        let rest = s
            .strip_prefix(URN_PREFIX)
            .ok_or_else(|| InvalidReference(format!("'{}' is not a vcloud URN", s)))?;
        let (segment, uuid) = rest
            .split_once(':')
            .ok_or_else(|| InvalidReference(format!("'{}' has no entity segment", s)))?;
        let kind = EntityKind::from_urn_segment(segment).ok_or_else(|| {
            InvalidReference(format!("'{}' names unknown entity kind '{}'", s, segment))
        })?;
        let uuid = Uuid::parse_str(uuid)
            .map_err(|e| InvalidReference(format!("'{}' has an invalid UUID: {}", s, e)))?;
        Ok(Self { kind, uuid })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", URN_PREFIX, self.kind.urn_segment(), self.uuid)
    }
}

impl FromStr for Urn {
    type Err = InvalidReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Addressable pointer to an entity
///
/// A reference carries a stable identifier (`id`), a dereferenceable
/// locator (`href`), or both. Call [`Reference::validate`] on references
/// received from the wire before trusting them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Reference {
    /// Absolute locator of the entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Stable URN identifier of the entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Entity kind (media type)
    #[serde(rename = "type")]
    pub kind: EntityKind,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    /// Reference known only by its identifier
    pub fn from_urn(urn: Urn) -> Self {
        Self {
            href: None,
            id: Some(urn.to_string()),
            kind: urn.kind(),
            name: None,
        }
    }

    /// Reference known only by its locator
    pub fn from_href(kind: EntityKind, href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            id: None,
            kind,
            name: None,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parsed identifier, if the reference carries one
    pub fn urn(&self) -> Result<Option<Urn>, InvalidReference> {
        self.id.as_deref().map(Urn::parse).transpose()
    }

    /// Check the structural invariants of a reference
    ///
    /// At least one of `href`/`id` must be present, the URN kind must agree
    /// with `type`, and when both are present the href must address the same
    /// entity: the collection segment of the URN's kind followed by its UUID.
    pub fn validate(&self) -> Result<(), InvalidReference> {
        if self.href.is_none() && self.id.is_none() {
            return Err(InvalidReference(format!(
                "{} reference has neither id nor href",
                self.kind
            )));
        }

        let Some(urn) = self.urn()? else {
            return Ok(());
        };

        if urn.kind() != self.kind {
            return Err(InvalidReference(format!(
                "identifier {} names a {} but the reference type is {}",
                urn,
                urn.kind(),
                self.kind
            )));
        }

        if let Some(href) = &self.href {
            if !href_addresses(href, &urn) {
                return Err(InvalidReference(format!(
                    "identifier {} and locator {} address different entities",
                    urn, href
                )));
            }
        }

        Ok(())
    }
}

/// Whether the last two path segments of `href` name the entity of `urn`
///
/// Structural kinds end in `<segment>/<uuid>`; vApps end in
/// `vApp/vapp-<uuid>`.
fn href_addresses(href: &str, urn: &Urn) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let (Some(last), Some(collection)) = (segments.next(), segments.next()) else {
        return false;
    };

    let (expected_collection, id) = match urn.kind() {
        EntityKind::VApp => ("vApp", last.strip_prefix("vapp-")),
        kind => (kind.path_segment().unwrap_or_default(), Some(last)),
    };

    collection == expected_collection
        && id
            .and_then(|id| Uuid::parse_str(id).ok())
            .is_some_and(|uuid| uuid == urn.uuid())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReference(pub String);

impl fmt::Display for InvalidReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid reference: {}", self.0)
    }
}

impl std::error::Error for InvalidReference {}

/// Path parameter for entity endpoints
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EntityPath {
    /// Entity UUID
    pub id: Uuid,
}

/// Path parameter for metadata key endpoints
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MetadataKeyPath {
    /// Entity UUID
    pub id: Uuid,
    /// Metadata key
    pub key: String,
}

/// Path parameter for the entity resolver
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UrnPath {
    /// Entity URN (`urn:vcloud:<kind>:<uuid>`)
    pub urn: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const ORG_UUID: &str = "6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60";

    #[test]
    fn test_urn_roundtrip() {
        let s = format!("urn:vcloud:org:{}", ORG_UUID);
        let urn = Urn::parse(&s).unwrap();
        assert_eq!(urn.kind(), EntityKind::Organization);
        assert_eq!(urn.to_string(), s);
    }

    #[test_case("urn:vcloud:org" ; "missing uuid")]
    #[test_case("urn:vcloud:widget:6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60" ; "unknown kind")]
    #[test_case("urn:vcloud:org:not-a-uuid" ; "bad uuid")]
    #[test_case("https://vcd.example.com/api/org/1" ; "not a urn")]
    fn test_urn_rejects(input: &str) {
        assert!(Urn::parse(input).is_err());
    }

    #[test]
    fn test_reference_type_serializes_as_media_type() {
        let r = Reference::from_href(
            EntityKind::Organization,
            format!("https://vcd.example.com/api/org/{}", ORG_UUID),
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "application/vnd.vmware.vcloud.org+json");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_validate_accepts_matching_id_and_href() {
        let urn = Urn::parse(&format!("urn:vcloud:org:{}", ORG_UUID)).unwrap();
        let r = Reference::from_urn(urn)
            .with_href(format!("https://vcd.example.com/api/org/{}", ORG_UUID));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_id_and_href() {
        let urn = Urn::parse(&format!("urn:vcloud:org:{}", ORG_UUID)).unwrap();
        let r = Reference::from_urn(urn).with_href(
            "https://vcd.example.com/api/org/00000000-0000-0000-0000-000000000000",
        );
        assert!(r.validate().is_err());
    }

    #[test_case("https://vcd.example.com/api/catalog/6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60" ; "other kind collection")]
    #[test_case("https://vcd.example.com/api/org/zzz6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60" ; "prefixed uuid")]
    #[test_case("https://vcd.example.com/api/org/vapp-6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60" ; "vapp prefix on org")]
    #[test_case("6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60" ; "bare uuid")]
    fn test_validate_rejects_href_of_other_entity(href: &str) {
        let urn = Urn::parse(&format!("urn:vcloud:org:{}", ORG_UUID)).unwrap();
        let r = Reference::from_urn(urn).with_href(href);
        assert!(r.validate().is_err());
    }

    #[test_case("https://vcd.example.com/api/vApp/vapp-6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60", true ; "vapp collection")]
    #[test_case("https://vcd.example.com/api/admin/vApp/vapp-6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60/", true ; "admin view trailing slash")]
    #[test_case("https://vcd.example.com/api/vApp/6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60", false ; "missing vapp prefix")]
    #[test_case("https://vcd.example.com/api/vdc/vapp-6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60", false ; "wrong collection")]
    fn test_validate_vapp_href(href: &str, valid: bool) {
        let urn = Urn::parse(&format!("urn:vcloud:vapp:{}", ORG_UUID)).unwrap();
        let r = Reference::from_urn(urn).with_href(href);
        assert_eq!(r.validate().is_ok(), valid);
    }

    #[test]
    fn test_validate_rejects_empty_reference() {
        let r = Reference {
            href: None,
            id: None,
            kind: EntityKind::Catalog,
            name: Some("orphan".to_string()),
        };
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_kind_mismatch() {
        let urn = Urn::parse(&format!("urn:vcloud:catalog:{}", ORG_UUID)).unwrap();
        let mut r = Reference::from_urn(urn);
        r.kind = EntityKind::Organization;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("organization".parse::<EntityKind>().unwrap(), EntityKind::Organization);
        assert_eq!("org".parse::<EntityKind>().unwrap(), EntityKind::Organization);
        assert_eq!("vApp".parse::<EntityKind>().unwrap(), EntityKind::VApp);
        assert!("network".parse::<EntityKind>().is_err());
    }
}
