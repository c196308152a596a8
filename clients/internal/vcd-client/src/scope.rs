// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Privilege scopes and locator rewriting
//!
//! vCloud Director exposes every organization and catalog under two
//! prefixes: the user view (`<base>/org/...`) and the admin view
//! (`<base>/admin/org/...`). Mutations of those entities are accepted only
//! through the admin view. A [`PrivilegeContext`] is fixed when the client
//! is built; admin-only operations consult it before any request is sent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vcd_api::EntityKind;

use crate::error::{Error, Result};
use crate::reference::Locator;

/// Privilege level of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    User,
    Admin,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Admin => "admin",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Scope::User),
            "admin" | "system" => Ok(Scope::Admin),
            other => Err(Error::Config(format!(
                "unknown scope '{}' (expected 'user' or 'admin')",
                other
            ))),
        }
    }
}

/// Entity kinds whose mutations are only accepted through the admin view
pub fn mutation_requires_admin(kind: EntityKind) -> bool {
    matches!(kind, EntityKind::Organization | EntityKind::Catalog)
}

/// The two locator prefixes and the active scope of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeContext {
    user_base: Locator,
    admin_base: Locator,
    scope: Scope,
}

impl PrivilegeContext {
    /// Context with an explicit admin base
    pub fn new(user_base: Locator, admin_base: Locator, scope: Scope) -> Result<Self> {
        let user_base = user_base.as_prefix();
        let admin_base = admin_base.as_prefix();
        if user_base == admin_base {
            return Err(Error::Config(format!(
                "user and admin bases must differ (both are {})",
                user_base
            )));
        }
        Ok(Self {
            user_base,
            admin_base,
            scope,
        })
    }

    /// Context whose admin base is `<user_base>/admin/`
    pub fn from_api_base(user_base: Locator, scope: Scope) -> Self {
        let user_base = user_base.as_prefix();
        let admin_base = user_base.child(&["admin"]).as_prefix();
        Self {
            user_base,
            admin_base,
            scope,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_admin(&self) -> bool {
        self.scope == Scope::Admin
    }

    pub fn user_base(&self) -> &Locator {
        &self.user_base
    }

    pub fn admin_base(&self) -> &Locator {
        &self.admin_base
    }

    /// Fail with [`Error::AdminScopeRequired`] unless the session is admin
    pub fn require_admin(&self, operation: &'static str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::AdminScopeRequired { operation })
        }
    }

    /// Which view a locator belongs to
    pub fn classify(&self, locator: &Locator) -> Result<Scope> {
        self.split(locator).map(|(scope, _)| scope)
    }

    /// Admin-view counterpart of a locator; admin locators are returned as-is
    pub fn to_admin_locator(&self, locator: &Locator) -> Result<Locator> {
        match self.split(locator)? {
            (Scope::Admin, _) => Ok(locator.clone()),
            (Scope::User, rest) => Locator::parse(&format!("{}{}", self.admin_base, rest)),
        }
    }

    /// User-view counterpart of a locator; user locators are returned as-is
    pub fn to_user_locator(&self, locator: &Locator) -> Result<Locator> {
        match self.split(locator)? {
            (Scope::User, _) => Ok(locator.clone()),
            (Scope::Admin, rest) => Locator::parse(&format!("{}{}", self.user_base, rest)),
        }
    }

    /// Entity kind named by the first path segment after the scope prefix
    pub fn entity_kind_of(&self, locator: &Locator) -> Result<Option<EntityKind>> {
        let (_, rest) = self.split(locator)?;
        let segment = rest.split(['/', '?', '#']).next().unwrap_or_default();
        Ok(EntityKind::from_path_segment(segment))
    }

    /// Target for a mutation of the entity at `locator`
    ///
    /// Organizations and catalogs are rewritten to the admin view, which
    /// requires an admin session. Other kinds are addressed as given.
    pub fn mutation_target(&self, locator: &Locator, operation: &'static str) -> Result<Locator> {
        match self.entity_kind_of(locator)? {
            Some(kind) if mutation_requires_admin(kind) => {
                self.require_admin(operation)?;
                self.to_admin_locator(locator)
            }
            _ => Ok(locator.clone()),
        }
    }

    /// The admin prefix lives under the user prefix, so it is checked first
    fn split<'l>(&self, locator: &'l Locator) -> Result<(Scope, &'l str)> {
        let s = locator.as_str();
        if let Some(rest) = s.strip_prefix(self.admin_base.as_str()) {
            return Ok((Scope::Admin, rest));
        }
        if let Some(rest) = s.strip_prefix(self.user_base.as_str()) {
            return Ok((Scope::User, rest));
        }
        Err(Error::InvalidScope {
            locator: locator.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const ORG: &str = "6a5f6c1e-2d4b-4c1a-9e0f-1b2c3d4e5f60";

    fn context(scope: Scope) -> PrivilegeContext {
        PrivilegeContext::from_api_base(
            Locator::parse("https://vcd.example.com/api").unwrap(),
            scope,
        )
    }

    fn loc(s: &str) -> Locator {
        Locator::parse(s).unwrap()
    }

    #[test]
    fn test_bases_are_normalized() {
        let ctx = context(Scope::User);
        assert_eq!(ctx.user_base().as_str(), "https://vcd.example.com/api/");
        assert_eq!(ctx.admin_base().as_str(), "https://vcd.example.com/api/admin/");
    }

    #[test]
    fn test_user_locator_rewrites_to_admin() {
        let ctx = context(Scope::Admin);
        let user = loc(&format!("https://vcd.example.com/api/org/{}", ORG));
        let admin = ctx.to_admin_locator(&user).unwrap();
        assert_eq!(
            admin.as_str(),
            format!("https://vcd.example.com/api/admin/org/{}", ORG)
        );
        assert_eq!(ctx.to_user_locator(&admin).unwrap(), user);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let ctx = context(Scope::Admin);
        let admin = loc(&format!("https://vcd.example.com/api/admin/org/{}", ORG));
        assert_eq!(ctx.to_admin_locator(&admin).unwrap(), admin);
        let twice = ctx
            .to_admin_locator(&ctx.to_admin_locator(&admin).unwrap())
            .unwrap();
        assert_eq!(twice, admin);
    }

    #[test]
    fn test_foreign_locator_is_invalid_scope() {
        let ctx = context(Scope::Admin);
        let err = ctx
            .to_admin_locator(&loc("https://other.example.com/api/org/1"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidScope { .. }));
    }

    #[test_case("https://vcd.example.com/api/org/1", Some(EntityKind::Organization) ; "user org")]
    #[test_case("https://vcd.example.com/api/admin/catalog/1", Some(EntityKind::Catalog) ; "admin catalog")]
    #[test_case("https://vcd.example.com/api/task/1", Some(EntityKind::Task) ; "task")]
    #[test_case("https://vcd.example.com/api/vApp/vapp-1", Some(EntityKind::VApp) ; "vapp")]
    #[test_case("https://vcd.example.com/api/session", None ; "unknown kind")]
    fn test_entity_kind_of(locator: &str, expected: Option<EntityKind>) {
        let ctx = context(Scope::User);
        assert_eq!(ctx.entity_kind_of(&loc(locator)).unwrap(), expected);
    }

    #[test]
    fn test_user_scope_rejects_org_mutation() {
        let ctx = context(Scope::User);
        let err = ctx
            .mutation_target(&loc("https://vcd.example.com/api/org/1"), "metadata update")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AdminScopeRequired {
                operation: "metadata update"
            }
        ));
    }

    #[test]
    fn test_admin_scope_mutation_target_is_admin_view() {
        let ctx = context(Scope::Admin);
        let target = ctx
            .mutation_target(&loc("https://vcd.example.com/api/catalog/1"), "catalog delete")
            .unwrap();
        assert_eq!(target.as_str(), "https://vcd.example.com/api/admin/catalog/1");
    }

    #[test]
    fn test_identical_bases_are_rejected() {
        let base = loc("https://vcd.example.com/api/");
        assert!(PrivilegeContext::new(base.clone(), base, Scope::User).is_err());
    }

    #[test_case("user", Scope::User)]
    #[test_case("ADMIN", Scope::Admin)]
    #[test_case("system", Scope::Admin)]
    fn test_scope_from_str(input: &str, expected: Scope) {
        assert_eq!(input.parse::<Scope>().unwrap(), expected);
    }
}
