// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! vCloud Director API trait definition
//!
//! **IMPORTANT**: This trait defines a *subset* of the vCloud Director REST
//! API (v5.1, JSON representation). It covers organizations, catalogs, their
//! metadata, and the task resource that every mutation returns.
//!
//! The trait exists to:
//! 1. Document the exact API surface the client depends on
//! 2. Enable the stub server used for integration testing
//!
//! ## Scopes
//!
//! The same entities are visible under two locator prefixes:
//!
//! - `/api/...` - the user view
//! - `/api/admin/...` - the admin view, which is the only place mutations of
//!   organizations and catalogs are accepted
//!
//! ## Asynchronous mutations
//!
//! Every mutating endpoint returns `202 Accepted` with a [`Task`] (catalog
//! creation returns `201 Created` with the task embedded in the catalog).
//! Clients poll `GET /api/task/{id}` until the task reaches a terminal state.

use dropshot::{
    HttpError, HttpResponseAccepted, HttpResponseCreated, HttpResponseOk, Path, RequestContext,
    TypedBody,
};

pub mod types;
pub use types::*;

/// Path prefix of the user view
pub const USER_PREFIX: &str = "/api/";

/// Path prefix of the admin view
pub const ADMIN_PREFIX: &str = "/api/admin/";

/// Accept header value requesting the JSON representation
pub const ACCEPT_JSON: &str = "application/*+json;version=5.1";

/// Header carrying the session token
pub const SESSION_HEADER: &str = "x-vcloud-authorization";

/// vCloud Director API (Subset)
#[dropshot::api_description]
pub trait VcdApi {
    /// Context type for request handlers
    type Context: Send + Sync + 'static;

    // ========================================================================
    // Organizations
    // ========================================================================

    /// List organizations visible to the session
    #[endpoint {
        method = GET,
        path = "/api/org",
        tags = ["org"],
    }]
    async fn list_orgs(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<HttpResponseOk<OrgList>, HttpError>;

    /// Get an organization (user view)
    #[endpoint {
        method = GET,
        path = "/api/org/{id}",
        tags = ["org"],
    }]
    async fn get_org(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Org>, HttpError>;

    /// Get an organization (admin view)
    #[endpoint {
        method = GET,
        path = "/api/admin/org/{id}",
        tags = ["org", "admin"],
    }]
    async fn get_admin_org(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Org>, HttpError>;

    // ========================================================================
    // Organization metadata
    // ========================================================================

    /// Get all metadata of an organization
    #[endpoint {
        method = GET,
        path = "/api/org/{id}/metadata",
        tags = ["org", "metadata"],
    }]
    async fn get_org_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError>;

    /// Get one metadata value of an organization
    #[endpoint {
        method = GET,
        path = "/api/org/{id}/metadata/{key}",
        tags = ["org", "metadata"],
    }]
    async fn get_org_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError>;

    /// Get all metadata of an organization (admin view)
    #[endpoint {
        method = GET,
        path = "/api/admin/org/{id}/metadata",
        tags = ["org", "metadata", "admin"],
    }]
    async fn get_admin_org_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError>;

    /// Get one metadata value of an organization (admin view)
    #[endpoint {
        method = GET,
        path = "/api/admin/org/{id}/metadata/{key}",
        tags = ["org", "metadata", "admin"],
    }]
    async fn get_admin_org_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError>;

    /// Create or overwrite one metadata entry of an organization
    #[endpoint {
        method = PUT,
        path = "/api/admin/org/{id}/metadata/{key}",
        tags = ["org", "metadata", "admin"],
    }]
    async fn put_org_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
        body: TypedBody<MetadataValue>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError>;

    /// Delete one metadata entry of an organization
    #[endpoint {
        method = DELETE,
        path = "/api/admin/org/{id}/metadata/{key}",
        tags = ["org", "metadata", "admin"],
    }]
    async fn delete_org_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError>;

    /// Merge several metadata entries into an organization
    #[endpoint {
        method = POST,
        path = "/api/admin/org/{id}/metadata",
        tags = ["org", "metadata", "admin"],
    }]
    async fn merge_org_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
        body: TypedBody<Metadata>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError>;

    // ========================================================================
    // Catalogs
    // ========================================================================

    /// Create a catalog in an organization
    ///
    /// The returned catalog carries the creation task in `tasks`.
    #[endpoint {
        method = POST,
        path = "/api/admin/org/{id}/catalogs",
        tags = ["catalog", "admin"],
    }]
    async fn create_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
        body: TypedBody<NewCatalog>,
    ) -> Result<HttpResponseCreated<Catalog>, HttpError>;

    /// Get a catalog (user view)
    #[endpoint {
        method = GET,
        path = "/api/catalog/{id}",
        tags = ["catalog"],
    }]
    async fn get_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Catalog>, HttpError>;

    /// Get a catalog (admin view)
    #[endpoint {
        method = GET,
        path = "/api/admin/catalog/{id}",
        tags = ["catalog", "admin"],
    }]
    async fn get_admin_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Catalog>, HttpError>;

    /// Delete a catalog
    #[endpoint {
        method = DELETE,
        path = "/api/admin/catalog/{id}",
        tags = ["catalog", "admin"],
    }]
    async fn delete_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError>;

    // ========================================================================
    // Catalog metadata
    // ========================================================================

    /// Get all metadata of a catalog
    #[endpoint {
        method = GET,
        path = "/api/catalog/{id}/metadata",
        tags = ["catalog", "metadata"],
    }]
    async fn get_catalog_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError>;

    /// Get one metadata value of a catalog
    #[endpoint {
        method = GET,
        path = "/api/catalog/{id}/metadata/{key}",
        tags = ["catalog", "metadata"],
    }]
    async fn get_catalog_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError>;

    /// Get all metadata of a catalog (admin view)
    #[endpoint {
        method = GET,
        path = "/api/admin/catalog/{id}/metadata",
        tags = ["catalog", "metadata", "admin"],
    }]
    async fn get_admin_catalog_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError>;

    /// Get one metadata value of a catalog (admin view)
    #[endpoint {
        method = GET,
        path = "/api/admin/catalog/{id}/metadata/{key}",
        tags = ["catalog", "metadata", "admin"],
    }]
    async fn get_admin_catalog_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError>;

    /// Create or overwrite one metadata entry of a catalog
    #[endpoint {
        method = PUT,
        path = "/api/admin/catalog/{id}/metadata/{key}",
        tags = ["catalog", "metadata", "admin"],
    }]
    async fn put_catalog_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
        body: TypedBody<MetadataValue>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError>;

    /// Delete one metadata entry of a catalog
    #[endpoint {
        method = DELETE,
        path = "/api/admin/catalog/{id}/metadata/{key}",
        tags = ["catalog", "metadata", "admin"],
    }]
    async fn delete_catalog_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError>;

    // ========================================================================
    // Tasks and entity resolution
    // ========================================================================

    /// Get the current state of a task
    #[endpoint {
        method = GET,
        path = "/api/task/{id}",
        tags = ["task"],
    }]
    async fn get_task(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Task>, HttpError>;

    /// Resolve an entity URN to a reference carrying its locator
    #[endpoint {
        method = GET,
        path = "/api/entity/{urn}",
        tags = ["entity"],
    }]
    async fn resolve_entity(
        rqctx: RequestContext<Self::Context>,
        path: Path<UrnPath>,
    ) -> Result<HttpResponseOk<Reference>, HttpError>;
}
