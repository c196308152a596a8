// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Stub vCloud Director server for testing
//!
//! This crate provides a Dropshot-based HTTP server that implements the
//! [`vcd_api::VcdApi`] trait over in-memory state. It can be used for:
//!
//! - Integration testing of vcd-client without a real director
//! - End-to-end testing of the vcd CLI
//! - Local development and demos
//!
//! Mutations behave like the real thing: they answer with a task that moves
//! through `queued` and `running` as it is polled and applies its effect when
//! it completes. [`StubConfig::polls_to_complete`] sets how many polls that
//! takes; with zero, tasks are already complete when returned.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dropshot::{
    ConfigDropshot, ConfigLogging, ConfigLoggingLevel, HttpError, HttpResponseAccepted,
    HttpResponseCreated, HttpResponseOk, HttpServer, HttpServerStarter, Path, RequestContext,
    TypedBody,
};
use uuid::Uuid;
use vcd_api::{
    Catalog, EntityKind, EntityPath, Metadata, MetadataEntry, MetadataKeyPath, MetadataValue,
    NewCatalog, Org, OrgList, Reference, Task, TaskError, TaskStatus, Urn, UrnPath,
};

/// Organization present in every seeded stub
pub const SEED_ORG_ID: Uuid = Uuid::from_u128(0x6a5f6c1e_2d4b_4c1a_9e0f_1b2c3d4e5f60);
pub const SEED_ORG_NAME: &str = "test-org";

/// Second organization, with no metadata and no catalogs
pub const SECOND_ORG_ID: Uuid = Uuid::from_u128(0x0d9c8b7a_6f5e_4d3c_8b2a_19f8e7d6c5b4);

/// vApp whose locator can only be found through entity resolution
pub const SEED_VAPP_ID: Uuid = Uuid::from_u128(0x9f8e7d6c_5b4a_4392_8170_6e5d4c3b2a19);

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct StubConfig {
    /// Polls a task needs before it completes
    pub polls_to_complete: u32,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            polls_to_complete: 2,
        }
    }
}

#[derive(Debug, Clone)]
struct OrgRecord {
    name: String,
    full_name: String,
    description: Option<String>,
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct CatalogRecord {
    org: Uuid,
    name: String,
    description: Option<String>,
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Org(Uuid),
    Catalog(Uuid),
}

impl Owner {
    fn urn(self) -> Urn {
        match self {
            Owner::Org(id) => Urn::new(EntityKind::Organization, id),
            Owner::Catalog(id) => Urn::new(EntityKind::Catalog, id),
        }
    }
}

#[derive(Debug, Clone)]
enum Effect {
    SetMetadata {
        owner: Owner,
        entries: Vec<(String, String)>,
    },
    DeleteMetadata {
        owner: Owner,
        key: String,
    },
    CreateCatalog(Uuid),
    DeleteCatalog(Uuid),
}

#[derive(Debug, Clone)]
struct TaskRecord {
    operation_name: &'static str,
    owner: Owner,
    status: TaskStatus,
    polls_remaining: u32,
    effect: Option<Effect>,
    error: Option<TaskError>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct StubState {
    orgs: BTreeMap<Uuid, OrgRecord>,
    catalogs: BTreeMap<Uuid, CatalogRecord>,
    vapps: BTreeMap<Uuid, String>,
    tasks: HashMap<Uuid, TaskRecord>,
}

impl StubState {
    fn seeded() -> Self {
        let mut state = Self::default();
        state.orgs.insert(
            SEED_ORG_ID,
            OrgRecord {
                name: SEED_ORG_NAME.to_string(),
                full_name: "Test Organization".to_string(),
                description: Some("Seeded by vcd-stub-server".to_string()),
                metadata: BTreeMap::from([("environment".to_string(), "test".to_string())]),
            },
        );
        state.orgs.insert(
            SECOND_ORG_ID,
            OrgRecord {
                name: "acme".to_string(),
                full_name: "Acme Corporation".to_string(),
                description: None,
                metadata: BTreeMap::new(),
            },
        );
        state.vapps.insert(SEED_VAPP_ID, "web-tier".to_string());
        state
    }

    fn metadata(&self, owner: Owner) -> Option<&BTreeMap<String, String>> {
        match owner {
            Owner::Org(id) => self.orgs.get(&id).map(|o| &o.metadata),
            Owner::Catalog(id) => self.catalogs.get(&id).map(|c| &c.metadata),
        }
    }

    fn metadata_mut(&mut self, owner: Owner) -> Option<&mut BTreeMap<String, String>> {
        match owner {
            Owner::Org(id) => self.orgs.get_mut(&id).map(|o| &mut o.metadata),
            Owner::Catalog(id) => self.catalogs.get_mut(&id).map(|c| &mut c.metadata),
        }
    }

    /// Queue a task; with no polls required it completes on the spot
    fn submit(
        &mut self,
        owner: Owner,
        operation_name: &'static str,
        effect: Effect,
        polls: u32,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.tasks.insert(
            id,
            TaskRecord {
                operation_name,
                owner,
                status: TaskStatus::Queued,
                polls_remaining: polls,
                effect: Some(effect),
                error: None,
                start_time: Utc::now(),
                end_time: None,
            },
        );
        if polls == 0 {
            self.complete(id);
        }
        id
    }

    /// One poll's worth of progress
    fn advance(&mut self, id: Uuid) {
        let Some(task) = self.tasks.get_mut(&id) else {
            return;
        };
        if task.status.is_terminal() {
            return;
        }
        task.polls_remaining = task.polls_remaining.saturating_sub(1);
        if task.polls_remaining > 0 {
            task.status = TaskStatus::Running;
            return;
        }
        self.complete(id);
    }

    fn complete(&mut self, id: Uuid) {
        let Some(effect) = self.tasks.get_mut(&id).and_then(|t| t.effect.take()) else {
            return;
        };
        let error = self.apply(effect).err();
        if let Some(task) = self.tasks.get_mut(&id) {
            task.status = if error.is_some() {
                TaskStatus::Error
            } else {
                TaskStatus::Success
            };
            task.error = error;
            task.end_time = Some(Utc::now());
            tracing::debug!(task = %id, status = %task.status, "task complete");
        }
    }

    fn apply(&mut self, effect: Effect) -> std::result::Result<(), TaskError> {
        match effect {
            Effect::SetMetadata { owner, entries } => {
                let metadata = self.metadata_mut(owner).ok_or_else(|| gone(owner))?;
                metadata.extend(entries);
                Ok(())
            }
            Effect::DeleteMetadata { owner, key } => {
                let metadata = self.metadata_mut(owner).ok_or_else(|| gone(owner))?;
                metadata.remove(&key);
                Ok(())
            }
            Effect::CreateCatalog(id) => {
                let Some(catalog) = self.catalogs.get(&id) else {
                    return Err(gone(Owner::Catalog(id)));
                };
                let duplicate = self.catalogs.iter().any(|(other, c)| {
                    *other != id
                        && c.org == catalog.org
                        && c.name.eq_ignore_ascii_case(&catalog.name)
                });
                if duplicate {
                    let name = catalog.name.clone();
                    self.catalogs.remove(&id);
                    return Err(TaskError {
                        message: format!("The catalog name '{}' is already in use", name),
                        major_error_code: 400,
                        minor_error_code: "DUPLICATE_NAME".to_string(),
                    });
                }
                Ok(())
            }
            Effect::DeleteCatalog(id) => {
                self.catalogs
                    .remove(&id)
                    .map(|_| ())
                    .ok_or_else(|| gone(Owner::Catalog(id)))
            }
        }
    }

    fn pending_tasks(&self, owner: Owner) -> Vec<Uuid> {
        let mut ids: Vec<(DateTime<Utc>, Uuid)> = self
            .tasks
            .iter()
            .filter(|(_, t)| t.owner == owner && !t.status.is_terminal())
            .map(|(id, t)| (t.start_time, *id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }
}

fn gone(owner: Owner) -> TaskError {
    TaskError {
        message: format!("{} no longer exists", owner.urn()),
        major_error_code: 404,
        minor_error_code: "ACCESS_TO_RESOURCE_IS_FORBIDDEN".to_string(),
    }
}

// ============================================================================
// Server Context
// ============================================================================

/// Context for the stub server
#[derive(Debug)]
pub struct StubContext {
    state: Mutex<StubState>,
    config: StubConfig,
}

impl StubContext {
    /// Context with the seeded organizations and vApp
    pub fn seeded(config: StubConfig) -> Self {
        Self {
            state: Mutex::new(StubState::seeded()),
            config,
        }
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Names of the catalogs currently stored, sorted
    pub fn catalog_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().catalogs.values().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }

    /// Current metadata of an organization
    pub fn org_metadata(&self, id: Uuid) -> Option<BTreeMap<String, String>> {
        self.state().metadata(Owner::Org(id)).cloned()
    }

    pub fn task_count(&self) -> usize {
        self.state().tasks.len()
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Scheme and authority the request was addressed to
fn base_url(rqctx: &RequestContext<Arc<StubContext>>) -> String {
    let host = rqctx
        .request
        .headers()
        .get(http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    User,
    Admin,
}

impl View {
    fn prefix(self) -> &'static str {
        match self {
            View::User => vcd_api::USER_PREFIX,
            View::Admin => vcd_api::ADMIN_PREFIX,
        }
    }
}

fn href(base: &str, view: View, kind: EntityKind, id: Uuid) -> String {
    let segment = kind.path_segment().unwrap_or("entity");
    format!("{}{}{}/{}", base, view.prefix(), segment, id)
}

fn render_task(state: &StubState, base: &str, id: Uuid) -> Option<Task> {
    let task = state.tasks.get(&id)?;
    let owner_name = match task.owner {
        Owner::Org(o) => state.orgs.get(&o).map(|r| r.name.clone()),
        Owner::Catalog(c) => state.catalogs.get(&c).map(|r| r.name.clone()),
    };
    let owner_urn = task.owner.urn();
    let mut owner = Reference::from_urn(owner_urn).with_href(href(
        base,
        View::User,
        owner_urn.kind(),
        owner_urn.uuid(),
    ));
    owner.name = owner_name;

    Some(Task {
        href: href(base, View::User, EntityKind::Task, id),
        id: Urn::new(EntityKind::Task, id).to_string(),
        kind: EntityKind::Task,
        name: "task".to_string(),
        operation: Some(format!("{} {}", task.operation_name, owner_urn)),
        operation_name: task.operation_name.to_string(),
        status: task.status,
        owner: Some(owner),
        error: task.error.clone(),
        start_time: task.start_time,
        end_time: task.end_time,
    })
}

fn catalog_reference(base: &str, view: View, id: Uuid, record: &CatalogRecord) -> Reference {
    Reference::from_urn(Urn::new(EntityKind::Catalog, id))
        .with_href(href(base, view, EntityKind::Catalog, id))
        .with_name(record.name.clone())
}

fn render_org(state: &StubState, base: &str, view: View, id: Uuid) -> Option<Org> {
    let org = state.orgs.get(&id)?;
    let catalogs = state
        .catalogs
        .iter()
        .filter(|(_, c)| c.org == id)
        .map(|(cid, c)| catalog_reference(base, view, *cid, c))
        .collect();

    Some(Org {
        href: href(base, view, EntityKind::Organization, id),
        id: Urn::new(EntityKind::Organization, id).to_string(),
        kind: EntityKind::Organization,
        name: org.name.clone(),
        full_name: org.full_name.clone(),
        description: org.description.clone(),
        catalogs,
        vdcs: Vec::new(),
    })
}

fn render_catalog(state: &StubState, base: &str, view: View, id: Uuid) -> Option<Catalog> {
    let catalog = state.catalogs.get(&id)?;
    let owner = Reference::from_urn(Urn::new(EntityKind::Organization, catalog.org))
        .with_href(href(base, view, EntityKind::Organization, catalog.org));
    let tasks = state
        .pending_tasks(Owner::Catalog(id))
        .into_iter()
        .filter_map(|t| render_task(state, base, t))
        .collect();

    Some(Catalog {
        href: href(base, view, EntityKind::Catalog, id),
        id: Urn::new(EntityKind::Catalog, id).to_string(),
        kind: EntityKind::Catalog,
        name: catalog.name.clone(),
        description: catalog.description.clone(),
        is_published: false,
        owner: Some(owner),
        tasks,
    })
}

fn not_found(what: impl std::fmt::Display) -> HttpError {
    HttpError::for_not_found(None, format!("{} not found", what))
}

fn org_not_found(id: Uuid) -> HttpError {
    not_found(Urn::new(EntityKind::Organization, id))
}

fn catalog_not_found(id: Uuid) -> HttpError {
    not_found(Urn::new(EntityKind::Catalog, id))
}

// ============================================================================
// Shared handlers
// ============================================================================

fn get_org_view(
    rqctx: &RequestContext<Arc<StubContext>>,
    id: Uuid,
    view: View,
) -> Result<HttpResponseOk<Org>, HttpError> {
    let base = base_url(rqctx);
    let state = rqctx.context().state();
    render_org(&state, &base, view, id)
        .map(HttpResponseOk)
        .ok_or_else(|| org_not_found(id))
}

fn get_catalog_view(
    rqctx: &RequestContext<Arc<StubContext>>,
    id: Uuid,
    view: View,
) -> Result<HttpResponseOk<Catalog>, HttpError> {
    let base = base_url(rqctx);
    let state = rqctx.context().state();
    render_catalog(&state, &base, view, id)
        .map(HttpResponseOk)
        .ok_or_else(|| catalog_not_found(id))
}

fn missing_owner(owner: Owner) -> HttpError {
    match owner {
        Owner::Org(id) => org_not_found(id),
        Owner::Catalog(id) => catalog_not_found(id),
    }
}

fn get_metadata(
    rqctx: &RequestContext<Arc<StubContext>>,
    owner: Owner,
) -> Result<HttpResponseOk<Metadata>, HttpError> {
    let state = rqctx.context().state();
    let metadata = state.metadata(owner).ok_or_else(|| missing_owner(owner))?;
    Ok(HttpResponseOk(Metadata {
        entries: metadata
            .iter()
            .map(|(key, value)| MetadataEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect(),
    }))
}

fn get_metadata_value(
    rqctx: &RequestContext<Arc<StubContext>>,
    owner: Owner,
    key: &str,
) -> Result<HttpResponseOk<MetadataValue>, HttpError> {
    let state = rqctx.context().state();
    let metadata = state.metadata(owner).ok_or_else(|| missing_owner(owner))?;
    metadata
        .get(key)
        .map(|v| HttpResponseOk(MetadataValue::new(v.clone())))
        .ok_or_else(|| not_found(format!("metadata key '{}'", key)))
}

/// Submit a task and render it
fn accept(
    rqctx: &RequestContext<Arc<StubContext>>,
    state: &mut StubState,
    owner: Owner,
    operation_name: &'static str,
    effect: Effect,
) -> Result<HttpResponseAccepted<Task>, HttpError> {
    let base = base_url(rqctx);
    let polls = rqctx.context().config.polls_to_complete;
    let id = state.submit(owner, operation_name, effect, polls);
    tracing::info!(task = %id, operation = operation_name, owner = %owner.urn(), "task accepted");
    render_task(state, &base, id)
        .map(HttpResponseAccepted)
        .ok_or_else(|| HttpError::for_internal_error(format!("task {} vanished", id)))
}

fn put_metadata_entry(
    rqctx: &RequestContext<Arc<StubContext>>,
    owner: Owner,
    key: String,
    value: MetadataValue,
) -> Result<HttpResponseAccepted<Task>, HttpError> {
    if key.trim().is_empty() {
        return Err(HttpError::for_bad_request(
            None,
            "metadata key must not be empty".to_string(),
        ));
    }
    let mut state = rqctx.context().state();
    if state.metadata(owner).is_none() {
        return Err(missing_owner(owner));
    }
    accept(
        rqctx,
        &mut state,
        owner,
        "metadataUpdate",
        Effect::SetMetadata {
            owner,
            entries: vec![(key, value.value)],
        },
    )
}

fn delete_metadata_entry(
    rqctx: &RequestContext<Arc<StubContext>>,
    owner: Owner,
    key: String,
) -> Result<HttpResponseAccepted<Task>, HttpError> {
    let mut state = rqctx.context().state();
    let metadata = state.metadata(owner).ok_or_else(|| missing_owner(owner))?;
    if !metadata.contains_key(&key) {
        return Err(not_found(format!("metadata key '{}'", key)));
    }
    accept(
        rqctx,
        &mut state,
        owner,
        "metadataDelete",
        Effect::DeleteMetadata { owner, key },
    )
}

// ============================================================================
// API Implementation
// ============================================================================

/// Marker type for the stub API implementation
pub enum StubVcdApi {}

impl vcd_api::VcdApi for StubVcdApi {
    type Context = Arc<StubContext>;

    async fn list_orgs(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<HttpResponseOk<OrgList>, HttpError> {
        let base = base_url(&rqctx);
        let state = rqctx.context().state();
        let orgs = state
            .orgs
            .iter()
            .map(|(id, org)| {
                Reference::from_urn(Urn::new(EntityKind::Organization, *id))
                    .with_href(href(&base, View::User, EntityKind::Organization, *id))
                    .with_name(org.name.clone())
            })
            .collect();
        Ok(HttpResponseOk(OrgList { orgs }))
    }

    async fn get_org(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Org>, HttpError> {
        get_org_view(&rqctx, path.into_inner().id, View::User)
    }

    async fn get_admin_org(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Org>, HttpError> {
        get_org_view(&rqctx, path.into_inner().id, View::Admin)
    }

    async fn get_org_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError> {
        get_metadata(&rqctx, Owner::Org(path.into_inner().id))
    }

    async fn get_org_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError> {
        let path = path.into_inner();
        get_metadata_value(&rqctx, Owner::Org(path.id), &path.key)
    }

    async fn get_admin_org_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError> {
        get_metadata(&rqctx, Owner::Org(path.into_inner().id))
    }

    async fn get_admin_org_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError> {
        let path = path.into_inner();
        get_metadata_value(&rqctx, Owner::Org(path.id), &path.key)
    }

    async fn put_org_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
        body: TypedBody<MetadataValue>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError> {
        let path = path.into_inner();
        put_metadata_entry(&rqctx, Owner::Org(path.id), path.key, body.into_inner())
    }

    async fn delete_org_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError> {
        let path = path.into_inner();
        delete_metadata_entry(&rqctx, Owner::Org(path.id), path.key)
    }

    async fn merge_org_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
        body: TypedBody<Metadata>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError> {
        let owner = Owner::Org(path.into_inner().id);
        let entries = body
            .into_inner()
            .entries
            .into_iter()
            .map(|e| (e.key, e.value))
            .collect();
        let mut state = rqctx.context().state();
        if state.metadata(owner).is_none() {
            return Err(missing_owner(owner));
        }
        accept(
            &rqctx,
            &mut state,
            owner,
            "metadataUpdate",
            Effect::SetMetadata { owner, entries },
        )
    }

    async fn create_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
        body: TypedBody<NewCatalog>,
    ) -> Result<HttpResponseCreated<Catalog>, HttpError> {
        let org = path.into_inner().id;
        let params = body.into_inner();
        if params.name.trim().is_empty() {
            return Err(HttpError::for_bad_request(
                None,
                "catalog name must not be empty".to_string(),
            ));
        }

        let base = base_url(&rqctx);
        let polls = rqctx.context().config.polls_to_complete;
        let mut state = rqctx.context().state();
        if !state.orgs.contains_key(&org) {
            return Err(org_not_found(org));
        }

        let id = Uuid::new_v4();
        state.catalogs.insert(
            id,
            CatalogRecord {
                org,
                name: params.name.clone(),
                description: params.description,
                metadata: BTreeMap::new(),
            },
        );

        // Render before submitting so the creation task is embedded even
        // when it completes immediately
        let owner = Owner::Catalog(id);
        let task_id = state.submit(owner, "catalogCreate", Effect::CreateCatalog(id), polls);
        tracing::info!(catalog = %id, name = %params.name, task = %task_id, "catalog accepted");

        let task = render_task(&state, &base, task_id);
        let mut catalog = match render_catalog(&state, &base, View::Admin, id) {
            Some(catalog) => catalog,
            // Creation failed on the spot; answer with the record as submitted
            None => Catalog {
                href: href(&base, View::Admin, EntityKind::Catalog, id),
                id: Urn::new(EntityKind::Catalog, id).to_string(),
                kind: EntityKind::Catalog,
                name: params.name,
                description: None,
                is_published: false,
                owner: None,
                tasks: Vec::new(),
            },
        };
        if catalog.tasks.is_empty() {
            catalog.tasks.extend(task);
        }
        Ok(HttpResponseCreated(catalog))
    }

    async fn get_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Catalog>, HttpError> {
        get_catalog_view(&rqctx, path.into_inner().id, View::User)
    }

    async fn get_admin_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Catalog>, HttpError> {
        get_catalog_view(&rqctx, path.into_inner().id, View::Admin)
    }

    async fn delete_catalog(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError> {
        let id = path.into_inner().id;
        let mut state = rqctx.context().state();
        if !state.catalogs.contains_key(&id) {
            return Err(catalog_not_found(id));
        }
        accept(
            &rqctx,
            &mut state,
            Owner::Catalog(id),
            "catalogDelete",
            Effect::DeleteCatalog(id),
        )
    }

    async fn get_catalog_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError> {
        get_metadata(&rqctx, Owner::Catalog(path.into_inner().id))
    }

    async fn get_catalog_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError> {
        let path = path.into_inner();
        get_metadata_value(&rqctx, Owner::Catalog(path.id), &path.key)
    }

    async fn get_admin_catalog_metadata(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Metadata>, HttpError> {
        get_metadata(&rqctx, Owner::Catalog(path.into_inner().id))
    }

    async fn get_admin_catalog_metadata_value(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseOk<MetadataValue>, HttpError> {
        let path = path.into_inner();
        get_metadata_value(&rqctx, Owner::Catalog(path.id), &path.key)
    }

    async fn put_catalog_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
        body: TypedBody<MetadataValue>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError> {
        let path = path.into_inner();
        put_metadata_entry(&rqctx, Owner::Catalog(path.id), path.key, body.into_inner())
    }

    async fn delete_catalog_metadata_entry(
        rqctx: RequestContext<Self::Context>,
        path: Path<MetadataKeyPath>,
    ) -> Result<HttpResponseAccepted<Task>, HttpError> {
        let path = path.into_inner();
        delete_metadata_entry(&rqctx, Owner::Catalog(path.id), path.key)
    }

    async fn get_task(
        rqctx: RequestContext<Self::Context>,
        path: Path<EntityPath>,
    ) -> Result<HttpResponseOk<Task>, HttpError> {
        let id = path.into_inner().id;
        let base = base_url(&rqctx);
        let mut state = rqctx.context().state();
        state.advance(id);
        render_task(&state, &base, id)
            .map(HttpResponseOk)
            .ok_or_else(|| not_found(Urn::new(EntityKind::Task, id)))
    }

    async fn resolve_entity(
        rqctx: RequestContext<Self::Context>,
        path: Path<UrnPath>,
    ) -> Result<HttpResponseOk<Reference>, HttpError> {
        let raw = path.into_inner().urn;
        let urn = Urn::parse(&raw).map_err(|e| HttpError::for_bad_request(None, e.to_string()))?;
        let base = base_url(&rqctx);
        let state = rqctx.context().state();
        let id = urn.uuid();

        let (locator, name) = match urn.kind() {
            EntityKind::Organization => state
                .orgs
                .get(&id)
                .map(|o| (href(&base, View::User, urn.kind(), id), Some(o.name.clone()))),
            EntityKind::Catalog => state
                .catalogs
                .get(&id)
                .map(|c| (href(&base, View::User, urn.kind(), id), Some(c.name.clone()))),
            EntityKind::Task => state
                .tasks
                .get(&id)
                .map(|_| (href(&base, View::User, urn.kind(), id), None)),
            EntityKind::VApp => state.vapps.get(&id).map(|name| {
                (
                    format!("{}{}vApp/vapp-{}", base, vcd_api::USER_PREFIX, id),
                    Some(name.clone()),
                )
            }),
            EntityKind::Vdc => None,
        }
        .ok_or_else(|| not_found(urn))?;

        let mut reference = Reference::from_urn(urn).with_href(locator);
        reference.name = name;
        Ok(HttpResponseOk(reference))
    }
}

/// Create the Dropshot API description for the stub server
pub fn api_description() -> Result<dropshot::ApiDescription<Arc<StubContext>>, String> {
    vcd_api::vcd_api_mod::api_description::<StubVcdApi>().map_err(|e| e.to_string())
}

// ============================================================================
// Running in-process
// ============================================================================

/// A stub server running on an ephemeral port
pub struct RunningStub {
    server: HttpServer<Arc<StubContext>>,
    context: Arc<StubContext>,
}

impl RunningStub {
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// User-view API base, e.g. `http://127.0.0.1:PORT/api/`
    pub fn api_url(&self) -> String {
        format!("http://{}{}", self.local_addr(), vcd_api::USER_PREFIX)
    }

    pub fn context(&self) -> &Arc<StubContext> {
        &self.context
    }

    pub async fn close(self) -> Result<()> {
        self.server
            .close()
            .await
            .map_err(|e| anyhow::anyhow!("failed to stop stub server: {}", e))
    }
}

/// Start a seeded stub bound to `bind_address`
pub fn start(bind_address: SocketAddr, config: StubConfig) -> Result<RunningStub> {
    let log = ConfigLogging::StderrTerminal {
        level: ConfigLoggingLevel::Warn,
    }
    .to_logger("vcd-stub-server")
    .context("failed to create logger")?;

    let config_dropshot = ConfigDropshot {
        bind_address,
        default_request_body_max_bytes: 1024 * 1024,
        default_handler_task_mode: dropshot::HandlerTaskMode::Detached,
        ..Default::default()
    };

    let context = Arc::new(StubContext::seeded(config));
    let api = api_description().map_err(|e| anyhow::anyhow!(e))?;
    let server = HttpServerStarter::new(&config_dropshot, api, context.clone(), &log)
        .map_err(|e| anyhow::anyhow!("failed to create server: {}", e))?
        .start();

    Ok(RunningStub { server, context })
}

// ============================================================================
// Tests
// ============================================================================
