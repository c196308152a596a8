// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

// Allow expect/unwrap in tests - they provide clear panic messages on failure
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! End-to-end scenarios against an in-process vcd-stub-server

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use vcd_client::{
    EntityAddress, EntityKind, Error, FixtureSpec, LifecyclePhase, Locator, MetadataChange,
    MetadataSet, NewCatalog, Scope, TaskStatus, Urn, WaitPolicy,
};
use vcd_stub_server::{SEED_ORG_ID, SEED_VAPP_ID};

use common::{client_for, seed_org_address, seed_org_locator, seed_org_urn, start_stub};

#[tokio::test]
async fn list_orgs_returns_organization_references() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::User);

    let orgs = client.orgs().list().await.unwrap();
    assert!(!orgs.is_empty());
    assert!(orgs.iter().all(|r| r.kind == EntityKind::Organization));
    assert!(orgs.iter().all(|r| r.kind.to_string() == "organization"));

    stub.close().await.unwrap();
}

#[tokio::test]
async fn get_by_identifier_and_by_locator_agree() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::User);

    for reference in client.orgs().list().await.unwrap() {
        let by_id = client
            .orgs()
            .get(&EntityAddress::Identifier(reference.urn().unwrap().unwrap()))
            .await
            .unwrap();
        let by_href = client
            .orgs()
            .get(&EntityAddress::Locator(
                Locator::parse(reference.href.as_deref().unwrap()).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(by_id, by_href);
    }

    stub.close().await.unwrap();
}

#[tokio::test]
async fn catalog_by_identifier_and_by_locator_agree() {
    let stub = start_stub(1);
    let admin = client_for(&stub, Scope::Admin);
    let created = admin
        .catalogs()
        .create_in_org(&seed_org_address(), &NewCatalog::new("Equivalence Catalog"))
        .await
        .unwrap();
    if let Some(mut task) = created.task {
        admin.tasks().await_success(&mut task).await.unwrap();
    }

    let client = client_for(&stub, Scope::User);
    let catalogs = client.list_entities(EntityKind::Catalog).await.unwrap();
    assert!(
        catalogs
            .iter()
            .any(|c| c.id.as_deref() == Some(created.catalog.id.as_str()))
    );

    for reference in catalogs {
        let by_id = client
            .get_entity(
                EntityKind::Catalog,
                &EntityAddress::Identifier(reference.urn().unwrap().unwrap()),
            )
            .await
            .unwrap();
        let by_href = client
            .get_entity(
                EntityKind::Catalog,
                &EntityAddress::Locator(
                    Locator::parse(reference.href.as_deref().unwrap()).unwrap(),
                ),
            )
            .await
            .unwrap();
        assert_eq!(by_id.kind(), EntityKind::Catalog);
        assert_eq!(by_id, by_href);
    }

    stub.close().await.unwrap();
}

#[tokio::test]
async fn get_entity_rejects_mismatched_kind() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::User);

    let err = client
        .get_entity(EntityKind::Catalog, &seed_org_address())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedKind {
            expected: EntityKind::Catalog,
            actual: EntityKind::Organization,
            ..
        }
    ));

    let err = client
        .get_entity(EntityKind::Catalog, &EntityAddress::Locator(seed_org_locator(&stub)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedKind { .. }));

    stub.close().await.unwrap();
}

#[tokio::test]
async fn missing_org_is_not_found() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::User);

    let missing = Urn::new(EntityKind::Organization, uuid_of(42));
    let err = client
        .orgs()
        .get(&EntityAddress::Identifier(missing))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound {
            kind: EntityKind::Organization,
            ..
        }
    ));

    stub.close().await.unwrap();
}

#[tokio::test]
async fn vapp_urn_resolves_through_entity_lookup() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::User);

    let urn = Urn::new(EntityKind::VApp, SEED_VAPP_ID);
    let locator = client.resolver().resolve_urn(&urn).await.unwrap();
    assert_eq!(
        locator.as_str(),
        format!("{}vApp/vapp-{}", stub.api_url(), SEED_VAPP_ID)
    );

    stub.close().await.unwrap();
}

#[tokio::test]
async fn metadata_round_trip_and_delete() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::Admin);
    let org = seed_org_locator(&stub);

    let outcome = client
        .mutate_metadata(&org, "K", MetadataChange::Set("V".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.status(), TaskStatus::Success);
    assert_eq!(client.metadata().get_value(&org, "K").await.unwrap(), "V");

    let outcome = client
        .mutate_metadata(&org, "K", MetadataChange::Delete)
        .await
        .unwrap();
    assert!(outcome.is_success());

    let err = client.metadata().get_value(&org, "K").await.unwrap_err();
    assert!(matches!(err, Error::KeyNotFound { ref key, .. } if key == "K"));

    stub.close().await.unwrap();
}

#[tokio::test]
async fn deleting_unknown_key_is_key_not_found() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::Admin);

    let err = client
        .metadata()
        .delete_entry(&seed_org_locator(&stub), "never-set")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::KeyNotFound { .. }));

    stub.close().await.unwrap();
}

#[tokio::test]
async fn metadata_write_in_user_scope_is_rejected_before_sending() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::User);
    let tasks_before = stub.context().task_count();

    let err = client
        .metadata()
        .put_entry(&seed_org_locator(&stub), "K", "V")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AdminScopeRequired { .. }));
    assert_eq!(stub.context().task_count(), tasks_before);

    stub.close().await.unwrap();
}

#[tokio::test]
async fn merge_and_delete_all() {
    let stub = start_stub(1);
    let client = client_for(&stub, Scope::Admin);
    let org = seed_org_locator(&stub);

    let entries: MetadataSet = [("a", "1"), ("b", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut task = client.metadata().merge(&org, &entries).await.unwrap();
    client.tasks().await_success(&mut task).await.unwrap();

    let all = client.metadata().get_all(&org).await.unwrap();
    assert_eq!(all.get("a").map(String::as_str), Some("1"));
    assert_eq!(all.get("environment").map(String::as_str), Some("test"));

    for mut task in client.metadata().delete_all(&org).await.unwrap() {
        client.tasks().await_success(&mut task).await.unwrap();
    }
    assert!(client.metadata().get_all(&org).await.unwrap().is_empty());

    stub.close().await.unwrap();
}

#[tokio::test]
async fn catalog_create_then_delete() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::Admin);
    let org = seed_org_address();

    let created = client
        .catalogs()
        .create_in_org(&org, &NewCatalog::new("Scenario Catalog"))
        .await
        .unwrap();
    let mut task = created.task.expect("creation task");
    client.tasks().await_success(&mut task).await.unwrap();

    let listed = client.catalogs().list_in_org(&org).await.unwrap();
    assert!(listed.iter().any(|c| c.id.as_deref() == Some(created.catalog.id.as_str())));

    let address = EntityAddress::try_from(&created.catalog.reference()).unwrap();
    let mut task = client.catalogs().delete(&address).await.unwrap();
    let outcome = client.tasks().await_terminal(&mut task).await.unwrap();
    assert_eq!(outcome.status(), TaskStatus::Success);

    let listed = client.catalogs().list_in_org(&org).await.unwrap();
    assert!(!listed.iter().any(|c| c.id.as_deref() == Some(created.catalog.id.as_str())));

    stub.close().await.unwrap();
}

#[tokio::test]
async fn duplicate_catalog_name_fails_with_task_error() {
    let stub = start_stub(1);
    let client = client_for(&stub, Scope::Admin);
    let org = seed_org_address();
    let params = NewCatalog::new("Twice");

    let first = client.catalogs().create_in_org(&org, &params).await.unwrap();
    if let Some(mut task) = first.task {
        client.tasks().await_success(&mut task).await.unwrap();
    }

    let second = client.catalogs().create_in_org(&org, &params).await.unwrap();
    let mut task = second.task.expect("creation task");
    let err = client.tasks().await_success(&mut task).await.unwrap_err();
    match err {
        Error::TaskFailed { status, detail, .. } => {
            assert_eq!(status, TaskStatus::Error);
            assert_eq!(detail.minor_error_code, "DUPLICATE_NAME");
        }
        other => panic!("expected task failure, got {other}"),
    }

    stub.close().await.unwrap();
}

#[tokio::test]
async fn timeout_then_resume_on_same_handle() {
    let stub = start_stub(3);
    let client = client_for(&stub, Scope::Admin);

    let mut task = client
        .metadata()
        .put_entry(&seed_org_locator(&stub), "slow", "value")
        .await
        .unwrap();

    let short = WaitPolicy::new(Duration::from_millis(10), Duration::ZERO);
    let err = client
        .tasks()
        .await_terminal_with(&mut task, &short)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TaskTimeout { .. }));

    let outcome = client.tasks().await_terminal(&mut task).await.unwrap();
    assert!(outcome.is_success());

    // Terminal state sticks on further polls
    assert_eq!(client.tasks().poll(&mut task).await.unwrap(), TaskStatus::Success);

    stub.close().await.unwrap();
}

#[tokio::test]
async fn lifecycle_sets_up_verifies_and_tears_down() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::Admin);

    let spec = FixtureSpec::new(seed_org_address()).with_metadata("fixture-key", "fixture-value");
    let result = client.run_lifecycle(&spec).await;

    let check = result.outcome.unwrap();
    assert!(check.metadata_matches);
    assert!(check.catalog_listed);
    assert_eq!(result.state.phase, LifecyclePhase::TeardownAttempted);
    assert!(result.teardown.is_clean(), "{:?}", result.teardown);
    assert_eq!(result.teardown.released.len(), 2);

    assert!(stub.context().catalog_names().is_empty());
    let metadata = stub.context().org_metadata(SEED_ORG_ID).unwrap();
    assert!(!metadata.contains_key("fixture-key"));

    stub.close().await.unwrap();
}

#[tokio::test]
async fn lifecycle_releases_recorded_fixtures_after_failed_setup() {
    let stub = start_stub(1);
    let client = client_for(&stub, Scope::Admin);

    // A catalog with the fixture's name makes the creation task fail
    let taken = NewCatalog::new("Taken");
    let existing = client
        .catalogs()
        .create_in_org(&seed_org_address(), &taken)
        .await
        .unwrap();
    if let Some(mut task) = existing.task {
        client.tasks().await_success(&mut task).await.unwrap();
    }

    let spec = FixtureSpec::new(seed_org_address()).with_catalog(taken);
    let result = client
        .lifecycle()
        .run(&spec, |_| async { Ok::<_, Error>(()) })
        .await;

    assert!(matches!(result.outcome, Err(Error::TaskFailed { .. })));
    assert_eq!(result.state.phase, LifecyclePhase::TeardownAttempted);
    assert!(result.teardown.is_clean(), "{:?}", result.teardown);

    // The metadata fixture is gone, the pre-existing catalog is untouched
    let metadata = stub.context().org_metadata(SEED_ORG_ID).unwrap();
    assert!(!metadata.contains_key("KEY"));
    assert_eq!(stub.context().catalog_names(), vec!["Taken".to_string()]);

    stub.close().await.unwrap();
}

#[tokio::test]
async fn lifecycle_in_user_scope_never_sets_up() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::User);

    let result = client.run_lifecycle(&FixtureSpec::new(seed_org_address())).await;
    assert!(matches!(result.outcome, Err(Error::AdminScopeRequired { .. })));
    assert_eq!(result.state.phase, LifecyclePhase::NotSetup);
    assert!(result.teardown.released.is_empty());
    assert_eq!(stub.context().task_count(), 0);

    stub.close().await.unwrap();
}

#[tokio::test]
async fn admin_locator_rewrite_is_idempotent_and_scoped() {
    let stub = start_stub(2);
    let client = client_for(&stub, Scope::Admin);

    let user = client.resolver().resolve_urn(&seed_org_urn()).await.unwrap();
    let admin = client.resolver().to_admin_locator(&user).unwrap();
    assert_eq!(client.resolver().to_admin_locator(&admin).unwrap(), admin);
    assert_eq!(client.resolver().to_user_locator(&admin).unwrap(), user);

    let foreign = Locator::parse("https://elsewhere.example.com/api/org/1").unwrap();
    assert!(matches!(
        client.resolver().to_admin_locator(&foreign),
        Err(Error::InvalidScope { .. })
    ));

    stub.close().await.unwrap();
}

fn uuid_of(n: u128) -> uuid::Uuid {
    uuid::Uuid::from_u128(n)
}
