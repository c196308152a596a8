// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! End-to-end CLI scenarios against an in-process stub server

// Allow expect/unwrap in tests - they provide clear panic messages on failure
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::StubHarness;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use vcd_stub_server::{SEED_ORG_ID, SEED_ORG_NAME};

fn seed_org() -> String {
    format!("urn:vcloud:org:{}", SEED_ORG_ID)
}

#[test]
fn org_list_shows_seeded_org() {
    let harness = StubHarness::start();
    harness
        .cmd()
        .args(["org", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(SEED_ORG_NAME))
        .stdout(predicate::str::contains(seed_org()));
}

#[test]
fn org_get_json_is_parseable() {
    let harness = StubHarness::start();
    let output = harness
        .cmd()
        .args(["--json", "org", "get", &seed_org()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let org: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(org["name"], SEED_ORG_NAME);
    assert_eq!(org["id"], seed_org());
}

#[test]
fn metadata_set_requires_admin_scope() {
    let harness = StubHarness::start();
    harness
        .cmd()
        .args(["metadata", "set", &seed_org(), "owner=ops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin"));
    assert_eq!(harness.stub().context().task_count(), 0);
}

#[test]
fn metadata_set_get_delete() {
    let harness = StubHarness::start();
    let org = seed_org();

    harness
        .admin_cmd()
        .args(["metadata", "set", &org, "owner=ops"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set metadata owner"));

    harness
        .cmd()
        .args(["metadata", "get", &org, "owner"])
        .assert()
        .success()
        .stdout(predicate::str::diff("ops\n"));

    harness
        .admin_cmd()
        .args(["metadata", "rm", &org, "owner"])
        .assert()
        .success();

    harness
        .cmd()
        .args(["metadata", "get", &org, "owner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner"));
}

#[test]
fn catalog_create_and_delete() {
    let harness = StubHarness::start();
    let org = seed_org();

    let output = harness
        .admin_cmd()
        .args(["--json", "catalog", "create", &org, "cli-catalog"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = catalog["id"].as_str().unwrap().to_string();
    assert!(harness
        .stub()
        .context()
        .catalog_names()
        .contains(&"cli-catalog".to_string()));

    harness
        .admin_cmd()
        .args(["catalog", "delete", &id])
        .assert()
        .success();
    assert!(!harness
        .stub()
        .context()
        .catalog_names()
        .contains(&"cli-catalog".to_string()));
}

#[test]
fn fixture_run_cleans_up() {
    let harness = StubHarness::start();
    let catalogs_before = harness.stub().context().catalog_names();

    harness
        .admin_cmd()
        .args(["fixture", "run", &seed_org(), "--catalog-name", "fixture-catalog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matches"));

    assert_eq!(harness.stub().context().catalog_names(), catalogs_before);
    let metadata = harness.stub().context().org_metadata(SEED_ORG_ID).unwrap();
    assert!(!metadata.contains_key("KEY"));
}
