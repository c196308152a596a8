// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Shared helpers for vcd-client integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use vcd_client::{
    EntityAddress, EntityKind, HttpTransport, Locator, PrivilegeContext, Scope, Urn, VcdClient,
    WaitPolicy,
};
use vcd_stub_server::{RunningStub, SEED_ORG_ID, StubConfig};

/// Policy fast enough for tests against the stub
pub fn fast_policy() -> WaitPolicy {
    WaitPolicy::new(Duration::from_millis(10), Duration::from_secs(5))
}

/// Start a seeded stub on an ephemeral port
pub fn start_stub(polls_to_complete: u32) -> RunningStub {
    vcd_stub_server::start(
        "127.0.0.1:0".parse().unwrap(),
        StubConfig { polls_to_complete },
    )
    .expect("failed to start stub server")
}

/// Client talking to `stub` in the given scope
pub fn client_for(stub: &RunningStub, scope: Scope) -> VcdClient {
    let transport = HttpTransport::new(None, Duration::from_secs(5)).expect("transport");
    let base = Locator::parse(&stub.api_url()).unwrap();
    VcdClient::with_transport(
        Arc::new(transport),
        PrivilegeContext::from_api_base(base, scope),
        fast_policy(),
    )
}

pub fn seed_org_urn() -> Urn {
    Urn::new(EntityKind::Organization, SEED_ORG_ID)
}

pub fn seed_org_address() -> EntityAddress {
    EntityAddress::Identifier(seed_org_urn())
}

/// User-view locator of the seeded organization
pub fn seed_org_locator(stub: &RunningStub) -> Locator {
    Locator::parse(&format!("{}org/{}", stub.api_url(), SEED_ORG_ID)).unwrap()
}
