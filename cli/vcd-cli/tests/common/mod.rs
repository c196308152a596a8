// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Test helpers for vcd-cli integration tests

// Allow unused code - not every test binary uses every helper
// Allow deprecated - cargo_bin is standard for CLI testing
#![allow(dead_code, deprecated)]

use assert_cmd::Command;
use vcd_stub_server::{RunningStub, StubConfig};

const VCD_ENV: &[&str] = &[
    "VCD_URL",
    "VCD_ADMIN_URL",
    "VCD_SESSION_TOKEN",
    "VCD_SCOPE",
    "VCD_HTTP_TIMEOUT_SECS",
    "VCD_TASK_POLL_INTERVAL_MS",
    "VCD_TASK_TIMEOUT_SECS",
    "VCD_TASK_MAX_POLL_FAILURES",
    "RUST_LOG",
];

/// Get a Command for running the vcd binary, isolated from the caller's
/// VCD_* environment
pub fn vcd_cmd() -> Command {
    let mut cmd = Command::cargo_bin("vcd").expect("Failed to find vcd binary");
    for name in VCD_ENV {
        cmd.env_remove(name);
    }
    cmd
}

/// A stub server running on its own runtime while blocking CLI commands
/// execute on the test thread
pub struct StubHarness {
    runtime: tokio::runtime::Runtime,
    stub: Option<RunningStub>,
}

impl StubHarness {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
        let stub = {
            let _guard = runtime.enter();
            vcd_stub_server::start(
                "127.0.0.1:0".parse().expect("bind address"),
                StubConfig {
                    polls_to_complete: 1,
                },
            )
            .expect("Failed to start stub server")
        };
        Self {
            runtime,
            stub: Some(stub),
        }
    }

    pub fn api_url(&self) -> String {
        self.stub().api_url()
    }

    pub fn stub(&self) -> &RunningStub {
        self.stub.as_ref().expect("stub already closed")
    }

    /// vcd command pointed at the stub with fast task polling
    pub fn cmd(&self) -> Command {
        let mut cmd = vcd_cmd();
        cmd.env("VCD_URL", self.api_url())
            .env("VCD_TASK_POLL_INTERVAL_MS", "10")
            .env("VCD_TASK_TIMEOUT_SECS", "5");
        cmd
    }

    /// Same as [`StubHarness::cmd`], in admin scope
    pub fn admin_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.env("VCD_SCOPE", "admin");
        cmd
    }
}

impl Drop for StubHarness {
    fn drop(&mut self) {
        if let Some(stub) = self.stub.take() {
            let _ = self.runtime.block_on(stub.close());
        }
    }
}
