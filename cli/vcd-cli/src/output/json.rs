// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! `--json` output for vcd commands

use serde::Serialize;

/// Write an entity, reference list, or report to stdout as pretty JSON
///
/// Diagnostics and logs go to stderr, so stdout holds only this document.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let document = serde_json::to_string_pretty(value)?;
    println!("{document}");
    Ok(())
}
