// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Table output formatting

use comfy_table::{Table, presets::NOTHING};

/// Create a new table with headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(headers);
    table
}

/// Two-column FIELD/VALUE table for a single entity
pub fn create_detail_table(rows: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    for (field, value) in rows {
        table.add_row(vec![field.to_string(), value.clone()]);
    }
    table
}

/// Format a table and print it
pub fn print_table(table: Table) {
    println!("{table}");
}

/// Shorten long values for display
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let kept: String = value.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_values() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn truncate_marks_cut_values() {
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
