// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Offline rewriting of locators between the user and admin views

use anyhow::Result;
use clap::{Args, Subcommand};
use vcd_client::{Locator, PrivilegeContext};

#[derive(Subcommand, Clone)]
pub enum LocatorCommand {
    /// Print the admin-view counterpart of a locator
    Admin(LocatorArgs),
    /// Print the user-view counterpart of a locator
    User(LocatorArgs),
}

#[derive(Args, Clone)]
pub struct LocatorArgs {
    /// Locator (href) under the configured API base
    pub locator: String,
}

impl LocatorCommand {
    pub fn run(self, context: &PrivilegeContext) -> Result<()> {
        let rewritten = match self {
            Self::Admin(args) => context.to_admin_locator(&Locator::parse(&args.locator)?)?,
            Self::User(args) => context.to_user_locator(&Locator::parse(&args.locator)?)?,
        };
        println!("{}", rewritten);
        Ok(())
    }
}
