// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! vCloud Director type definitions

pub mod catalog;
pub mod common;
pub mod metadata;
pub mod org;
pub mod task;

pub use catalog::*;
pub use common::*;
pub use metadata::*;
pub use org::*;
pub use task::*;
