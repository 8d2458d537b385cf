// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! File-backed document store
//!
//! Each collection is a JSON-lines file under `<root>/<database>/`.

mod collection;
mod store;

pub use collection::{CollectionError, CollectionFile};
pub use store::{JsonlSession, JsonlStore};
