// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Log-ingestion client
//!
//! Writes log lines into per-collection document sets, buffers lines whose
//! write failed in a [`Ledger`](lodge_core::Ledger), and re-attempts them
//! after each later successful write.

mod client;
mod drain;
mod error;
mod provisioner;
mod read;
mod write;

pub use client::LogClient;
pub use drain::DrainTask;
pub use error::ClientError;
pub use provisioner::Provisioner;
pub use write::WriteReceipt;
