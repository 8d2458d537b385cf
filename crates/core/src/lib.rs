// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lodge-core: Core library for the lodge log-ingestion client
//!
//! This crate provides:
//! - Log record types and their wire shape
//! - The pending-write ledger state machine
//! - Retry policies and the retry loop
//! - A typed query model for the document store collaborator
//! - Client configuration

pub mod config;
pub mod ledger;
pub mod line;
pub mod query;
pub mod retry;

pub use config::{
    ClientConfig, ConfigError, ConnectionConfig, DrainConfig, GroupConfig, RetryConfig,
    CERTIFICATE_FILE_NAME, SYSTEM_CERTIFICATE_PATH,
};
pub use ledger::{
    DrainOutcome, DrainReport, Insertion, Ledger, LedgerSink, DEFAULT_ABANDON_AFTER,
};
pub use line::{GroupCount, Level, LogLine};
pub use query::{Document, Filter, FindOptions, GroupBy, Namespace, Sort};
pub use retry::{with_retry, Attempts, Backoff, Classify, RetryPolicy, TransientOnly};
