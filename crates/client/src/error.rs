// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the client

use lodge_adapters::StoreError;
use lodge_core::ConfigError;
use thiserror::Error;

/// Errors surfaced to callers of [`LogClient`](crate::LogClient)
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// The lines were not stored and now sit in the ledger
    #[error("write to {collection} failed ({buffered} lines buffered): {source}")]
    WriteFailed {
        collection: String,
        buffered: usize,
        source: StoreError,
    },
    #[error("document in {namespace} does not decode: {source}")]
    Decode {
        namespace: String,
        source: serde_json::Error,
    },
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
