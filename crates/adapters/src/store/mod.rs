// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document store adapters
//!
//! A [`DocumentStore`] hands out one [`StoreSession`] per unit of work.
//! Callers disconnect the session on every exit path.

pub mod eval;
mod memory;

pub use memory::{MemorySession, MemoryStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeStore, StoreCall};

use async_trait::async_trait;
use lodge_core::{Classify, Document, Filter, FindOptions, GroupBy, Namespace};
use std::time::Duration;
use thiserror::Error;

/// Errors from document store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("write to {namespace} rejected: {reason}")]
    Rejected { namespace: String, reason: String },
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Classify for StoreError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectFailed(_)
                | StoreError::Timeout(_)
                | StoreError::Unavailable(_)
                | StoreError::Io(_)
        )
    }
}

/// Source of sessions against a document database
#[async_trait]
pub trait DocumentStore: Clone + Send + Sync + 'static {
    type Session: StoreSession;

    /// Open a session
    async fn connect(&self, uri: &str) -> Result<Self::Session, StoreError>;
}

/// One open connection to a document database
#[async_trait]
pub trait StoreSession: Send + Sync + 'static {
    /// Insert documents, returning their assigned ids in order
    async fn insert_many(
        &self,
        ns: &Namespace,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError>;

    /// Documents matching `filter`, sorted and limited per `options`
    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn count_documents(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError>;

    /// Grouped count; one `{ Name, Count }` document per distinct key value
    async fn aggregate(&self, ns: &Namespace, group: &GroupBy)
        -> Result<Vec<Document>, StoreError>;

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError>;

    /// Release the session; later calls fail with `Unavailable`
    async fn disconnect(&self);
}
