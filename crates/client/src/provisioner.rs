// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-operation session acquisition

use lodge_adapters::{DocumentStore, StoreError, StoreSession};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Opens one session per unit of work against a fixed URI
#[derive(Clone)]
pub struct Provisioner<S> {
    store: S,
    uri: String,
    connect_timeout: Duration,
}

impl<S: DocumentStore> Provisioner<S> {
    pub fn new(store: S, uri: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            store,
            uri: uri.into(),
            connect_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Open a session, bounded by the connect timeout
    pub async fn acquire(&self) -> Result<S::Session, StoreError> {
        match tokio::time::timeout(self.connect_timeout, self.store.connect(&self.uri)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.connect_timeout)),
        }
    }

    /// Run `work` on a fresh session and disconnect it whatever the outcome
    pub async fn run<T, F, Fut>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(Arc<S::Session>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let session = Arc::new(self.acquire().await?);
        let result = work(Arc::clone(&session)).await;
        session.disconnect().await;
        result
    }
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod tests;
