// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrappers for consistent observability

use crate::store::{DocumentStore, StoreError, StoreSession};
use async_trait::async_trait;
use lodge_core::{Document, Filter, FindOptions, GroupBy, Namespace};
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any DocumentStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

/// Strip credentials-bearing query parameters before logging a URI
fn redact(uri: &str) -> &str {
    uri.split_once('?').map(|(base, _)| base).unwrap_or(uri)
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for TracedStore<S> {
    type Session = TracedSession<S::Session>;

    async fn connect(&self, uri: &str) -> Result<Self::Session, StoreError> {
        let span = tracing::info_span!("store.connect", uri = redact(uri));
        async {
            let start = Instant::now();
            let result = self.inner.connect(uri).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(_) => tracing::debug!(elapsed_ms, "connected"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "connect failed"),
            }

            result.map(|inner| TracedSession { inner })
        }
        .instrument(span)
        .await
    }
}

/// Session wrapper produced by [`TracedStore`]
pub struct TracedSession<T> {
    inner: T,
}

#[async_trait]
impl<T: StoreSession> StoreSession for TracedSession<T> {
    async fn insert_many(
        &self,
        ns: &Namespace,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        let span = tracing::info_span!("store.insert_many", ns = %ns);
        async {
            let count = docs.len();
            let start = Instant::now();
            let result = self.inner.insert_many(ns, docs).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(ids) => tracing::info!(count, inserted = ids.len(), elapsed_ms, "inserted"),
                Err(e) => tracing::error!(count, elapsed_ms, error = %e, "insert failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let span = tracing::debug_span!("store.find", ns = %ns);
        async {
            let start = Instant::now();
            let result = self.inner.find(ns, filter, options).await;
            tracing::debug!(
                found = result.as_ref().map(|v| v.len()).ok(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                error = result.as_ref().err().map(tracing::field::display),
                "find"
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn count_documents(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        let span = tracing::debug_span!("store.count", ns = %ns);
        async {
            let result = self.inner.count_documents(ns, filter).await;
            tracing::debug!(
                count = result.as_ref().ok(),
                error = result.as_ref().err().map(tracing::field::display),
                "counted"
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn aggregate(
        &self,
        ns: &Namespace,
        group: &GroupBy,
    ) -> Result<Vec<Document>, StoreError> {
        let span = tracing::debug_span!("store.aggregate", ns = %ns, key = %group.key);
        async {
            let start = Instant::now();
            let result = self.inner.aggregate(ns, group).await;
            tracing::debug!(
                groups = result.as_ref().map(|v| v.len()).ok(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                error = result.as_ref().err().map(tracing::field::display),
                "aggregated"
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        let result = self.inner.list_collections(database).await;
        tracing::trace!(
            database,
            count = result.as_ref().map(|v| v.len()).ok(),
            "listed collections"
        );
        result
    }

    async fn disconnect(&self) {
        self.inner.disconnect().await;
        tracing::trace!("disconnected");
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
