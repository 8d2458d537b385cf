// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake document store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DocumentStore, MemorySession, MemoryStore, StoreError, StoreSession};
use async_trait::async_trait;
use lodge_core::{Document, Filter, FindOptions, GroupBy, Namespace};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Connect { uri: String },
    InsertMany { ns: Namespace, count: usize },
    Find { ns: Namespace },
    CountDocuments { ns: Namespace },
    Aggregate { ns: Namespace },
    ListCollections { database: String },
    Disconnect,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<StoreCall>,
    connect_failures: u32,
    insert_failures: u32,
    read_failures: u32,
    failing_collections: HashSet<String>,
}

/// Fake store with call recording and failure injection
#[derive(Clone, Default)]
pub struct FakeStore {
    backing: MemoryStore,
    state: Arc<Mutex<FakeState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Fail the next `n` connects
    pub fn fail_connects(&self, n: u32) {
        self.state().connect_failures = n;
    }

    /// Fail the next `n` inserts, whatever the collection
    pub fn fail_inserts(&self, n: u32) {
        self.state().insert_failures = n;
    }

    /// Fail the next `n` find/count/aggregate calls
    pub fn fail_reads(&self, n: u32) {
        self.state().read_failures = n;
    }

    /// Reject every insert into `collection` until healed
    pub fn fail_collection(&self, collection: &str) {
        self.state()
            .failing_collections
            .insert(collection.to_string());
    }

    pub fn heal_collection(&self, collection: &str) {
        self.state().failing_collections.remove(collection);
    }

    /// Documents stored in a collection
    pub fn documents(&self, ns: &Namespace) -> Vec<Document> {
        self.backing.documents(ns)
    }

    /// `Message` fields of stored documents, in insertion order
    pub fn messages(&self, ns: &Namespace) -> Vec<String> {
        self.documents(ns)
            .iter()
            .filter_map(|d| d.get("Message").and_then(|m| m.as_str()).map(String::from))
            .collect()
    }

    /// Store a document that bypasses any shape checks
    pub fn insert_bad_document(&self, ns: &Namespace, doc: Document) {
        self.backing.put_raw(ns, doc);
    }

    /// Count recorded calls matching a predicate
    pub fn count_calls(&self, pred: impl Fn(&StoreCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    type Session = FakeSession;

    async fn connect(&self, uri: &str) -> Result<FakeSession, StoreError> {
        {
            let mut state = self.state();
            state.calls.push(StoreCall::Connect {
                uri: uri.to_string(),
            });
            if state.connect_failures > 0 {
                state.connect_failures -= 1;
                return Err(StoreError::ConnectFailed("injected failure".to_string()));
            }
        }

        Ok(FakeSession {
            inner: self.backing.connect(uri).await?,
            state: Arc::clone(&self.state),
        })
    }
}

/// Session handed out by [`FakeStore`]
pub struct FakeSession {
    inner: MemorySession,
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    fn record(&self, call: StoreCall) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .push(call);
    }

    fn check_read(&self, call: StoreCall) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(call);
        if state.read_failures > 0 {
            state.read_failures -= 1;
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreSession for FakeSession {
    async fn insert_many(
        &self,
        ns: &Namespace,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.push(StoreCall::InsertMany {
                ns: ns.clone(),
                count: docs.len(),
            });
            if state.failing_collections.contains(&ns.collection) {
                return Err(StoreError::Rejected {
                    namespace: ns.to_string(),
                    reason: "collection marked failing".to_string(),
                });
            }
            if state.insert_failures > 0 {
                state.insert_failures -= 1;
                return Err(StoreError::Rejected {
                    namespace: ns.to_string(),
                    reason: "injected failure".to_string(),
                });
            }
        }
        self.inner.insert_many(ns, docs).await
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_read(StoreCall::Find { ns: ns.clone() })?;
        self.inner.find(ns, filter, options).await
    }

    async fn count_documents(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        self.check_read(StoreCall::CountDocuments { ns: ns.clone() })?;
        self.inner.count_documents(ns, filter).await
    }

    async fn aggregate(
        &self,
        ns: &Namespace,
        group: &GroupBy,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_read(StoreCall::Aggregate { ns: ns.clone() })?;
        self.inner.aggregate(ns, group).await
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        self.record(StoreCall::ListCollections {
            database: database.to_string(),
        });
        self.inner.list_collections(database).await
    }

    async fn disconnect(&self) {
        self.record(StoreCall::Disconnect);
        self.inner.disconnect().await;
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
