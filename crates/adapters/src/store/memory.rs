// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-local document store

use super::{eval, DocumentStore, StoreError, StoreSession};
use async_trait::async_trait;
use lodge_core::{Document, Filter, FindOptions, GroupBy, Namespace};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Collections = BTreeMap<Namespace, Vec<Document>>;

/// In-memory document store; clones share the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents in a collection, in insertion order
    pub fn documents(&self, ns: &Namespace) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(ns)
            .cloned()
            .unwrap_or_default()
    }

    /// Store a document as-is, bypassing id assignment
    pub fn put_raw(&self, ns: &Namespace, doc: Document) {
        self.collections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(ns.clone())
            .or_default()
            .push(doc);
    }

    fn open_session(&self) -> MemorySession {
        MemorySession {
            collections: Arc::clone(&self.collections),
            open: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    type Session = MemorySession;

    async fn connect(&self, _uri: &str) -> Result<MemorySession, StoreError> {
        Ok(self.open_session())
    }
}

/// Session over a [`MemoryStore`]
pub struct MemorySession {
    collections: Arc<Mutex<Collections>>,
    open: AtomicBool,
}

impl MemorySession {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("session closed".to_string()))
        }
    }

    fn with_collection<T>(&self, ns: &Namespace, f: impl FnOnce(&[Document]) -> T) -> T {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        f(collections.get(ns).map(Vec::as_slice).unwrap_or_default())
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn insert_many(
        &self,
        ns: &Namespace,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let (ids, stored) = eval::assign_ids(docs);

        if !stored.is_empty() {
            self.collections
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .entry(ns.clone())
                .or_default()
                .extend(stored);
        }
        Ok(ids)
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_open()?;
        self.with_collection(ns, |docs| eval::find(docs, filter, options))
    }

    async fn count_documents(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        self.ensure_open()?;
        self.with_collection(ns, |docs| eval::count(docs, filter))
    }

    async fn aggregate(
        &self,
        ns: &Namespace,
        group: &GroupBy,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_open()?;
        self.with_collection(ns, |docs| eval::group(docs, group))
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .keys()
            .filter(|ns| ns.database == database)
            .map(|ns| ns.collection.clone())
            .collect())
    }

    async fn disconnect(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
