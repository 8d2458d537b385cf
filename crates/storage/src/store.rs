// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`DocumentStore`] over a directory of collection files

use crate::collection::{CollectionError, CollectionFile};
use async_trait::async_trait;
use lodge_adapters::store::eval;
use lodge_adapters::{DocumentStore, StoreError, StoreSession};
use lodge_core::{Document, Filter, FindOptions, GroupBy, Namespace};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const EXTENSION: &str = "jsonl";

impl From<CollectionError> for StoreError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::Io(e) => StoreError::Io(e),
            CollectionError::Json(e) => StoreError::Json(e),
        }
    }
}

/// Durable local store rooted at a directory
///
/// Layout: `<root>/<database>/<collection>.jsonl`. Clones share one write
/// lock so appends from different sessions never interleave.
#[derive(Clone)]
pub struct JsonlStore {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonlStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentStore for JsonlStore {
    type Session = JsonlSession;

    async fn connect(&self, _uri: &str) -> Result<JsonlSession, StoreError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| StoreError::ConnectFailed(format!("{}: {}", self.root.display(), e)))?;
        Ok(JsonlSession {
            root: self.root.clone(),
            lock: Arc::clone(&self.lock),
            open: AtomicBool::new(true),
        })
    }
}

/// Session over a [`JsonlStore`]
pub struct JsonlSession {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
    open: AtomicBool,
}

impl JsonlSession {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("session closed".to_string()))
        }
    }

    fn collection(&self, ns: &Namespace) -> Result<CollectionFile, StoreError> {
        check_name(&ns.database)?;
        check_name(&ns.collection)?;
        Ok(CollectionFile::new(
            self.root
                .join(&ns.database)
                .join(format!("{}.{}", ns.collection, EXTENSION)),
        ))
    }

    fn load(&self, ns: &Namespace) -> Result<Vec<Document>, StoreError> {
        self.ensure_open()?;
        let file = self.collection(ns)?;
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(file.replay()?)
    }
}

/// Names become path components, so they must be plain
fn check_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidQuery(format!(
            "unusable namespace component: {:?}",
            name
        )));
    }
    Ok(())
}

#[async_trait]
impl StoreSession for JsonlSession {
    async fn insert_many(
        &self,
        ns: &Namespace,
        docs: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let file = self.collection(ns)?;

        let (ids, stored) = eval::assign_ids(docs);

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        file.append(&stored)?;
        Ok(ids)
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self.load(ns)?;
        eval::find(&docs, filter, options)
    }

    async fn count_documents(&self, ns: &Namespace, filter: &Filter) -> Result<u64, StoreError> {
        let docs = self.load(ns)?;
        eval::count(&docs, filter)
    }

    async fn aggregate(
        &self,
        ns: &Namespace,
        group: &GroupBy,
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self.load(ns)?;
        eval::group(&docs, group)
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        check_name(database)?;
        let dir = self.root.join(database);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn disconnect(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
