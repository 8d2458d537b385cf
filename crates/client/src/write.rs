// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write path
//!
//! A write that fails for any reason lands in the ledger. A write that
//! succeeds is followed by a drain of the ledger on the same session.

use crate::client::LogClient;
use crate::error::ClientError;
use async_trait::async_trait;
use lodge_adapters::{DocumentStore, StoreError, StoreSession};
use lodge_core::{ClientConfig, Document, DrainReport, LedgerSink, LogLine};

/// Outcome of a successful insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Ids assigned by the store, in line order
    pub ids: Vec<String>,
    /// Drain that followed the insert
    pub drain: DrainReport,
}

pub(crate) fn encode(lines: &[LogLine]) -> Result<Vec<Document>, serde_json::Error> {
    lines.iter().map(LogLine::to_document).collect()
}

/// Drains buffered batches through an already open session
pub(crate) struct SessionSink<'a, T> {
    pub(crate) session: &'a T,
    pub(crate) config: &'a ClientConfig,
}

#[async_trait]
impl<'a, T: StoreSession> LedgerSink for SessionSink<'a, T> {
    type Error = StoreError;

    async fn write_batch(&self, collection: &str, lines: &[LogLine]) -> Result<(), StoreError> {
        let docs = encode(lines)?;
        let ns = self.config.namespace(collection);
        self.session.insert_many(&ns, docs).await.map(|_| ())
    }
}

impl<S: DocumentStore> LogClient<S> {
    pub async fn insert_one(
        &self,
        collection: &str,
        line: LogLine,
    ) -> Result<WriteReceipt, ClientError> {
        self.insert_many(collection, vec![line]).await
    }

    /// Store `lines` in `collection`, buffering them on failure
    ///
    /// On success the ledger is drained before returning; drain failures are
    /// reported in the receipt, never as an error.
    pub async fn insert_many(
        &self,
        collection: &str,
        lines: Vec<LogLine>,
    ) -> Result<WriteReceipt, ClientError> {
        let ns = self.config.namespace(collection);
        let docs = encode(&lines).map_err(ClientError::Encode)?;

        let session = match self.provisioner.acquire().await {
            Ok(session) => session,
            Err(e) => return Err(self.divert(collection, lines, e).await),
        };

        match session.insert_many(&ns, docs).await {
            Ok(ids) => {
                tracing::debug!(ns = %ns, lines = ids.len(), "inserted");
                let drain = self.drain_on(&session).await;
                session.disconnect().await;
                Ok(WriteReceipt { ids, drain })
            }
            Err(e) => {
                session.disconnect().await;
                Err(self.divert(collection, lines, e).await)
            }
        }
    }

    async fn divert(&self, collection: &str, lines: Vec<LogLine>, source: StoreError) -> ClientError {
        let count = lines.len();
        let buffered = self.ledger.lock().await.merge(collection, lines);
        tracing::error!(
            collection,
            lines = count,
            buffered,
            error = %source,
            "write failed, lines buffered"
        );
        ClientError::WriteFailed {
            collection: collection.to_string(),
            buffered,
            source,
        }
    }

    /// Drain the ledger through `session`
    pub(crate) async fn drain_on(&self, session: &S::Session) -> DrainReport {
        let mut ledger = self.ledger.lock().await;
        if ledger.is_empty() {
            return DrainReport::default();
        }
        let sink = SessionSink {
            session,
            config: self.config.as_ref(),
        };
        ledger.drain_all(&sink).await
    }
}

#[cfg(test)]
#[path = "write_tests.rs"]
mod tests;
