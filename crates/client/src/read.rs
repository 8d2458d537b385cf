// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read path
//!
//! Each read opens its own session and is retried under the client's read
//! policy. Decoding happens after the retry loop, so a malformed document
//! fails the call without another round trip.

use crate::client::LogClient;
use crate::error::ClientError;
use chrono::{DateTime, SecondsFormat, Utc};
use lodge_adapters::{DocumentStore, StoreError, StoreSession};
use lodge_core::{
    with_retry, Document, Filter, FindOptions, GroupBy, GroupCount, LogLine, Namespace, Sort,
};
use std::future::Future;
use std::sync::Arc;

fn instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn decode<T>(
    ns: &Namespace,
    docs: Vec<Document>,
    f: impl Fn(Document) -> Result<T, serde_json::Error>,
) -> Result<Vec<T>, ClientError> {
    docs.into_iter()
        .map(|doc| {
            f(doc).map_err(|source| ClientError::Decode {
                namespace: ns.to_string(),
                source,
            })
        })
        .collect()
}

impl<S: DocumentStore> LogClient<S> {
    async fn read<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: Fn(Arc<S::Session>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        with_retry(&*self.read_policy, || self.provisioner.run(&op)).await
    }

    fn label_filter(&self, label: Option<&str>) -> Filter {
        match label {
            Some(label) => Filter::eq(self.config.groups.label_field.as_str(), label),
            None => Filter::All,
        }
    }

    /// Every line in a collection, in storage order
    pub async fn get_collection(&self, collection: &str) -> Result<Vec<LogLine>, ClientError> {
        let ns = self.config.namespace(collection);
        let options = FindOptions::default();
        let (ns_ref, options) = (&ns, &options);
        let docs = self
            .read(|s| async move { s.find(ns_ref, &Filter::All, options).await })
            .await?;
        decode(&ns, docs, LogLine::from_document)
    }

    /// Most recent line whose message matches `pattern`, case-insensitively
    pub async fn find_recent_matching(
        &self,
        collection: &str,
        pattern: &str,
    ) -> Result<Option<LogLine>, ClientError> {
        let ns = self.config.namespace(collection);
        let filter = Filter::matches(LogLine::MESSAGE_FIELD, pattern);
        let options = FindOptions::default()
            .sorted(Sort::descending(LogLine::TIMESTAMP_FIELD))
            .limit(1);
        let (ns_ref, filter, options) = (&ns, &filter, &options);

        let docs = self
            .read(|s| async move { s.find(ns_ref, filter, options).await })
            .await?;
        Ok(decode(&ns, docs, LogLine::from_document)?.into_iter().next())
    }

    /// Lines stamped strictly after `since`, optionally matching `pattern`
    pub async fn count_since(
        &self,
        collection: &str,
        pattern: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<u64, ClientError> {
        let ns = self.config.namespace(collection);
        let filter = Filter::and([
            Filter::after(LogLine::TIMESTAMP_FIELD, instant(since)),
            pattern
                .map(|p| Filter::matches(LogLine::MESSAGE_FIELD, p))
                .unwrap_or_default(),
        ]);
        let (ns, filter) = (&ns, &filter);
        Ok(self
            .read(|s| async move { s.count_documents(ns, filter).await })
            .await?)
    }

    /// Counts per label value, optionally limited to dates after `since`
    ///
    /// The label and date fields come from `[groups]` configuration.
    pub async fn group_count_by_label(
        &self,
        collection: &str,
        since: Option<&str>,
    ) -> Result<Vec<GroupCount>, ClientError> {
        let ns = self.config.namespace(collection);
        let groups = &self.config.groups;
        let mut group = GroupBy::new(groups.label_field.as_str());
        if let Some(since) = since {
            group = group.with_filter(Filter::after(groups.date_field.as_str(), since));
        }
        let (ns_ref, group) = (&ns, &group);

        let docs = self
            .read(|s| async move { s.aggregate(ns_ref, group).await })
            .await?;
        decode(&ns, docs, GroupCount::from_document)
    }

    /// Documents carrying `label`, or all documents when `None`
    pub async fn count_by_label(
        &self,
        collection: &str,
        label: Option<&str>,
    ) -> Result<u64, ClientError> {
        let ns = self.config.namespace(collection);
        let filter = self.label_filter(label);
        let (ns, filter) = (&ns, &filter);
        Ok(self
            .read(|s| async move { s.count_documents(ns, filter).await })
            .await?)
    }

    /// Documents dated after `since`, optionally carrying `label`
    pub async fn count_in_period(
        &self,
        collection: &str,
        since: &str,
        label: Option<&str>,
    ) -> Result<u64, ClientError> {
        let ns = self.config.namespace(collection);
        let filter = Filter::and([
            Filter::after(self.config.groups.date_field.as_str(), since),
            self.label_filter(label),
        ]);
        let (ns, filter) = (&ns, &filter);
        Ok(self
            .read(|s| async move { s.count_documents(ns, filter).await })
            .await?)
    }

    /// Collection names in the default database; not retried
    pub async fn list_collections(&self) -> Result<Vec<String>, ClientError> {
        let database = self.config.connection.database.as_str();
        Ok(self
            .provisioner
            .run(|s| async move { s.list_collections(database).await })
            .await?)
    }
}

#[cfg(test)]
#[path = "read_tests.rs"]
mod tests;
