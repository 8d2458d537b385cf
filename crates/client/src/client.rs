// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client handle shared by the write, drain and read paths

use crate::error::ClientError;
use crate::provisioner::Provisioner;
use lodge_adapters::{DocumentStore, StoreError};
use lodge_core::{Attempts, ClientConfig, ConfigError, Insertion, Ledger, RetryPolicy};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Logging client over a [`DocumentStore`]
///
/// Cheap to clone; clones share the pending-write ledger. The ledger lock is
/// held for the whole of a drain, so drains never overlap.
pub struct LogClient<S: DocumentStore> {
    pub(crate) provisioner: Provisioner<S>,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) ledger: Arc<Mutex<Ledger>>,
    pub(crate) read_policy: Arc<dyn RetryPolicy<StoreError>>,
}

impl<S: DocumentStore> Clone for LogClient<S> {
    fn clone(&self) -> Self {
        Self {
            provisioner: self.provisioner.clone(),
            config: Arc::clone(&self.config),
            ledger: Arc::clone(&self.ledger),
            read_policy: Arc::clone(&self.read_policy),
        }
    }
}

impl<S: DocumentStore> LogClient<S> {
    /// Build a client from configuration, resolving the TLS certificate
    /// against the working directory
    pub fn from_config(store: S, config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        let certificate = config.connection.resolve_certificate(&cwd)?;
        let uri = config.connection.uri(&certificate);
        tracing::info!(
            hosts = %config.connection.hosts,
            database = %config.connection.database,
            certificate = %certificate.display(),
            "log client configured"
        );
        Ok(Self::with_uri(store, config, uri))
    }

    /// Build a client against an explicit URI, skipping certificate lookup
    pub fn with_uri(store: S, config: ClientConfig, uri: impl Into<String>) -> Self {
        let provisioner = Provisioner::new(store, uri, config.connection.connect_timeout);
        let ledger = Ledger::new(config.drain.abandon_after);
        let read_policy = Attempts(config.retry.read_attempts);
        Self {
            provisioner,
            config: Arc::new(config),
            ledger: Arc::new(Mutex::new(ledger)),
            read_policy: Arc::new(read_policy),
        }
    }

    /// Replace the retry policy applied to reads
    pub fn with_read_policy(mut self, policy: impl RetryPolicy<StoreError> + 'static) -> Self {
        self.read_policy = Arc::new(policy);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.provisioner.store()
    }

    /// Snapshot of the buffered batches
    pub async fn pending(&self) -> Vec<Insertion> {
        self.ledger.lock().await.pending()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
