// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit and periodic draining

use crate::client::LogClient;
use crate::error::ClientError;
use async_trait::async_trait;
use lodge_adapters::{DocumentStore, StoreError, StoreSession};
use lodge_core::{ConfigError, DrainReport, LedgerSink, LogLine};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Sink for a drain whose session could not be opened
struct Unreachable(StoreError);

#[async_trait]
impl LedgerSink for Unreachable {
    type Error = String;

    async fn write_batch(&self, _collection: &str, _lines: &[LogLine]) -> Result<(), String> {
        Err(self.0.to_string())
    }
}

/// Handle to a background drain loop
pub struct DrainTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl DrainTask {
    /// Stop the loop and wait for an in-flight drain to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            tracing::warn!(error = %e, "drain task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<S: DocumentStore> LogClient<S> {
    /// Drain the ledger now, outside of any write
    ///
    /// An unreachable store counts as a failed attempt for every batch, so
    /// buffered lines are still abandoned when the database stays down.
    pub async fn drain_now(&self) -> DrainReport {
        if self.ledger.lock().await.is_empty() {
            return DrainReport::default();
        }

        match self.provisioner.acquire().await {
            Ok(session) => {
                let report = self.drain_on(&session).await;
                session.disconnect().await;
                report
            }
            Err(e) => {
                tracing::warn!(error = %e, "drain could not connect");
                self.ledger.lock().await.drain_all(&Unreachable(e)).await
            }
        }
    }

    /// Drain every `interval` until the returned task is shut down
    ///
    /// The first drain happens one interval after spawning. Dropping the
    /// returned task also stops the loop. A zero interval is rejected.
    pub fn spawn_periodic_drain(&self, interval: Duration) -> Result<DrainTask, ClientError> {
        if interval.is_zero() {
            let reason = "drain interval must be non-zero".to_string();
            return Err(ConfigError::Invalid(reason).into());
        }

        let client = self.clone();
        let (tx, mut rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval_ms = interval.as_millis() as u64, "periodic drain started");

            loop {
                tokio::select! {
                    _ = &mut rx => break,
                    _ = ticker.tick() => {
                        let report = client.drain_now().await;
                        if !report.outcomes.is_empty() {
                            tracing::debug!(
                                flushed = report.flushed().count(),
                                retained = report.retained().count(),
                                abandoned = report.abandoned().count(),
                                "periodic drain"
                            );
                        }
                    }
                }
            }

            tracing::info!("periodic drain stopped");
        });

        Ok(DrainTask {
            shutdown: Some(tx),
            handle,
        })
    }

    /// Start the periodic drain when `drain.interval` is configured
    pub fn spawn_configured_drain(&self) -> Result<Option<DrainTask>, ClientError> {
        self.config
            .drain
            .interval
            .map(|interval| self.spawn_periodic_drain(interval))
            .transpose()
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
