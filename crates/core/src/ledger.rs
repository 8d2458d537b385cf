// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-write ledger
//!
//! Holds log lines whose durable insert failed, keyed by destination
//! collection. At most one [`Insertion`] exists per collection. Each batch
//! carries an attempt counter that rises by one per failed drain and falls
//! by the number of lines merged into it; a batch is abandoned when the
//! counter reaches the abandonment threshold.
//!
//! The ledger is volatile: nothing here survives a process restart.

use crate::line::LogLine;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// Failed drain attempts after which a batch is dropped
pub const DEFAULT_ABANDON_AFTER: u16 = 10;

/// Buffered lines for one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub collection: String,
    /// Lines awaiting durable storage, in arrival order
    pub lines: Vec<LogLine>,
    pub attempts: u16,
}

/// Durable-write target for a drain
#[async_trait]
pub trait LedgerSink: Send + Sync {
    type Error: fmt::Display + Send;

    /// Write a whole batch; partial success counts as failure
    async fn write_batch(&self, collection: &str, lines: &[LogLine]) -> Result<(), Self::Error>;
}

/// What happened to one batch during a drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Written and removed from the ledger
    Flushed { collection: String, lines: usize },
    /// Write failed; batch kept with its new attempt count
    Retained {
        collection: String,
        attempts: u16,
        error: String,
    },
    /// Write failed and the threshold was reached; lines dropped
    Abandoned {
        collection: String,
        lines: usize,
        error: String,
    },
}

impl DrainOutcome {
    pub fn collection(&self) -> &str {
        match self {
            DrainOutcome::Flushed { collection, .. }
            | DrainOutcome::Retained { collection, .. }
            | DrainOutcome::Abandoned { collection, .. } => collection,
        }
    }
}

/// Result of one drain cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub outcomes: Vec<DrainOutcome>,
}

impl DrainReport {
    /// Collections written during this drain
    pub fn flushed(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            DrainOutcome::Flushed { collection, .. } => Some(collection.as_str()),
            _ => None,
        })
    }

    /// Collections still buffered after a failed attempt
    pub fn retained(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            DrainOutcome::Retained { collection, .. } => Some(collection.as_str()),
            _ => None,
        })
    }

    /// Collections whose lines were dropped
    pub fn abandoned(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            DrainOutcome::Abandoned { collection, .. } => Some(collection.as_str()),
            _ => None,
        })
    }

    /// True when no batch failed
    pub fn is_clean(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, DrainOutcome::Flushed { .. }))
    }
}

/// In-memory map of collection to buffered batch
#[derive(Debug, Clone)]
pub struct Ledger {
    batches: BTreeMap<String, Insertion>,
    abandon_after: u16,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_ABANDON_AFTER)
    }
}

impl Ledger {
    /// Create an empty ledger; a threshold of 0 is treated as 1
    pub fn new(abandon_after: u16) -> Self {
        Self {
            batches: BTreeMap::new(),
            abandon_after: abandon_after.max(1),
        }
    }

    pub fn abandon_after(&self) -> u16 {
        self.abandon_after
    }

    /// Append lines to the collection's batch, creating it if absent
    ///
    /// An existing batch earns back one attempt per merged line, floored at
    /// zero. Returns the batch length after the merge. Merging nothing into
    /// an absent collection creates no batch.
    pub fn merge(&mut self, collection: &str, lines: Vec<LogLine>) -> usize {
        let count = lines.len();
        tracing::trace!(collection, lines = count, "merging into ledger");

        if let Some(existing) = self.batches.get_mut(collection) {
            existing.lines.extend(lines);
            let credit = u16::try_from(count).unwrap_or(u16::MAX);
            existing.attempts = existing.attempts.saturating_sub(credit);
            return existing.lines.len();
        }

        if count == 0 {
            return 0;
        }

        self.batches.insert(
            collection.to_string(),
            Insertion {
                collection: collection.to_string(),
                lines,
                attempts: 0,
            },
        );
        count
    }

    /// Try to write every batch through `sink`
    ///
    /// Flushed batches are removed. A failed batch gains one attempt and is
    /// removed once its attempts reach the threshold.
    pub async fn drain_all<S: LedgerSink + ?Sized>(&mut self, sink: &S) -> DrainReport {
        let mut report = DrainReport::default();
        let collections: Vec<String> = self.batches.keys().cloned().collect();

        for collection in collections {
            let Some(batch) = self.batches.get_mut(&collection) else {
                continue;
            };

            match sink.write_batch(&collection, &batch.lines).await {
                Ok(()) => {
                    let lines = batch.lines.len();
                    self.batches.remove(&collection);
                    tracing::info!(collection, lines, "flushed buffered lines");
                    report
                        .outcomes
                        .push(DrainOutcome::Flushed { collection, lines });
                }
                Err(e) => {
                    batch.attempts = batch.attempts.saturating_add(1);
                    let error = e.to_string();
                    if batch.attempts >= self.abandon_after {
                        let lines = batch.lines.len();
                        self.batches.remove(&collection);
                        tracing::error!(
                            collection,
                            lines,
                            error = %error,
                            "abandoning buffered lines"
                        );
                        report.outcomes.push(DrainOutcome::Abandoned {
                            collection,
                            lines,
                            error,
                        });
                    } else {
                        let attempts = batch.attempts;
                        tracing::warn!(collection, attempts, error = %error, "drain failed");
                        report.outcomes.push(DrainOutcome::Retained {
                            collection,
                            attempts,
                            error,
                        });
                    }
                }
            }
        }

        report
    }

    pub fn get(&self, collection: &str) -> Option<&Insertion> {
        self.batches.get(collection)
    }

    /// Snapshot of all batches, ordered by collection name
    pub fn pending(&self) -> Vec<Insertion> {
        self.batches.values().cloned().collect()
    }

    /// Number of batches
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Lines buffered across all batches
    pub fn total_lines(&self) -> usize {
        self.batches.values().map(|b| b.lines.len()).sum()
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
