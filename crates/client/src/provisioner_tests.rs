// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use lodge_adapters::{FakeStore, MemorySession, MemoryStore, StoreCall};
use std::sync::atomic::{AtomicBool, Ordering};

/// Store whose connect never completes
#[derive(Clone, Default)]
struct StalledStore;

#[async_trait]
impl DocumentStore for StalledStore {
    type Session = MemorySession;

    async fn connect(&self, _uri: &str) -> Result<MemorySession, StoreError> {
        std::future::pending::<()>().await;
        MemoryStore::new().connect("unreachable").await
    }
}

#[tokio::test]
async fn acquire_passes_the_uri() {
    let store = FakeStore::new();
    let provisioner = Provisioner::new(store.clone(), "mongodb://db", Duration::from_secs(1));

    provisioner.acquire().await.unwrap();

    assert_eq!(
        store.calls(),
        vec![StoreCall::Connect {
            uri: "mongodb://db".to_string()
        }]
    );
}

#[tokio::test]
async fn acquire_times_out() {
    let provisioner = Provisioner::new(StalledStore, "mongodb://db", Duration::from_millis(20));

    let err = provisioner.acquire().await.err().unwrap();
    assert!(matches!(err, StoreError::Timeout(d) if d == Duration::from_millis(20)));
}

#[tokio::test]
async fn run_disconnects_after_success_and_failure() {
    let store = FakeStore::new();
    let provisioner = Provisioner::new(store.clone(), "mongodb://db", Duration::from_secs(1));

    let names = provisioner
        .run(|s| async move { s.list_collections("logs").await })
        .await
        .unwrap();
    assert!(names.is_empty());

    let err = provisioner
        .run(|_| async { Err::<(), _>(StoreError::Unavailable("boom".to_string())) })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    assert_eq!(
        store.count_calls(|c| matches!(c, StoreCall::Disconnect)),
        2
    );
}

#[tokio::test]
async fn run_skips_work_when_connect_fails() {
    let store = FakeStore::new();
    store.fail_connects(1);
    let provisioner = Provisioner::new(store.clone(), "mongodb://db", Duration::from_secs(1));

    let ran = AtomicBool::new(false);

    let err = provisioner
        .run(|_| {
            ran.store(true, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ConnectFailed(_)));
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(store.calls().len(), 1);
}
