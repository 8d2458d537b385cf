//! Write recovery specs
//!
//! Lines whose insert failed reach the database once the store recovers.

use crate::prelude::*;

#[tokio::test]
async fn lines_arrive_after_two_failures() {
    let h = Harness::new();

    h.buffer("errors", &["A", "B"]).await;
    h.store.fail_connects(1);
    let report = h.client.drain_now().await;
    assert_eq!(report.retained().collect::<Vec<_>>(), vec!["errors"]);

    let report = h.client.drain_now().await;

    assert_eq!(report.flushed().collect::<Vec<_>>(), vec!["errors"]);
    assert!(h.client.pending().await.is_empty());
    assert_eq!(h.stored("errors"), vec!["A", "B"]);
}

#[tokio::test]
async fn next_successful_write_carries_the_backlog() {
    let h = Harness::new();
    h.buffer("errors", &["A", "B"]).await;
    h.buffer("audit", &["login"]).await;

    let receipt = h
        .client
        .insert_one("errors", LogLine::new("info", "C"))
        .await
        .unwrap();

    assert_eq!(
        receipt.drain.flushed().collect::<Vec<_>>(),
        vec!["audit", "errors"]
    );
    assert_eq!(h.stored("errors"), vec!["C", "A", "B"]);
    assert_eq!(h.stored("audit"), vec!["login"]);
}

#[tokio::test]
async fn failed_write_reports_buffered_size() {
    let h = Harness::new();
    h.buffer("errors", &["A"]).await;
    h.store.fail_connects(1);

    let err = h
        .client
        .insert_many("errors", lines(&["B", "C"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::WriteFailed { buffered: 3, .. }
    ));
}

#[tokio::test]
async fn traced_store_is_transparent() {
    let store = FakeStore::new();
    let client = LogClient::with_uri(
        TracedStore::new(store.clone()),
        ClientConfig::default(),
        "mongodb://specs",
    );
    store.fail_inserts(1);

    client
        .insert_many("errors", lines(&["A"]))
        .await
        .unwrap_err();
    client.insert_many("errors", lines(&["B"])).await.unwrap();

    assert_eq!(
        store.messages(&Namespace::new("logs", "errors")),
        vec!["B", "A"]
    );
}
