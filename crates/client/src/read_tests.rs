// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use lodge_adapters::{FakeStore, StoreCall};
use lodge_core::{Attempts, ClientConfig};
use serde_json::json;

fn setup() -> (FakeStore, LogClient<FakeStore>) {
    let store = FakeStore::new();
    let client = LogClient::with_uri(store.clone(), ClientConfig::default(), "mongodb://test");
    (store, client)
}

fn ns(collection: &str) -> Namespace {
    Namespace::new("logs", collection)
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
}

fn doc(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

async fn seed(client: &LogClient<FakeStore>, collection: &str, lines: &[(u32, &str)]) {
    let lines = lines
        .iter()
        .map(|(minute, message)| LogLine::new("error", *message).at(at(*minute)))
        .collect();
    client.insert_many(collection, lines).await.unwrap();
}

fn seed_postings(store: &FakeStore) {
    let postings = [
        json!({ "jobHub": "berlin", "Date of posting": "2026-01-10" }),
        json!({ "jobHub": "berlin", "Date of posting": "2026-02-10" }),
        json!({ "jobHub": "lisbon", "Date of posting": "2026-02-12" }),
        json!({ "jobHub": "lisbon", "Date of posting": "2025-12-01" }),
        json!({ "Date of posting": "2026-02-20" }),
    ];
    for posting in postings {
        store.insert_bad_document(&ns("jobs"), doc(posting));
    }
}

fn connects(store: &FakeStore) -> usize {
    store.count_calls(|c| matches!(c, StoreCall::Connect { .. }))
}

#[tokio::test]
async fn get_collection_decodes_every_line() {
    let (_, client) = setup();
    seed(&client, "errors", &[(1, "a"), (2, "b")]).await;

    let lines = client.get_collection("errors").await.unwrap();

    let messages: Vec<_> = lines.iter().map(|l| l.message.as_str()).collect();
    assert_eq!(messages, vec!["a", "b"]);
    assert_eq!(lines[0].timestamp, at(1));
}

#[tokio::test]
async fn transient_read_failures_are_retried() {
    let (store, client) = setup();
    seed(&client, "errors", &[(1, "a")]).await;
    store.clear_calls();
    store.fail_reads(2);

    let lines = client.get_collection("errors").await.unwrap();

    assert_eq!(lines.len(), 1);
    assert_eq!(connects(&store), 3);
    assert_eq!(store.count_calls(|c| matches!(c, StoreCall::Disconnect)), 3);
}

#[tokio::test]
async fn reads_give_up_after_configured_attempts() {
    let (store, client) = setup();
    store.fail_reads(10);

    let err = client.count_by_label("jobs", None).await.unwrap_err();

    assert!(matches!(err, ClientError::Store(StoreError::Unavailable(_))));
    assert_eq!(
        store.count_calls(|c| matches!(c, StoreCall::CountDocuments { .. })),
        3
    );
}

#[tokio::test]
async fn read_policy_can_be_replaced() {
    let (store, client) = setup();
    let client = client.with_read_policy(Attempts(1));
    store.fail_reads(1);

    assert!(client.get_collection("errors").await.is_err());
    assert_eq!(connects(&store), 1);
}

#[tokio::test]
async fn malformed_documents_fail_without_retry() {
    let (store, client) = setup();
    store.insert_bad_document(&ns("errors"), doc(json!({ "Message": 5 })));

    let err = client.get_collection("errors").await.unwrap_err();

    match err {
        ClientError::Decode { namespace, .. } => assert_eq!(namespace, "logs.errors"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.count_calls(|c| matches!(c, StoreCall::Find { .. })), 1);
}

#[tokio::test]
async fn find_recent_matching_returns_latest_match() {
    let (_, client) = setup();
    seed(
        &client,
        "errors",
        &[(5, "disk slow"), (9, "DISK full"), (7, "net down"), (1, "disk ok")],
    )
    .await;

    let line = client
        .find_recent_matching("errors", "disk")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.message, "DISK full");
    assert_eq!(line.timestamp, at(9));

    assert!(client
        .find_recent_matching("errors", "printer")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn count_since_is_strictly_after() {
    let (_, client) = setup();
    seed(
        &client,
        "errors",
        &[(1, "disk slow"), (2, "disk full"), (3, "net down"), (4, "Disk gone")],
    )
    .await;

    assert_eq!(client.count_since("errors", None, at(2)).await.unwrap(), 2);
    assert_eq!(
        client
            .count_since("errors", Some("disk"), at(2))
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        client
            .count_since("errors", Some("disk"), at(0))
            .await
            .unwrap(),
        3
    );
}

#[tokio::test]
async fn group_counts_by_label() {
    let (store, client) = setup();
    seed_postings(&store);

    let groups = client.group_count_by_label("jobs", None).await.unwrap();
    assert_eq!(
        groups,
        vec![
            GroupCount {
                name: Some("berlin".to_string()),
                count: 2
            },
            GroupCount {
                name: Some("lisbon".to_string()),
                count: 2
            },
            GroupCount {
                name: None,
                count: 1
            },
        ]
    );
}

#[tokio::test]
async fn grouped_counts_sum_to_period_count() {
    let (store, client) = setup();
    seed_postings(&store);

    let groups = client
        .group_count_by_label("jobs", Some("2026-01-31"))
        .await
        .unwrap();
    let total: u64 = groups.iter().map(|g| g.count).sum();

    assert_eq!(total, 3);
    assert_eq!(
        client
            .count_in_period("jobs", "2026-01-31", None)
            .await
            .unwrap(),
        total
    );
    assert_eq!(
        client
            .count_in_period("jobs", "2026-01-31", Some("lisbon"))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn count_by_label_filters_on_label_field() {
    let (store, client) = setup();
    seed_postings(&store);

    assert_eq!(client.count_by_label("jobs", Some("berlin")).await.unwrap(), 2);
    assert_eq!(client.count_by_label("jobs", Some("oslo")).await.unwrap(), 0);
    assert_eq!(client.count_by_label("jobs", None).await.unwrap(), 5);
}

#[tokio::test]
async fn list_collections_is_not_retried() {
    let (store, client) = setup();
    seed(&client, "errors", &[(1, "a")]).await;
    seed(&client, "audit", &[(1, "b")]).await;
    store.clear_calls();

    assert_eq!(
        client.list_collections().await.unwrap(),
        vec!["audit".to_string(), "errors".to_string()]
    );

    store.fail_connects(1);
    assert!(client.list_collections().await.is_err());
    assert_eq!(connects(&store), 2);
}

#[yare::parameterized(
    berlin = { Some("berlin"), 1 },
    lisbon = { Some("lisbon"), 1 },
    absent = { Some("oslo"), 0 },
    everything = { None, 3 },
)]
#[test_macro(tokio::test)]
async fn period_counts_by_label(label: Option<&str>, expected: u64) {
    let (store, client) = setup();
    seed_postings(&store);

    let count = client
        .count_in_period("jobs", "2026-01-31", label)
        .await
        .unwrap();
    assert_eq!(count, expected);
}
