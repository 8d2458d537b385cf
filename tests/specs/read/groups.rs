//! Grouped count specs
//!
//! Per-label counts agree with the flat count over the same period.

use crate::prelude::*;
use serde_json::json;

fn seed_postings(h: &Harness) {
    let ns = Namespace::new("logs", "jobEntries");
    let postings = [
        ("berlin", "2023-12-30"),
        ("berlin", "2024-01-05"),
        ("berlin", "2024-02-11"),
        ("lisbon", "2024-01-02"),
        ("oslo", "2023-11-01"),
        ("oslo", "2024-03-15"),
    ];
    for (hub, date) in postings {
        h.store.insert_bad_document(
            &ns,
            json_doc(json!({ "jobHub": hub, "Date of posting": date })),
        );
    }
}

#[tokio::test]
async fn group_counts_sum_to_period_total() {
    let h = Harness::new();
    seed_postings(&h);

    let groups = h
        .client
        .group_count_by_label("jobEntries", Some("2024-01-01"))
        .await
        .unwrap();

    similar_asserts::assert_eq!(
        groups,
        vec![
            GroupCount {
                name: Some("berlin".to_string()),
                count: 2
            },
            GroupCount {
                name: Some("lisbon".to_string()),
                count: 1
            },
            GroupCount {
                name: Some("oslo".to_string()),
                count: 1
            },
        ]
    );

    let total = h
        .client
        .count_in_period("jobEntries", "2024-01-01", None)
        .await
        .unwrap();
    assert_eq!(groups.iter().map(|g| g.count).sum::<u64>(), total);

    for group in &groups {
        let label = group.name.as_deref();
        let tally = h
            .client
            .count_in_period("jobEntries", "2024-01-01", label)
            .await
            .unwrap();
        assert_eq!(tally, group.count);
    }
}

#[tokio::test]
async fn recent_match_and_count_since_use_timestamps() {
    let h = Harness::new();
    let at = |minute| Utc.with_ymd_and_hms(2026, 5, 4, 8, minute, 0).unwrap();
    let lines = vec![
        LogLine::new("error", "Disk full").at(at(10)),
        LogLine::new("error", "disk slow").at(at(20)),
        LogLine::new("info", "started").at(at(30)),
    ];
    h.client.insert_many("errors", lines).await.unwrap();

    let recent = h
        .client
        .find_recent_matching("errors", "DISK")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recent.message, "disk slow");

    assert_eq!(
        h.client
            .count_since("errors", Some("disk"), at(10))
            .await
            .unwrap(),
        1
    );
    assert_eq!(h.client.count_since("errors", None, at(10)).await.unwrap(), 2);
}
