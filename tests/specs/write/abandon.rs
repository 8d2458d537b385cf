//! Abandonment specs
//!
//! A batch that keeps failing is dropped after ten attempts.

use crate::prelude::*;

#[tokio::test]
async fn batch_is_dropped_on_tenth_failure() {
    let h = Harness::new();
    h.buffer("audit", &["X"]).await;
    h.store.fail_collection("audit");

    let mut outcomes = Vec::new();
    for _ in 0..11 {
        let receipt = h
            .client
            .insert_one("errors", LogLine::new("info", "tick"))
            .await
            .unwrap();
        outcomes.extend(receipt.drain.outcomes);
    }

    assert_eq!(outcomes.len(), 10);
    assert!(outcomes[..9]
        .iter()
        .all(|o| matches!(o, DrainOutcome::Retained { .. })));
    assert!(matches!(
        &outcomes[9],
        DrainOutcome::Abandoned { collection, lines: 1, .. } if collection == "audit"
    ));

    h.store.heal_collection("audit");
    h.client.drain_now().await;
    assert!(h.stored("audit").is_empty());
    assert!(h.client.pending().await.is_empty());
}

#[tokio::test]
async fn threshold_comes_from_config() {
    let config = ClientConfig::from_toml_str("[drain]\nabandon_after = 3\n").unwrap();
    let h = Harness::with_config(config);
    h.buffer("audit", &["X"]).await;
    h.store.fail_collection("audit");

    for _ in 0..2 {
        h.client.drain_now().await;
    }
    assert_eq!(h.client.pending().await[0].attempts, 2);

    let report = h.client.drain_now().await;
    assert_eq!(report.abandoned().collect::<Vec<_>>(), vec!["audit"]);
}
