//! File-backed store specs
//!
//! Stored lines survive a restart; buffered lines do not.

use crate::prelude::*;
use lodge_storage::JsonlStore;

fn client(root: &std::path::Path) -> LogClient<JsonlStore> {
    LogClient::with_uri(JsonlStore::new(root), ClientConfig::default(), "file://specs")
}

#[tokio::test]
async fn lines_survive_a_new_client() {
    let dir = tempfile::tempdir().unwrap();

    client(dir.path())
        .insert_many("errors", lines(&["A", "B"]))
        .await
        .unwrap();

    let reopened = client(dir.path());
    let messages: Vec<_> = reopened
        .get_collection("errors")
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.message)
        .collect();
    assert_eq!(messages, vec!["A", "B"]);
    assert_eq!(
        reopened.list_collections().await.unwrap(),
        vec!["errors".to_string()]
    );
}

#[tokio::test]
async fn rejected_names_are_buffered_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let c = client(dir.path());

    let err = c
        .insert_many("../escape", lines(&["A"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::WriteFailed { buffered: 1, .. }));
    assert_eq!(c.pending().await.len(), 1);

    // The ledger lives in memory only
    assert!(client(dir.path()).pending().await.is_empty());
}
