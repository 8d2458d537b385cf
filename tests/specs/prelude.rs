//! Shared fixtures for behavioral specs

pub use chrono::{TimeZone, Utc};
pub use lodge_adapters::{FakeStore, TracedStore};
pub use lodge_client::{ClientError, LogClient};
pub use lodge_core::{ClientConfig, DrainOutcome, GroupCount, LogLine, Namespace};

/// A client over a fresh [`FakeStore`] with default configuration
pub struct Harness {
    pub store: FakeStore,
    pub client: LogClient<FakeStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let store = FakeStore::new();
        let client = LogClient::with_uri(store.clone(), config, "mongodb://specs");
        Self { store, client }
    }

    /// Messages stored in a collection of the default database
    pub fn stored(&self, collection: &str) -> Vec<String> {
        self.store.messages(&Namespace::new("logs", collection))
    }

    /// Put lines for `collection` into the ledger by failing one insert
    pub async fn buffer(&self, collection: &str, messages: &[&str]) {
        self.store.fail_connects(1);
        self.client
            .insert_many(collection, lines(messages))
            .await
            .unwrap_err();
    }
}

pub fn lines(messages: &[&str]) -> Vec<LogLine> {
    messages.iter().map(|m| LogLine::new("error", *m)).collect()
}

pub fn json_doc(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}
