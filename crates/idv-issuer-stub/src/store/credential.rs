//! Credential payload store.
//!
//! Holds the operator-confirmed attribute payloads, keyed by the payload
//! identifier submitted with the confirmation form. The payload is the
//! merge of the request object's shared claims and the operator-edited
//! JSON.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// Storage operations for credential payloads.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stores a payload under its identifier, replacing any previous value.
    async fn persist(&self, payload_id: String, attributes: Map<String, Value>);

    /// Looks a payload up by identifier.
    async fn lookup(&self, payload_id: &str) -> Option<Map<String, Value>>;
}

/// Process-lifetime credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    payloads: RwLock<HashMap<String, Map<String, Value>>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn persist(&self, payload_id: String, attributes: Map<String, Value>) {
        self.payloads.write().await.insert(payload_id, attributes);
    }

    async fn lookup(&self, payload_id: &str) -> Option<Map<String, Value>> {
        self.payloads.read().await.get(payload_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persists_and_returns_attributes() {
        let store = InMemoryCredentialStore::new();
        let mut attributes = Map::new();
        attributes.insert("test".to_string(), Value::String("test-value".to_string()));

        store.persist("resource-1".to_string(), attributes.clone()).await;

        assert_eq!(store.lookup("resource-1").await, Some(attributes));
        assert_eq!(store.lookup("resource-2").await, None);
    }

    #[tokio::test]
    async fn persist_replaces_existing_payload() {
        let store = InMemoryCredentialStore::new();
        let mut first = Map::new();
        first.insert("v".to_string(), Value::from(1));
        let mut second = Map::new();
        second.insert("v".to_string(), Value::from(2));

        store.persist("resource-1".to_string(), first).await;
        store.persist("resource-1".to_string(), second.clone()).await;

        assert_eq!(store.lookup("resource-1").await, Some(second));
    }
}
