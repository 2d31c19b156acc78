//! Access token store.
//!
//! Maps bearer tokens minted by the token endpoint to the payload
//! identifier captured from the redeemed code. Tokens have no expiry
//! beyond process lifetime.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Storage operations for bearer access tokens.
#[async_trait]
pub trait AccessTokenStore: Send + Sync {
    /// Associates a token with a payload identifier.
    async fn persist(&self, token: String, payload_id: String);

    /// Resolves a token to its payload identifier.
    async fn lookup(&self, token: &str) -> Option<String>;
}

/// Process-lifetime token store.
#[derive(Debug, Default)]
pub struct InMemoryAccessTokenStore {
    tokens: RwLock<HashMap<String, String>>,
}

impl InMemoryAccessTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenStore for InMemoryAccessTokenStore {
    async fn persist(&self, token: String, payload_id: String) {
        self.tokens.write().await.insert(token, payload_id);
    }

    async fn lookup(&self, token: &str) -> Option<String> {
        self.tokens.read().await.get(token).cloned()
    }
}
