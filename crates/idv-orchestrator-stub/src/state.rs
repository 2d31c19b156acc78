//! Outstanding-state store.
//!
//! Each `/authorize` redirect mints a fresh state value; the callback must
//! present it back. Verification consumes the value, so a state can only
//! ever complete one callback.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Storage operations for outstanding state values.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Records a freshly minted state value.
    async fn record(&self, state: String);

    /// Consumes a state value, returning true when it was outstanding.
    async fn take(&self, state: &str) -> bool;
}

/// Process-lifetime state store.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashSet<String>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn record(&self, state: String) {
        self.states.write().await.insert(state);
    }

    async fn take(&self, state: &str) -> bool {
        self.states.write().await.remove(state)
    }
}
