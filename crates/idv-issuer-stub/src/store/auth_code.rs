//! Authorization code store.
//!
//! Codes are minted at Finalize and redeemed by the token endpoint.
//! Redemption is single-use: the token endpoint consumes the code with an
//! atomic [`AuthCodeStore::take`], so of two concurrent exchanges on the
//! same code exactly one can succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Data bound to an issued authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    /// Identifier of the payload the code grants access to.
    pub payload_id: String,

    /// Redirect URI the code was issued against; the token endpoint must be
    /// presented with the same value.
    pub redirect_uri: Option<String>,
}

/// Storage operations for authorization codes.
#[async_trait]
pub trait AuthCodeStore: Send + Sync {
    /// Stores an issued code.
    async fn persist(&self, code: String, issued: IssuedCode);

    /// Looks a code up without consuming it.
    async fn lookup(&self, code: &str) -> Option<IssuedCode>;

    /// Atomically removes and returns a code.
    ///
    /// Returns `None` when the code was never issued or has already been
    /// redeemed.
    async fn take(&self, code: &str) -> Option<IssuedCode>;
}

/// Process-lifetime code store.
#[derive(Debug, Default)]
pub struct InMemoryAuthCodeStore {
    codes: RwLock<HashMap<String, IssuedCode>>,
}

impl InMemoryAuthCodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthCodeStore for InMemoryAuthCodeStore {
    async fn persist(&self, code: String, issued: IssuedCode) {
        self.codes.write().await.insert(code, issued);
    }

    async fn lookup(&self, code: &str) -> Option<IssuedCode> {
        self.codes.read().await.get(code).cloned()
    }

    async fn take(&self, code: &str) -> Option<IssuedCode> {
        self.codes.write().await.remove(code)
    }
}
