//! Error-injection registry.
//!
//! A test scenario can pre-register a forced protocol error by adding
//! `requested_oauth_error`, `requested_oauth_error_endpoint` and
//! `requested_oauth_error_description` parameters to the authorization
//! request. The forced error fires at exactly one endpoint:
//!
//! - endpoint "auth": evaluated directly from the incoming request
//!   parameters by the authorization endpoint, before any code exists;
//! - endpoint "token": persisted keyed by the minted code at Finalize and
//!   consumed when the token endpoint consults it;
//! - endpoint "none" (or error "none"): injection disabled.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

/// Sentinel error value that disables injection.
const NONE: &str = "none";

/// Endpoint a forced error targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InjectionEndpoint {
    /// The authorization endpoint.
    Auth,
    /// The token endpoint.
    Token,
    /// No endpoint; injection disabled.
    #[default]
    None,
}

impl FromStr for InjectionEndpoint {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(Self::Auth),
            "token" => Ok(Self::Token),
            _ => Ok(Self::None),
        }
    }
}

/// Error-injection parameters as they arrive on an authorization request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InjectionRequest {
    /// Forced error code, or "none".
    #[serde(default)]
    pub requested_oauth_error: Option<String>,

    /// Target endpoint: "auth", "token" or "none".
    #[serde(default)]
    pub requested_oauth_error_endpoint: Option<String>,

    /// Forced error description.
    #[serde(default)]
    pub requested_oauth_error_description: Option<String>,
}

impl InjectionRequest {
    /// Returns the forced error when this request targets the given
    /// endpoint with a real error.
    ///
    /// "none" - as either error code or endpoint - never fires, and a
    /// record targeting one endpoint never fires at the other.
    #[must_use]
    pub fn forced_for(&self, endpoint: InjectionEndpoint) -> Option<ForcedError> {
        let target: InjectionEndpoint = self
            .requested_oauth_error_endpoint
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        if target != endpoint || endpoint == InjectionEndpoint::None {
            return None;
        }
        match self.requested_oauth_error.as_deref() {
            Some(error) if error != NONE && !error.is_empty() => Some(ForcedError {
                error: error.to_string(),
                description: self.requested_oauth_error_description.clone(),
            }),
            _ => None,
        }
    }
}

/// A forced protocol error, echoed verbatim at its target endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedError {
    /// Error code to return.
    pub error: String,
    /// Error description to return.
    pub description: Option<String>,
}

/// Storage operations for token-targeted injection records.
#[async_trait]
pub trait ErrorInjectionStore: Send + Sync {
    /// Persists the injection parameters keyed by an issued code.
    async fn persist(&self, code: String, request: InjectionRequest);

    /// Consumes the record for a code and returns the forced error if the
    /// record targets the token endpoint.
    ///
    /// The record is consulted once: it is removed whether or not it fires.
    async fn take_for_token(&self, code: &str) -> Option<ForcedError>;
}

/// Process-lifetime injection registry.
#[derive(Debug, Default)]
pub struct InMemoryErrorInjectionStore {
    records: RwLock<HashMap<String, InjectionRequest>>,
}

impl InMemoryErrorInjectionStore {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ErrorInjectionStore for InMemoryErrorInjectionStore {
    async fn persist(&self, code: String, request: InjectionRequest) {
        self.records.write().await.insert(code, request);
    }

    async fn take_for_token(&self, code: &str) -> Option<ForcedError> {
        let record = self.records.write().await.remove(code)?;
        record.forced_for(InjectionEndpoint::Token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(error: &str, endpoint: &str) -> InjectionRequest {
        InjectionRequest {
            requested_oauth_error: Some(error.to_string()),
            requested_oauth_error_endpoint: Some(endpoint.to_string()),
            requested_oauth_error_description: Some("forced".to_string()),
        }
    }

    #[test]
    fn fires_only_at_its_target_endpoint() {
        let auth = request("access_denied", "auth");
        assert!(auth.forced_for(InjectionEndpoint::Auth).is_some());
        assert!(auth.forced_for(InjectionEndpoint::Token).is_none());

        let token = request("invalid_grant", "token");
        assert!(token.forced_for(InjectionEndpoint::Token).is_some());
        assert!(token.forced_for(InjectionEndpoint::Auth).is_none());
    }

    #[test]
    fn none_never_fires() {
        assert!(request("none", "auth").forced_for(InjectionEndpoint::Auth).is_none());
        assert!(request("none", "token").forced_for(InjectionEndpoint::Token).is_none());
        assert!(
            request("access_denied", "none")
                .forced_for(InjectionEndpoint::Auth)
                .is_none()
        );
        assert!(InjectionRequest::default().forced_for(InjectionEndpoint::Auth).is_none());
    }

    #[test]
    fn forced_error_carries_description() {
        let forced = request("access_denied", "auth")
            .forced_for(InjectionEndpoint::Auth)
            .unwrap();
        assert_eq!(forced.error, "access_denied");
        assert_eq!(forced.description.as_deref(), Some("forced"));
    }

    #[tokio::test]
    async fn token_record_is_consumed_on_consultation() {
        let store = InMemoryErrorInjectionStore::new();
        store
            .persist("code-1".to_string(), request("invalid_grant", "token"))
            .await;

        assert!(store.take_for_token("code-1").await.is_some());
        assert!(store.take_for_token("code-1").await.is_none());
    }

    #[tokio::test]
    async fn auth_targeted_record_never_fires_at_token() {
        let store = InMemoryErrorInjectionStore::new();
        store
            .persist("code-1".to_string(), request("access_denied", "auth"))
            .await;

        assert!(store.take_for_token("code-1").await.is_none());
    }
}
