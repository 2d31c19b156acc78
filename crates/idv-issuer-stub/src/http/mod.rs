//! Axum handlers and router for the issuer stub.
//!
//! Endpoints:
//!
//! - `GET /authorize` - validate the authorization request, render the
//!   operator confirmation page
//! - `GET /generate-response` - Finalize: mint the authorization code
//! - `POST /token` - redeem a code for a bearer token
//! - `GET /credential` - return the payload bound to a bearer token
//! - `GET /healthz` - liveness probe

pub mod authorize;
pub mod credential;
pub mod token;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::config::IssuerConfig;
use crate::jar::RequestObjectCodec;
use crate::store::{
    AccessTokenStore, AuthCodeStore, CredentialStore, ErrorInjectionStore,
    InMemoryAccessTokenStore, InMemoryAuthCodeStore, InMemoryCredentialStore,
    InMemoryErrorInjectionStore,
};

/// Shared state for all issuer endpoints.
///
/// Stores are injected as trait objects; every endpoint mutates only the
/// stores it owns per the component design.
#[derive(Clone)]
pub struct AppState {
    /// Stub configuration, including the client registry.
    pub config: Arc<IssuerConfig>,
    /// Request-object decoder.
    pub codec: RequestObjectCodec,
    /// Issued authorization codes.
    pub auth_codes: Arc<dyn AuthCodeStore>,
    /// Operator-confirmed credential payloads.
    pub credentials: Arc<dyn CredentialStore>,
    /// Minted bearer tokens.
    pub access_tokens: Arc<dyn AccessTokenStore>,
    /// Token-targeted error-injection records.
    pub injections: Arc<dyn ErrorInjectionStore>,
}

impl AppState {
    /// Creates state with fresh in-memory stores.
    #[must_use]
    pub fn new(config: IssuerConfig) -> Self {
        let codec = RequestObjectCodec::new(config.trust_unverified_request_objects);
        Self {
            config: Arc::new(config),
            codec,
            auth_codes: Arc::new(InMemoryAuthCodeStore::new()),
            credentials: Arc::new(InMemoryCredentialStore::new()),
            access_tokens: Arc::new(InMemoryAccessTokenStore::new()),
            injections: Arc::new(InMemoryErrorInjectionStore::new()),
        }
    }
}

/// Builds the issuer router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/authorize", get(authorize::authorize_handler))
        .route(
            "/generate-response",
            get(authorize::generate_response_handler),
        )
        .route("/token", post(token::token_handler))
        .route("/credential", get(credential::credential_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({"status": "ok"}))
}
