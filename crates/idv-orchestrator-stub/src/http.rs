//! Axum handlers and router for the orchestrator stub.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use serde_json::{Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use idv_protocol::authorize::{AuthorizationResponse, CallbackParams};

use crate::client::IssuerClient;
use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::state::{InMemoryStateStore, StateStore};
use crate::views;

/// Shared state for the orchestrator endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Stub configuration.
    pub config: Arc<OrchestratorConfig>,
    /// Outstanding state values.
    pub states: Arc<dyn StateStore>,
    /// Back-channel client for the issuer.
    pub client: IssuerClient,
}

impl AppState {
    /// Creates state with a fresh in-memory state store.
    #[must_use]
    pub fn new(config: OrchestratorConfig) -> Self {
        let config = Arc::new(config);
        Self {
            client: IssuerClient::new(config.clone()),
            states: Arc::new(InMemoryStateStore::new()),
            config,
        }
    }
}

/// Builds the orchestrator router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/authorize", get(authorize_handler))
        .route("/callback", get(callback_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /authorize` - kick off the flow by redirecting to the issuer.
async fn authorize_handler(State(state): State<AppState>) -> Response {
    let oauth_state = Uuid::new_v4().to_string();
    state.states.record(oauth_state.clone()).await;

    let mut url = match url::Url::parse(&state.config.issuer_authorize_url) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Issuer authorization URL is unparseable");
            return flow_failure(&OrchestratorError::configuration(format!(
                "issuer authorization URL is unparseable: {e}"
            )));
        }
    };
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &state.config.client_id)
        .append_pair("scope", &state.config.scope)
        .append_pair("redirect_uri", &state.config.redirect_url)
        .append_pair("state", &oauth_state);

    info!(state = %oauth_state, "Redirecting to issuer authorization endpoint");
    (
        StatusCode::FOUND,
        [(header::LOCATION, url.to_string())],
    )
        .into_response()
}

/// `GET /callback` - complete the flow: verify state, exchange the code,
/// fetch and render the identity.
async fn callback_handler(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_flow(&state, params).await {
        Ok(attributes) => Html(views::render_identity(&attributes)).into_response(),
        Err(e) => {
            error!(error = %e, "Identity verification flow failed");
            flow_failure(&e)
        }
    }
}

async fn complete_flow(
    state: &AppState,
    params: CallbackParams,
) -> OrchestratorResult<Map<String, Value>> {
    let response = AuthorizationResponse::from_params(params)?;

    // State is verified before anything leaves this process.
    let returned_state = response.state().unwrap_or_default().to_string();
    if !state.states.take(&returned_state).await {
        return Err(OrchestratorError::StateMismatch);
    }

    let code = match response {
        AuthorizationResponse::Success { code, .. } => code,
        AuthorizationResponse::Error {
            error,
            error_description,
            ..
        } => {
            return Err(OrchestratorError::AuthorizationDenied {
                error,
                description: error_description,
            });
        }
    };

    let token = state.client.exchange_code(&code).await?;
    info!("Token obtained, fetching credential");
    state.client.fetch_credential(&token.access_token).await
}

fn flow_failure(error: &OrchestratorError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::render_error(&error.to_string())),
    )
        .into_response()
}

async fn healthz() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({"status": "ok"}))
}
