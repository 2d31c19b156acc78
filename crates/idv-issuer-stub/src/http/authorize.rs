//! Authorization endpoint and Finalize handlers.
//!
//! `GET /authorize` walks RECEIVED -> VALIDATED -> {RENDERED |
//! REDIRECT_ERROR}: it validates the request (first failure wins), applies
//! auth-targeted error injection as an explicit pre-render decision step,
//! and renders the operator confirmation page. No code is minted here.
//!
//! `GET /generate-response` is the Finalize step: once the operator
//! confirms or edits the payload, it merges the request object's shared
//! claims with the operator JSON, mints a single-use code and redirects
//! back to the relying party.

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use idv_protocol::authorize::{
    AuthorizationErrorCode, AuthorizationErrorRedirect, AuthorizationSuccessRedirect,
};

use crate::http::AppState;
use crate::jar::RequestObjectClaims;
use crate::store::{InjectionEndpoint, InjectionRequest, IssuedCode};
use crate::views::{ConfirmationView, render_confirmation};

/// Inline text shown in place of the shared claims when the request object
/// cannot be decoded.
pub const DECODE_ERROR_TEXT: &str = "Error: Signature of the shared attribute JWT is not valid";

/// Plain-text body returned when no trusted redirect target exists.
pub const UNTRUSTED_REDIRECT_TEXT: &str =
    "redirect_uri param provided does not match any of the redirect_uri values configured";

/// Description used on the `invalid_json` Finalize redirect.
pub const INVALID_JSON_DESCRIPTION: &str = "Unable to generate valid JSON Payload";

/// Query parameters for /authorize and /generate-response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeParams {
    /// Client identifier.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Signed (optionally encrypted) request object.
    #[serde(default)]
    pub request: Option<String>,

    /// Top-level response type; overridden by the request object.
    #[serde(default)]
    pub response_type: Option<String>,

    /// Top-level redirect URI; overridden by the request object.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Requested scope.
    #[serde(default)]
    pub scope: Option<String>,

    /// Top-level state; overridden by the request object.
    #[serde(default)]
    pub state: Option<String>,

    /// Error-injection parameters.
    #[serde(flatten)]
    pub injection: InjectionRequest,

    /// Operator-edited JSON payload (Finalize only).
    #[serde(default)]
    pub json_payload: Option<String>,

    /// Payload identifier (Finalize only).
    #[serde(default, rename = "resourceId")]
    pub resource_id: Option<String>,
}

/// The request parameters after applying the request-object override rule:
/// claims found in the request object win over same-named top-level
/// parameters.
#[derive(Debug)]
struct EffectiveRequest {
    claims: Option<RequestObjectClaims>,
    decode_failed: bool,
    redirect_uri: Option<String>,
    response_type: Option<String>,
    state: Option<String>,
}

impl EffectiveRequest {
    fn resolve(state: &AppState, params: &AuthorizeParams) -> Self {
        let mut decode_failed = false;
        let claims = match (&params.request, &params.client_id) {
            (Some(request), Some(client_id)) => {
                match state.config.clients.get(client_id) {
                    Some(client) => match state.codec.decode(request, client) {
                        Ok(claims) => Some(claims),
                        Err(e) => {
                            warn!(client_id = %client_id, error = %e, "Request object decode failed");
                            decode_failed = true;
                            None
                        }
                    },
                    // Unknown client: no key material to decode with.
                    None => None,
                }
            }
            (Some(_), None) => {
                decode_failed = true;
                None
            }
            (None, _) => None,
        };

        let pick = |name: &str, top: &Option<String>| -> Option<String> {
            claims
                .as_ref()
                .and_then(|c| c.get_str(name))
                .map(str::to_string)
                .or_else(|| top.clone())
        };

        Self {
            redirect_uri: pick("redirect_uri", &params.redirect_uri),
            response_type: pick("response_type", &params.response_type),
            state: pick("state", &params.state),
            claims,
            decode_failed,
        }
    }
}

/// `GET /authorize` handler.
pub async fn authorize_handler(
    State(state): State<AppState>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    debug!(client_id = ?params.client_id, "Processing authorization request");

    let effective = EffectiveRequest::resolve(&state, &params);

    // 1. No redirect target can be trusted until it is validated.
    let Some(redirect_uri) = trusted_redirect_uri(&state, &params, &effective) else {
        return untrusted_redirect_response();
    };

    // 2. Only the authorization-code response type is supported.
    if effective.response_type.as_deref() != Some("code") {
        warn!(response_type = ?effective.response_type, "Unsupported response type");
        return error_redirect(
            &redirect_uri,
            AuthorizationErrorRedirect::from_code(
                AuthorizationErrorCode::UnsupportedResponseType,
                "Unsupported response type",
                effective.state.clone(),
            )
            .with_issuer(state.config.name.clone()),
        );
    }

    // 3. The client must be known.
    let client_id = match params.client_id.as_deref() {
        Some(id) if state.config.clients.contains(id) => id.to_string(),
        _ => {
            warn!(client_id = ?params.client_id, "Unknown or missing client");
            return error_redirect(
                &redirect_uri,
                AuthorizationErrorRedirect::from_code(
                    AuthorizationErrorCode::InvalidClient,
                    "Client authentication failed",
                    effective.state.clone(),
                )
                .with_issuer(state.config.name.clone()),
            );
        }
    };

    // Explicit injection decision step: a forced auth-endpoint error
    // bypasses rendering entirely.
    if let Some(forced) = params.injection.forced_for(InjectionEndpoint::Auth) {
        info!(client_id = %client_id, error = %forced.error, "Returning injected authorization error");
        return error_redirect(
            &redirect_uri,
            AuthorizationErrorRedirect::verbatim(
                forced.error,
                forced.description,
                effective.state.clone(),
            )
            .with_issuer(state.config.name.clone()),
        );
    }

    // 4. Decode failure degrades to inline display; the page still renders.
    let shared_claims = if effective.decode_failed {
        DECODE_ERROR_TEXT.to_string()
    } else {
        let shared = effective
            .claims
            .as_ref()
            .and_then(RequestObjectClaims::shared_claims)
            .cloned()
            .unwrap_or_default();
        serde_json::to_string_pretty(&Value::Object(shared))
            .unwrap_or_else(|_| DECODE_ERROR_TEXT.to_string())
    };

    let view = ConfirmationView {
        issuer_name: state.config.name.clone(),
        client_id,
        request: params.request.clone(),
        state: effective.state.clone(),
        redirect_uri: Some(redirect_uri),
        shared_claims,
        suggested_payload_id: Uuid::new_v4().to_string(),
        requested_oauth_error: params.injection.requested_oauth_error.clone(),
        requested_oauth_error_endpoint: params.injection.requested_oauth_error_endpoint.clone(),
        requested_oauth_error_description: params
            .injection
            .requested_oauth_error_description
            .clone(),
    };

    Html(render_confirmation(&view)).into_response()
}

/// `GET /generate-response` handler (Finalize).
pub async fn generate_response_handler(
    State(state): State<AppState>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    let effective = EffectiveRequest::resolve(&state, &params);

    // Same redirect-trust rule as /authorize.
    let Some(redirect_uri) = trusted_redirect_uri(&state, &params, &effective) else {
        return untrusted_redirect_response();
    };

    let operator_payload = params
        .json_payload
        .as_deref()
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        });

    let Some(operator_payload) = operator_payload else {
        warn!(client_id = ?params.client_id, "Operator payload is not valid JSON");
        return error_redirect(
            &redirect_uri,
            AuthorizationErrorRedirect::from_code(
                AuthorizationErrorCode::InvalidJson,
                INVALID_JSON_DESCRIPTION,
                effective.state.clone(),
            )
            .with_issuer(state.config.name.clone()),
        );
    };

    // Shared claims first, operator keys win.
    let mut attributes: Map<String, Value> = effective
        .claims
        .as_ref()
        .and_then(RequestObjectClaims::shared_claims)
        .cloned()
        .unwrap_or_default();
    attributes.extend(operator_payload);

    let payload_id = params
        .resource_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let code = Uuid::new_v4().to_string();

    state.credentials.persist(payload_id.clone(), attributes).await;
    state
        .auth_codes
        .persist(
            code.clone(),
            IssuedCode {
                payload_id: payload_id.clone(),
                redirect_uri: Some(redirect_uri.clone()),
            },
        )
        .await;
    state
        .injections
        .persist(code.clone(), params.injection.clone())
        .await;

    info!(client_id = ?params.client_id, payload_id = %payload_id, "Authorization code issued");

    let redirect = AuthorizationSuccessRedirect::new(code, effective.state.clone());
    match redirect.to_redirect_url(&redirect_uri) {
        Ok(url) => found(&url),
        Err(e) => {
            warn!(error = %e, "Redirect URI unparseable at Finalize");
            untrusted_redirect_response()
        }
    }
}

/// Applies validation step 1: the effective redirect URI must be registered
/// for the client or fall inside the shared test-domain allowance.
fn trusted_redirect_uri(
    state: &AppState,
    params: &AuthorizeParams,
    effective: &EffectiveRequest,
) -> Option<String> {
    let redirect_uri = effective.redirect_uri.as_deref()?;
    state
        .config
        .is_redirect_uri_allowed(params.client_id.as_deref(), redirect_uri)
        .then(|| redirect_uri.to_string())
}

fn untrusted_redirect_response() -> Response {
    (StatusCode::BAD_REQUEST, UNTRUSTED_REDIRECT_TEXT).into_response()
}

fn error_redirect(redirect_uri: &str, redirect: AuthorizationErrorRedirect) -> Response {
    match redirect.to_redirect_url(redirect_uri) {
        Ok(url) => found(&url),
        Err(_) => untrusted_redirect_response(),
    }
}

/// Plain 302 Found, the status relying parties in the wild follow.
fn found(url: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::jar::RequestObjectBuilder;

    fn state_with_demo_client() -> AppState {
        let mut config = crate::IssuerConfig::default();
        config.clients = fixtures::demo_registry();
        AppState::new(config)
    }

    #[test]
    fn request_object_claims_override_top_level_params() {
        let state = state_with_demo_client();
        let request = RequestObjectBuilder::new()
            .response_type("code")
            .redirect_uri("https://valid.example.com")
            .state("jwt-state")
            .sign_es256(fixtures::EC_PRIVATE_KEY_PEM)
            .unwrap();

        let params = AuthorizeParams {
            client_id: Some(fixtures::DEMO_CLIENT_ID.to_string()),
            request: Some(request),
            response_type: Some("token".to_string()),
            redirect_uri: Some("https://top-level.example.com".to_string()),
            state: Some("top-level-state".to_string()),
            ..AuthorizeParams::default()
        };

        let effective = EffectiveRequest::resolve(&state, &params);
        assert_eq!(effective.response_type.as_deref(), Some("code"));
        assert_eq!(
            effective.redirect_uri.as_deref(),
            Some("https://valid.example.com")
        );
        assert_eq!(effective.state.as_deref(), Some("jwt-state"));
        assert!(!effective.decode_failed);
    }

    #[test]
    fn top_level_params_fill_gaps_left_by_request_object() {
        let state = state_with_demo_client();
        let request = RequestObjectBuilder::new()
            .response_type("code")
            .sign_es256(fixtures::EC_PRIVATE_KEY_PEM)
            .unwrap();

        let params = AuthorizeParams {
            client_id: Some(fixtures::DEMO_CLIENT_ID.to_string()),
            request: Some(request),
            redirect_uri: Some("https://valid.example.com".to_string()),
            state: Some("top-level-state".to_string()),
            ..AuthorizeParams::default()
        };

        let effective = EffectiveRequest::resolve(&state, &params);
        assert_eq!(
            effective.redirect_uri.as_deref(),
            Some("https://valid.example.com")
        );
        assert_eq!(effective.state.as_deref(), Some("top-level-state"));
    }

    #[test]
    fn undecodable_request_object_is_flagged_not_fatal() {
        let state = state_with_demo_client();
        let params = AuthorizeParams {
            client_id: Some(fixtures::DEMO_CLIENT_ID.to_string()),
            request: Some("garbage".to_string()),
            response_type: Some("code".to_string()),
            redirect_uri: Some("https://valid.example.com".to_string()),
            ..AuthorizeParams::default()
        };

        let effective = EffectiveRequest::resolve(&state, &params);
        assert!(effective.decode_failed);
        assert_eq!(effective.response_type.as_deref(), Some("code"));
    }
}
