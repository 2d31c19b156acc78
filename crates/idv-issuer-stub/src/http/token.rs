//! Token endpoint.
//!
//! Redeems a single-use authorization code for a bearer access token.
//! A token-targeted injection record stored against the presented code is
//! consulted before any validation and, if it fires, is echoed verbatim.

use axum::Json;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};
use uuid::Uuid;

use idv_protocol::token::{TokenError, TokenErrorCode, TokenRequest, TokenResponse};

use crate::http::AppState;

/// `POST /token` handler.
pub async fn token_handler(
    State(state): State<AppState>,
    Form(request): Form<TokenRequest>,
) -> Response {
    // Injection first: a stored record targeting this endpoint bypasses
    // validation entirely. Consulting it consumes it.
    if let Some(code) = request.code.as_deref() {
        if let Some(forced) = state.injections.take_for_token(code).await {
            info!(error = %forced.error, "Returning injected token error");
            return token_error(TokenError::verbatim(forced.error, forced.description));
        }
    }

    match exchange(&state, &request).await {
        Ok(response) => {
            let mut headers = HeaderMap::new();
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            (StatusCode::OK, headers, Json(response)).into_response()
        }
        Err(error) => token_error(error),
    }
}

async fn exchange(state: &AppState, request: &TokenRequest) -> Result<TokenResponse, TokenError> {
    // 1. Some form of client identification must be present.
    let has_assertion =
        request.client_assertion_type.is_some() && request.client_assertion.is_some();
    if request.client_id.is_none() && !has_assertion {
        warn!("Token request carries no client identification");
        return Err(TokenError::with_description(
            TokenErrorCode::InvalidClient,
            "Client authentication failed",
        ));
    }

    // 2. A bare client_id must be registered.
    if let Some(client_id) = request.client_id.as_deref() {
        if !state.config.clients.contains(client_id) {
            warn!(client_id = %client_id, "Unknown client at token endpoint");
            return Err(TokenError::with_description(
                TokenErrorCode::InvalidClient,
                "Client authentication failed",
            ));
        }
    }

    // 3. Only the authorization-code grant is supported.
    if !request.grant_type.eq_ignore_ascii_case("authorization_code") {
        warn!(grant_type = %request.grant_type, "Unsupported grant type");
        return Err(TokenError::new(TokenErrorCode::UnsupportedGrantType));
    }

    // 4. The code must have been issued and not yet redeemed. Lookup here,
    // consume only once every check has passed.
    let code = request
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| TokenError::new(TokenErrorCode::InvalidGrant))?;
    let issued = state
        .auth_codes
        .lookup(code)
        .await
        .ok_or_else(|| TokenError::new(TokenErrorCode::InvalidGrant))?;

    // 5. redirect_uri is required.
    let redirect_uri = request
        .redirect_uri
        .as_deref()
        .ok_or_else(|| TokenError::new(TokenErrorCode::InvalidRequest))?;

    // 6. It must match the value captured at issuance. Two blanks match.
    let captured = issued.redirect_uri.as_deref().unwrap_or("");
    if redirect_uri != captured {
        warn!("redirect_uri does not match the value captured at issuance");
        return Err(TokenError::new(TokenErrorCode::InvalidGrant));
    }

    // Single-use: the atomic take arbitrates concurrent redemptions.
    let issued = state
        .auth_codes
        .take(code)
        .await
        .ok_or_else(|| TokenError::new(TokenErrorCode::InvalidGrant))?;

    let access_token = Uuid::new_v4().to_string();
    state
        .access_tokens
        .persist(access_token.clone(), issued.payload_id.clone())
        .await;

    info!(payload_id = %issued.payload_id, "Access token issued");

    Ok(TokenResponse::bearer(access_token))
}

fn token_error(error: TokenError) -> Response {
    let status =
        StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(error)).into_response()
}
