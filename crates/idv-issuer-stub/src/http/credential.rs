//! Credential retrieval endpoint.
//!
//! Returns the stored attribute map for the bearer token presented in the
//! `Authorization` header. Every failure mode collapses into one generic
//! JSON error; callers learn nothing about whether the token or the
//! payload was the problem.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, warn};

use crate::http::AppState;

/// `GET /credential` handler.
pub async fn credential_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        warn!("Credential request without a bearer token");
        return retrieval_failure();
    };

    let Some(payload_id) = state.access_tokens.lookup(token).await else {
        warn!("Credential request with an unknown bearer token");
        return retrieval_failure();
    };

    let Some(attributes) = state.credentials.lookup(&payload_id).await else {
        warn!(payload_id = %payload_id, "No payload stored for token");
        return retrieval_failure();
    };

    debug!(payload_id = %payload_id, "Credential retrieved");
    Json(serde_json::Value::Object(attributes)).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn retrieval_failure() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "retrieval_failure"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer token-123"),
        );
        assert_eq!(bearer_token(&headers), Some("token-123"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
