//! Token endpoint wire types.
//!
//! Request parsing, success responses and RFC 6749 Section 5.2 error
//! responses for the code-for-token exchange.
//!
//! # Example
//!
//! ```ignore
//! POST /token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=authorization_code
//! &code=SplxlOBeZQQYbYS6WxSbIA
//! &redirect_uri=https://app.example.com/callback
//! &client_id=my-app
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token request parameters.
///
/// Clients identify themselves with either a bare `client_id` or a
/// (`client_assertion_type`, `client_assertion`) pair; the stub accepts
/// both and requires at least one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type. Must be "authorization_code" (case-insensitive);
    /// absent or blank values fail validation as `unsupported_grant_type`
    /// rather than at deserialization, so the field defaults to empty.
    #[serde(default)]
    pub grant_type: String,

    /// The authorization code being redeemed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Redirect URI; must match the value captured when the code was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Client identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Client assertion type (for private_key_jwt-style authentication).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_assertion_type: Option<String>,

    /// Client assertion JWT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_assertion: Option<String>,
}

/// Successful token response.
///
/// ```json
/// {
///   "access_token": "d5f7c1a2-...",
///   "token_type": "Bearer",
///   "expires_in": 3600
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

impl TokenResponse {
    /// Creates a bearer token response with the default stub lifetime.
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        }
    }
}

/// Token error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenError {
    /// Error code string; normally a [`TokenErrorCode`] spelling, but
    /// injected errors are echoed verbatim.
    pub error: String,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a token error from a known error code.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error: error.as_str().to_string(),
            error_description: None,
        }
    }

    /// Creates a token error from a known error code with a description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error: error.as_str().to_string(),
            error_description: Some(description.into()),
        }
    }

    /// Creates a token error from a verbatim error string.
    ///
    /// Used by the error-injection path.
    #[must_use]
    pub fn verbatim(error: impl Into<String>, description: Option<String>) -> Self {
        Self {
            error: error.into(),
            error_description: description,
        }
    }

    /// HTTP status for this error body.
    ///
    /// `invalid_client` maps to 401; everything else, including injected
    /// error codes, maps to 400.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        if self.error == TokenErrorCode::InvalidClient.as_str() {
            401
        } else {
            400
        }
    }
}

/// OAuth 2.0 token error codes, RFC 6749 Section 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed.
    InvalidClient,

    /// The authorization grant is invalid, expired, or already redeemed.
    InvalidGrant,

    /// The client is not authorized to use this grant type.
    UnauthorizedClient,

    /// The grant type is not supported.
    UnsupportedGrantType,

    /// The requested scope is invalid or exceeds what was granted.
    InvalidScope,
}

impl TokenErrorCode {
    /// Returns the wire spelling of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_request_fills_absent_fields_with_none() {
        let request: TokenRequest = serde_json::from_value(serde_json::json!({
            "grant_type": "authorization_code",
            "code": "abc",
            "redirect_uri": "https://app.example.com/callback",
            "client_id": "my-app",
        }))
        .unwrap();

        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code.as_deref(), Some("abc"));
        assert_eq!(
            request.redirect_uri.as_deref(),
            Some("https://app.example.com/callback")
        );
        assert_eq!(request.client_id.as_deref(), Some("my-app"));
        assert!(request.client_assertion_type.is_none());
        assert!(request.client_assertion.is_none());
    }

    #[test]
    fn token_request_without_grant_type_still_deserializes() {
        // A missing grant_type must reach validation, not fail parsing.
        let request: TokenRequest = serde_json::from_value(serde_json::json!({
            "code": "abc",
            "client_id": "my-app",
        }))
        .unwrap();

        assert_eq!(request.grant_type, "");
        assert_eq!(request.code.as_deref(), Some("abc"));
    }

    #[test]
    fn bearer_response_has_default_lifetime() {
        let response = TokenResponse::bearer("token-123".to_string());
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""access_token":"token-123""#));
        assert!(json.contains(r#""token_type":"Bearer""#));
    }

    #[test]
    fn token_error_serializes_without_absent_description() {
        let error = TokenError::new(TokenErrorCode::InvalidGrant);
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"error":"invalid_grant"}"#);
    }

    #[test]
    fn token_error_http_status_mapping() {
        assert_eq!(TokenError::new(TokenErrorCode::InvalidClient).http_status(), 401);
        assert_eq!(TokenError::new(TokenErrorCode::InvalidGrant).http_status(), 400);
        assert_eq!(TokenError::verbatim("server_error", None).http_status(), 400);
    }

    #[test]
    fn error_code_wire_spellings() {
        assert_eq!(TokenErrorCode::InvalidRequest.as_str(), "invalid_request");
        assert_eq!(TokenErrorCode::InvalidClient.as_str(), "invalid_client");
        assert_eq!(TokenErrorCode::InvalidGrant.as_str(), "invalid_grant");
        assert_eq!(
            TokenErrorCode::UnsupportedGrantType.as_str(),
            "unsupported_grant_type"
        );
    }
}
