//! Authorization endpoint wire types.
//!
//! Covers both directions of the front channel: building the redirect back
//! to the relying party (success code or error), and parsing the resulting
//! callback query string on the relying-party side.

use std::fmt;

use serde::{Deserialize, Serialize};

/// OAuth 2.0 authorization error codes.
///
/// The RFC 6749 Section 4.1.2.1 codes plus the spellings the stub services
/// use on the front channel (`invalid_client` for an unknown client,
/// `invalid_json` for an unparseable operator payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationErrorCode {
    /// The request is missing a required parameter or is otherwise malformed.
    InvalidRequest,

    /// The client is unknown or not registered.
    InvalidClient,

    /// The client is not authorized to request an authorization code.
    UnauthorizedClient,

    /// The resource owner or authorization server denied the request.
    AccessDenied,

    /// Only `response_type=code` is supported.
    UnsupportedResponseType,

    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,

    /// The operator-supplied JSON payload could not be parsed.
    InvalidJson,

    /// The authorization server encountered an unexpected condition.
    ServerError,
}

impl AuthorizationErrorCode {
    /// Returns the wire spelling of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::InvalidJson => "invalid_json",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for AuthorizationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Successful authorization redirect parameters.
///
/// Appended to the relying party's redirect URI once the operator confirms
/// the payload and a code is minted:
///
/// ```text
/// HTTP/1.1 302 Found
/// Location: https://app.example.com/callback?code=...&state=...
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationSuccessRedirect {
    /// Authorization code to be exchanged for a token.
    pub code: String,

    /// Echoed state parameter, when the request carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizationSuccessRedirect {
    /// Creates a new success redirect.
    #[must_use]
    pub fn new(code: String, state: Option<String>) -> Self {
        Self { code, state }
    }

    /// Builds the redirect URL with `code` and `state` query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI cannot be parsed as a URL.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", &self.code);
            if let Some(ref state) = self.state {
                pairs.append_pair("state", state);
            }
        }
        Ok(url.to_string())
    }
}

/// Authorization error redirect parameters.
///
/// The error is carried as a plain string rather than the
/// [`AuthorizationErrorCode`] enum so that injected errors can be echoed
/// verbatim, whatever a test scenario asked for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationErrorRedirect {
    /// Error code, normally one of the [`AuthorizationErrorCode`] spellings.
    pub error: String,

    /// Issuer display name, carried as the `iss` parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// Echoed state parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizationErrorRedirect {
    /// Creates an error redirect from a known error code.
    #[must_use]
    pub fn from_code(
        error: AuthorizationErrorCode,
        description: impl Into<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            error: error.as_str().to_string(),
            issuer: None,
            error_description: Some(description.into()),
            state,
        }
    }

    /// Creates an error redirect from a verbatim error string.
    ///
    /// Used by the error-injection path, which must echo whatever error the
    /// scenario registered.
    #[must_use]
    pub fn verbatim(
        error: impl Into<String>,
        description: Option<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            error: error.into(),
            issuer: None,
            error_description: description,
            state,
        }
    }

    /// Sets the issuer name carried as the `iss` parameter.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Builds the redirect URL with `error`, `iss`, `error_description` and
    /// `state` query parameters, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI cannot be parsed as a URL.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("error", &self.error);
            if let Some(ref issuer) = self.issuer {
                pairs.append_pair("iss", issuer);
            }
            if let Some(ref desc) = self.error_description {
                pairs.append_pair("error_description", desc);
            }
            if let Some(ref state) = self.state {
                pairs.append_pair("state", state);
            }
        }
        Ok(url.to_string())
    }
}

/// Parsed authorization response, as seen by the relying party's callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResponse {
    /// The issuer redirected back with a code.
    Success {
        /// Authorization code.
        code: String,
        /// Echoed state.
        state: Option<String>,
    },
    /// The issuer redirected back with an error.
    Error {
        /// Error code string.
        error: String,
        /// Error description, if provided.
        error_description: Option<String>,
        /// Echoed state.
        state: Option<String>,
    },
}

/// Raw callback query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code, on success.
    #[serde(default)]
    pub code: Option<String>,
    /// Error code, on failure.
    #[serde(default)]
    pub error: Option<String>,
    /// Error description, on failure.
    #[serde(default)]
    pub error_description: Option<String>,
    /// Echoed state.
    #[serde(default)]
    pub state: Option<String>,
}

impl AuthorizationResponse {
    /// Classifies a set of callback parameters.
    ///
    /// The presence of `error` marks the response as a failure regardless of
    /// any other parameter; otherwise `code` must be present.
    ///
    /// # Errors
    ///
    /// Returns an error when neither `error` nor `code` is present.
    pub fn from_params(params: CallbackParams) -> Result<Self, ResponseParseError> {
        if let Some(error) = params.error {
            return Ok(Self::Error {
                error,
                error_description: params.error_description,
                state: params.state,
            });
        }
        match params.code {
            Some(code) => Ok(Self::Success {
                code,
                state: params.state,
            }),
            None => Err(ResponseParseError::MissingCode),
        }
    }

    /// Returns true when the response carries a code.
    #[must_use]
    pub fn indicates_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the echoed state, if any.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::Success { state, .. } | Self::Error { state, .. } => state.as_deref(),
        }
    }
}

/// Errors raised when classifying a callback query string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResponseParseError {
    /// Neither `code` nor `error` was present.
    #[error("authorization response carries neither code nor error")]
    MissingCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_redirect_appends_code_and_state() {
        let redirect = AuthorizationSuccessRedirect::new(
            "SplxlOBeZQQYbYS6WxSbIA".to_string(),
            Some("abc123".to_string()),
        );

        let url = redirect
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();

        assert!(url.starts_with("https://app.example.com/callback?"));
        assert!(url.contains("code=SplxlOBeZQQYbYS6WxSbIA"));
        assert!(url.contains("state=abc123"));
    }

    #[test]
    fn success_redirect_omits_absent_state() {
        let redirect = AuthorizationSuccessRedirect::new("code123".to_string(), None);

        let url = redirect
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();

        assert!(!url.contains("state="));
    }

    #[test]
    fn error_redirect_orders_parameters() {
        let redirect = AuthorizationErrorRedirect::from_code(
            AuthorizationErrorCode::UnsupportedResponseType,
            "Only response_type=code is supported",
            Some("test-state".to_string()),
        );

        let url = redirect
            .to_redirect_url("https://valid.example.com")
            .unwrap();

        assert_eq!(
            url,
            "https://valid.example.com/?error=unsupported_response_type\
             &error_description=Only+response_type%3Dcode+is+supported&state=test-state"
        );
    }

    #[test]
    fn error_redirect_places_issuer_after_error() {
        let redirect = AuthorizationErrorRedirect::from_code(
            AuthorizationErrorCode::InvalidJson,
            "Unable to generate valid JSON Payload",
            Some("test-state".to_string()),
        )
        .with_issuer("Credential Issuer Stub");

        let url = redirect
            .to_redirect_url("https://valid.example.com")
            .unwrap();

        assert_eq!(
            url,
            "https://valid.example.com/?error=invalid_json&iss=Credential+Issuer+Stub\
             &error_description=Unable+to+generate+valid+JSON+Payload&state=test-state"
        );
    }

    #[test]
    fn error_redirect_echoes_injected_error_verbatim() {
        let redirect = AuthorizationErrorRedirect::verbatim(
            "temporarily_unavailable",
            Some("forced by scenario".to_string()),
            None,
        );

        let url = redirect
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();

        assert!(url.contains("error=temporarily_unavailable"));
        assert!(url.contains("error_description=forced+by+scenario"));
        assert!(!url.contains("state="));
    }

    #[test]
    fn error_code_wire_spellings() {
        assert_eq!(AuthorizationErrorCode::InvalidClient.as_str(), "invalid_client");
        assert_eq!(
            AuthorizationErrorCode::UnsupportedResponseType.as_str(),
            "unsupported_response_type"
        );
        assert_eq!(AuthorizationErrorCode::InvalidJson.as_str(), "invalid_json");
        assert_eq!(AuthorizationErrorCode::InvalidJson.to_string(), "invalid_json");
    }

    #[test]
    fn callback_with_code_parses_as_success() {
        let params = CallbackParams {
            code: Some("abc".to_string()),
            state: Some("xyz".to_string()),
            ..CallbackParams::default()
        };

        let response = AuthorizationResponse::from_params(params).unwrap();
        assert!(response.indicates_success());
        assert_eq!(response.state(), Some("xyz"));
    }

    #[test]
    fn callback_with_error_parses_as_error_even_with_code() {
        let params = CallbackParams {
            code: Some("abc".to_string()),
            error: Some("access_denied".to_string()),
            error_description: Some("denied".to_string()),
            state: None,
        };

        let response = AuthorizationResponse::from_params(params).unwrap();
        assert!(!response.indicates_success());
        match response {
            AuthorizationResponse::Error { error, .. } => assert_eq!(error, "access_denied"),
            AuthorizationResponse::Success { .. } => panic!("expected error response"),
        }
    }

    #[test]
    fn callback_without_code_or_error_is_rejected() {
        let params = CallbackParams::default();
        assert_eq!(
            AuthorizationResponse::from_params(params),
            Err(ResponseParseError::MissingCode)
        );
    }
}
