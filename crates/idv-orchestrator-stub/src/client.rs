//! Outbound calls to the issuer.
//!
//! One call per step, no retries: the token exchange posts the
//! form-encoded code, the credential fetch presents the bearer token. Any
//! refusal or transport failure is wrapped and surfaced to the handler.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use idv_protocol::token::{TokenError, TokenRequest, TokenResponse};

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, OrchestratorResult};

/// HTTP client for the issuer's back-channel endpoints.
#[derive(Debug, Clone)]
pub struct IssuerClient {
    http: reqwest::Client,
    config: Arc<OrchestratorConfig>,
}

impl IssuerClient {
    /// Creates a client over the given configuration.
    #[must_use]
    pub fn new(config: Arc<OrchestratorConfig>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Exchanges an authorization code for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::TokenExchange`] when the issuer answers
    /// with an OAuth error body, or [`OrchestratorError::Transport`] when
    /// the call itself fails.
    pub async fn exchange_code(&self, code: &str) -> OrchestratorResult<TokenResponse> {
        let request = TokenRequest {
            grant_type: "authorization_code".to_string(),
            code: Some(code.to_string()),
            redirect_uri: Some(self.config.redirect_url.clone()),
            client_id: Some(self.config.client_id.clone()),
            ..TokenRequest::default()
        };

        debug!(url = %self.config.issuer_token_url, "Exchanging authorization code");
        let response = self
            .http
            .post(&self.config.issuer_token_url)
            .form(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error: TokenError = response.json().await.unwrap_or_else(|_| {
                TokenError::verbatim("server_error", Some(format!("HTTP {status}")))
            });
            warn!(status, error = %error.error, "Token exchange refused");
            return Err(OrchestratorError::TokenExchange {
                error: error.error,
                description: error.error_description,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetches the identity payload bound to a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::CredentialFetch`] when the issuer
    /// refuses the token, or [`OrchestratorError::Transport`] on transport
    /// failure.
    pub async fn fetch_credential(
        &self,
        access_token: &str,
    ) -> OrchestratorResult<Map<String, Value>> {
        debug!(url = %self.config.issuer_credential_url, "Fetching credential");
        let response = self
            .http
            .get(&self.config.issuer_credential_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "Credential fetch refused");
            return Err(OrchestratorError::CredentialFetch { status });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Arc<OrchestratorConfig> {
        Arc::new(OrchestratorConfig {
            issuer_token_url: format!("{}/token", server.uri()),
            issuer_credential_url: format!("{}/credential", server.uri()),
            ..OrchestratorConfig::default()
        })
    }

    #[tokio::test]
    async fn exchange_posts_form_and_parses_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=code-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token-1",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = IssuerClient::new(config_for(&server));
        let token = client.exchange_code("code-1").await.unwrap();
        assert_eq!(token.access_token, "token-1");
        assert_eq!(token.token_type, "Bearer");
    }

    #[tokio::test]
    async fn oauth_error_body_becomes_token_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "code already redeemed"
            })))
            .mount(&server)
            .await;

        let client = IssuerClient::new(config_for(&server));
        let result = client.exchange_code("stale-code").await;
        match result {
            Err(OrchestratorError::TokenExchange { error, description }) => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description.as_deref(), Some("code already redeemed"));
            }
            other => panic!("expected TokenExchange error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn credential_fetch_presents_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/credential"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Kenneth Decerqueira"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = IssuerClient::new(config_for(&server));
        let attributes = client.fetch_credential("token-1").await.unwrap();
        assert_eq!(
            attributes.get("name").and_then(Value::as_str),
            Some("Kenneth Decerqueira")
        );
    }

    #[tokio::test]
    async fn credential_refusal_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/credential"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "retrieval_failure"
            })))
            .mount(&server)
            .await;

        let client = IssuerClient::new(config_for(&server));
        let result = client.fetch_credential("bad-token").await;
        assert!(matches!(
            result,
            Err(OrchestratorError::CredentialFetch { status: 400 })
        ));
    }
}
