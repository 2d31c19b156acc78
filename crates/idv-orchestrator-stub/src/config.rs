//! Orchestrator stub configuration.
//!
//! Defaults point at an issuer stub on localhost so the pair runs with no
//! setup; every value can be overridden from the environment.

use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, OrchestratorResult};

/// Root orchestrator stub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Port the stub listens on.
    pub port: u16,

    /// Client id presented to the issuer.
    pub client_id: String,

    /// Issuer authorization endpoint the browser is redirected to.
    pub issuer_authorize_url: String,

    /// Issuer token endpoint for the code exchange.
    pub issuer_token_url: String,

    /// Issuer credential endpoint for the identity fetch.
    pub issuer_credential_url: String,

    /// Redirect URI the issuer sends the browser back to.
    pub redirect_url: String,

    /// Requested scope.
    pub scope: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            port: 8083,
            client_id: "clientIdValid".to_string(),
            issuer_authorize_url: "http://localhost:8084/authorize".to_string(),
            issuer_token_url: "http://localhost:8084/token".to_string(),
            issuer_credential_url: "http://localhost:8084/credential".to_string(),
            redirect_url: "http://localhost:8083/callback".to_string(),
            scope: "openid".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Loads configuration from the environment on top of the defaults.
    ///
    /// Recognised variables: `ORCHESTRATOR_PORT`, `ORCHESTRATOR_CLIENT_ID`,
    /// `ORCHESTRATOR_ISSUER_AUTHORIZE_URL`, `ORCHESTRATOR_ISSUER_TOKEN_URL`,
    /// `ORCHESTRATOR_ISSUER_CREDENTIAL_URL`, `ORCHESTRATOR_REDIRECT_URL`,
    /// `ORCHESTRATOR_SCOPE`.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable.
    pub fn from_env() -> OrchestratorResult<Self> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("ORCHESTRATOR_PORT") {
            config.port = port.parse().map_err(|_| {
                OrchestratorError::configuration(format!(
                    "ORCHESTRATOR_PORT is not a port number: {port}"
                ))
            })?;
        }
        if let Ok(client_id) = std::env::var("ORCHESTRATOR_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Ok(url) = std::env::var("ORCHESTRATOR_ISSUER_AUTHORIZE_URL") {
            config.issuer_authorize_url = url;
        }
        if let Ok(url) = std::env::var("ORCHESTRATOR_ISSUER_TOKEN_URL") {
            config.issuer_token_url = url;
        }
        if let Ok(url) = std::env::var("ORCHESTRATOR_ISSUER_CREDENTIAL_URL") {
            config.issuer_credential_url = url;
        }
        if let Ok(url) = std::env::var("ORCHESTRATOR_REDIRECT_URL") {
            config.redirect_url = url;
        }
        if let Ok(scope) = std::env::var("ORCHESTRATOR_SCOPE") {
            config.scope = scope;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pair_with_the_issuer_stub() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.port, 8083);
        assert!(config.issuer_authorize_url.ends_with("/authorize"));
        assert!(config.issuer_token_url.ends_with("/token"));
        assert_eq!(config.scope, "openid");
    }
}
