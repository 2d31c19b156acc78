//! Issuer stub configuration.
//!
//! Configuration comes from environment variables with sensible defaults so
//! the stub starts with no setup at all. The client registry is supplied as
//! a JSON object in `ISSUER_CLIENT_CONFIG`, keyed by client id.

use serde::{Deserialize, Serialize};

use crate::error::{IssuerError, IssuerResult};
use crate::types::ClientRegistry;

/// Root issuer stub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Port the stub listens on.
    pub port: u16,

    /// Issuer name, echoed in rendered views.
    pub name: String,

    /// Shared test-domain allowance for redirect URIs.
    ///
    /// Stubs shared between developer environments accept any redirect URI
    /// containing this domain, so each environment does not have to be
    /// registered individually. Registered redirect URIs are still checked
    /// exactly, which keeps the strict path testable.
    pub shared_redirect_domain: String,

    /// Accept request objects without verifying their signature.
    ///
    /// The stub is a permissive test double: a decrypted request object's
    /// inner signature is trusted on structural well-formedness alone. Set
    /// to `false` to verify signatures against the client's registered
    /// signing key instead.
    pub trust_unverified_request_objects: bool,

    /// Registered clients.
    pub clients: ClientRegistry,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            port: 8084,
            name: "Credential Issuer Stub".to_string(),
            shared_redirect_domain: ".shared-stubs.test".to_string(),
            trust_unverified_request_objects: true,
            clients: ClientRegistry::new(),
        }
    }
}

impl IssuerConfig {
    /// Loads configuration from the environment on top of the defaults.
    ///
    /// Recognised variables: `ISSUER_PORT`, `ISSUER_NAME`,
    /// `ISSUER_SHARED_REDIRECT_DOMAIN`,
    /// `ISSUER_TRUST_UNVERIFIED_REQUEST_OBJECTS`, `ISSUER_CLIENT_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable.
    pub fn from_env() -> IssuerResult<Self> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("ISSUER_PORT") {
            config.port = port.parse().map_err(|_| {
                IssuerError::configuration(format!("ISSUER_PORT is not a port number: {port}"))
            })?;
        }
        if let Ok(name) = std::env::var("ISSUER_NAME") {
            config.name = name;
        }
        if let Ok(domain) = std::env::var("ISSUER_SHARED_REDIRECT_DOMAIN") {
            config.shared_redirect_domain = domain;
        }
        if let Ok(flag) = std::env::var("ISSUER_TRUST_UNVERIFIED_REQUEST_OBJECTS") {
            config.trust_unverified_request_objects = flag.parse().map_err(|_| {
                IssuerError::configuration(format!(
                    "ISSUER_TRUST_UNVERIFIED_REQUEST_OBJECTS is not a boolean: {flag}"
                ))
            })?;
        }
        if let Ok(clients) = std::env::var("ISSUER_CLIENT_CONFIG") {
            config.clients = serde_json::from_str(&clients).map_err(|e| {
                IssuerError::configuration(format!("ISSUER_CLIENT_CONFIG is not valid JSON: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Returns true when the redirect URI is acceptable for the client:
    /// either registered exactly, or within the shared test-domain
    /// allowance.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, client_id: Option<&str>, redirect_uri: &str) -> bool {
        if redirect_uri.contains(&self.shared_redirect_domain) {
            return true;
        }
        client_id
            .and_then(|id| self.clients.get(id))
            .is_some_and(|client| client.is_redirect_uri_registered(redirect_uri))
    }
}
