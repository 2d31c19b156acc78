//! Client registrations.
//!
//! The registry is read-only collaborator data: it is loaded once from
//! configuration and consulted by the authorization and token endpoints.
//! The stub never mutates it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A registered relying-party client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientRegistration {
    /// Redirect URIs the client may use.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// PEM-encoded public key the client signs request objects with.
    ///
    /// Only consulted when `trust_unverified_request_objects` is disabled.
    #[serde(default)]
    pub signing_public_key_pem: Option<String>,

    /// PEM-encoded RSA private key used to decrypt the client's encrypted
    /// request objects (JWE, RSA-OAEP).
    #[serde(default)]
    pub encryption_private_key_pem: Option<String>,
}

impl ClientRegistration {
    /// Returns true when the exact redirect URI is registered for this client.
    #[must_use]
    pub fn is_redirect_uri_registered(&self, redirect_uri: &str) -> bool {
        self.redirect_uris.iter().any(|uri| uri == redirect_uri)
    }
}

/// Client registry keyed by client id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientRegistry {
    clients: HashMap<String, ClientRegistration>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a client registration.
    #[must_use]
    pub fn get(&self, client_id: &str) -> Option<&ClientRegistration> {
        self.clients.get(client_id)
    }

    /// Returns true when the client id is registered.
    #[must_use]
    pub fn contains(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Returns true when no clients are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Adds a registration. Used by configuration loading and tests.
    pub fn insert(&mut self, client_id: impl Into<String>, registration: ClientRegistration) {
        self.clients.insert(client_id.into(), registration);
    }
}
