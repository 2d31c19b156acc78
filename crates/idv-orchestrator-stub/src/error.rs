//! Orchestrator error types.

use thiserror::Error;

/// Failures on the relying-party side of the exchange.
///
/// Every variant is fatal for the request that raised it; the stub logs
/// once and never retries.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The issuer redirected back with a protocol error.
    #[error("authorization failed: {error}: {}", description.as_deref().unwrap_or("no description"))]
    AuthorizationDenied {
        /// Error code from the callback query.
        error: String,
        /// Error description, if the issuer supplied one.
        description: Option<String>,
    },

    /// The callback carried a state value this process never issued.
    #[error("callback state does not match any outstanding authorization request")]
    StateMismatch,

    /// The callback carried neither a code nor an error.
    #[error("malformed callback: {0}")]
    MalformedCallback(#[from] idv_protocol::authorize::ResponseParseError),

    /// The issuer's token endpoint refused the exchange.
    #[error("token exchange failed: {error}: {}", description.as_deref().unwrap_or("no description"))]
    TokenExchange {
        /// OAuth error code from the JSON body.
        error: String,
        /// Error description, if supplied.
        description: Option<String>,
    },

    /// The credential endpoint refused the bearer token.
    #[error("credential fetch failed with status {status}")]
    CredentialFetch {
        /// HTTP status of the refusal.
        status: u16,
    },

    /// Transport-level failure talking to the issuer.
    #[error("issuer unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// Configuration is missing or unparseable.
    #[error("configuration error: {message}")]
    Configuration {
        /// What was wrong.
        message: String,
    },
}

impl OrchestratorError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Convenience alias for orchestrator results.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
