//! Issuer stub error types.

/// Result alias for issuer-stub operations.
pub type IssuerResult<T> = Result<T, IssuerError>;

/// Errors that can occur inside the issuer stub.
///
/// Handlers translate these into protocol responses (redirect query
/// parameters or JSON bodies); nothing here ever aborts the HTTP exchange
/// on its own.
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    /// The request object could not be decrypted or structurally parsed.
    #[error("Request object is not a valid signed or encrypted JWT: {message}")]
    RequestObjectDecode {
        /// Description of the decode failure.
        message: String,
    },

    /// The request object's signature failed verification.
    ///
    /// Only raised when `trust_unverified_request_objects` is disabled.
    #[error("Request object signature verification failed: {message}")]
    RequestObjectSignature {
        /// Description of the verification failure.
        message: String,
    },

    /// The stub configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl IssuerError {
    /// Creates a request-object decode error.
    #[must_use]
    pub fn request_object_decode(message: impl Into<String>) -> Self {
        Self::RequestObjectDecode {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
