//! # idv-protocol
//!
//! Shared OAuth 2.0 wire types for the IDV stub services.
//!
//! Both the credential-issuer stub and the orchestrator stub speak the same
//! authorization-code exchange protocol; this crate holds the request,
//! response and error shapes they exchange:
//!
//! - [`authorize`] - Authorization endpoint parameters, success and error
//!   redirects, callback-response parsing
//! - [`token`] - Token endpoint request/response/error types

pub mod authorize;
pub mod token;

pub use authorize::{
    AuthorizationErrorCode, AuthorizationErrorRedirect, AuthorizationResponse,
    AuthorizationSuccessRedirect,
};
pub use token::{TokenError, TokenErrorCode, TokenRequest, TokenResponse};
