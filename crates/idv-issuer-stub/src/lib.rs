//! # idv-issuer-stub
//!
//! Credential-issuer test double for exercising an identity-verification
//! platform end-to-end without a real government-grade issuer.
//!
//! The stub plays the authorization-server side of an OpenID-Connect-style
//! authorization-code exchange:
//!
//! - `GET /authorize` validates a JWT-secured authorization request (JAR)
//!   and renders an operator confirmation page
//! - `GET /generate-response` mints a single-use authorization code bound to
//!   the operator-confirmed attribute payload
//! - `POST /token` redeems the code for a bearer access token
//! - `GET /credential` returns the attribute payload bound to a bearer token
//!
//! A parallel error-injection mechanism lets a test scenario force a
//! specific protocol-level failure at either the authorization or the token
//! endpoint.
//!
//! All state is process-lifetime only; a restart clears every store.
//!
//! ## Modules
//!
//! - [`config`] - Environment-based stub configuration and client registry
//! - [`jar`] - Request-object (JAR) decoding and construction
//! - [`store`] - In-memory stores for codes, credentials, tokens, injections
//! - [`http`] - Axum handlers and router
//! - [`views`] - Minimal HTML rendering for the confirmation page

pub mod config;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod jar;
pub mod store;
pub mod types;
pub mod views;

pub use config::IssuerConfig;
pub use error::{IssuerError, IssuerResult};
pub use http::{AppState, build_router};
