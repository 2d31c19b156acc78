//! # idv-orchestrator-stub
//!
//! Relying-party test double for the identity-verification exchange. The
//! stub drives the authorization-code flow against the credential-issuer
//! stub and displays whatever identity attributes come back:
//!
//! - `GET /authorize` mints a state value and redirects the browser to the
//!   issuer's authorization endpoint
//! - `GET /callback` verifies the returned state, exchanges the code for a
//!   bearer token, fetches the identity payload and renders it as a table
//!
//! Every outbound failure is fatal and logged once; the stub never retries.
//!
//! ## Modules
//!
//! - [`config`] - Environment-based configuration
//! - [`state`] - Process-lifetime store for outstanding state values
//! - [`client`] - Outbound token-exchange and credential-fetch calls
//! - [`http`] - Axum handlers and router
//! - [`views`] - HTML rendering for the retrieved attributes

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod state;
pub mod views;

pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, OrchestratorResult};
pub use http::{AppState, build_router};
