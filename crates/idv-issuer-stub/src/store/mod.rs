//! In-memory stores for the issuer stub.
//!
//! Every store is an injected service (`Arc<dyn Trait>`) wrapping a
//! concurrency-safe map. Individual insert/lookup/remove operations are
//! atomic; there are no cross-call transactions. Nothing is persisted -
//! a restart clears all state.

pub mod access_token;
pub mod auth_code;
pub mod credential;
pub mod error_injection;

pub use access_token::{AccessTokenStore, InMemoryAccessTokenStore};
pub use auth_code::{AuthCodeStore, InMemoryAuthCodeStore, IssuedCode};
pub use credential::{CredentialStore, InMemoryCredentialStore};
pub use error_injection::{
    ErrorInjectionStore, ForcedError, InMemoryErrorInjectionStore, InjectionEndpoint,
    InjectionRequest,
};
