//! Issuer stub domain types.

pub mod client;

pub use client::{ClientRegistration, ClientRegistry};
