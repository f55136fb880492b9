//! Deterministic signing and verification of key/value request parameters.
//! Both parties hold a shared secret; the signature is a digest over the
//! key-sorted `key=value` pairs with the secret appended.

pub mod config;
pub mod signing;

pub use signing::{sign, verify, ParameterMap, Signer, SIGN_FIELD};
