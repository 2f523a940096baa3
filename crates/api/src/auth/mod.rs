//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`credentials`] -- the read-only credential store.
//! - [`service`] -- [`service::TokenService`], issuing and validating bearer tokens.

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod service;
