// src/services/auth.rs
//! Caller authentication for the API.
//!
//! Mutating endpoints need the identity of the caller. The registry does not
//! manage keys; an external authentication service mints HS256 JWTs whose
//! `sub` claim is the caller's address, and this module only validates them.

use crate::models::identity::Identity;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a caller token.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CallerClaims {
    /// Caller address
    pub sub: String,
    /// Expiry, unix seconds
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid bearer token: {0}")]
    InvalidToken(String),
}

/// Validates bearer tokens and extracts the caller identity.
pub struct CallerAuth {
    key: DecodingKey,
    validation: Validation,
}

impl CallerAuth {
    /// # Arguments
    /// * `secret` - Shared HS256 secret with the token issuer
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Authenticates the request described by `headers`.
    ///
    /// # Errors
    /// - `MissingToken` if there is no `Authorization: Bearer` header
    /// - `InvalidToken` if the signature, expiry or `sub` address is invalid
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        let data = decode::<CallerClaims>(token.trim(), &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Identity::parse(&data.claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
