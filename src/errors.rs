// src/errors.rs
//! Error types for the credential registry.
//!
//! Every failure the registry, the content binder and the journal can report
//! is a variant of [`RegistryError`]. Variants are grouped into an
//! [`ErrorKind`] so the API layer can map them onto response codes without
//! matching every variant.

use crate::models::credential::CredentialId;
use thiserror::Error;

/// Classification of registry failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or forbidden input. Always the caller's fault.
    Validation,
    /// Caller lacks the required relationship to the record.
    Authorization,
    /// Well-formed request against a record in the wrong state.
    State,
    /// Journal I/O or replay failure.
    Storage,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("claim payload must not be empty")]
    EmptyClaim,

    #[error("invalid subject: {0}")]
    InvalidSubject(String),

    #[error("validity duration must be a positive number of seconds, got {0}")]
    InvalidDuration(i64),

    #[error("issuer {issuer} does not match authenticated caller {caller}")]
    UnauthorizedIssuer { issuer: String, caller: String },

    #[error("only the issuer can revoke credential {id}")]
    UnauthorizedRevoker { id: CredentialId },

    #[error("credential {0} not found")]
    NotFound(CredentialId),

    #[error("credential {0} is already revoked")]
    AlreadyRevoked(CredentialId),

    #[error("event journal I/O failed: {0}")]
    Journal(#[from] std::io::Error),

    #[error("event log replay failed: {0}")]
    Replay(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::InvalidIdentity(_)
            | RegistryError::EmptyClaim
            | RegistryError::InvalidSubject(_)
            | RegistryError::InvalidDuration(_) => ErrorKind::Validation,
            RegistryError::UnauthorizedIssuer { .. } | RegistryError::UnauthorizedRevoker { .. } => {
                ErrorKind::Authorization
            }
            RegistryError::NotFound(_) | RegistryError::AlreadyRevoked(_) => ErrorKind::State,
            RegistryError::Journal(_) | RegistryError::Replay(_) => ErrorKind::Storage,
        }
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::InvalidIdentity(_) => "InvalidIdentity",
            RegistryError::EmptyClaim => "EmptyClaim",
            RegistryError::InvalidSubject(_) => "InvalidSubject",
            RegistryError::InvalidDuration(_) => "InvalidDuration",
            RegistryError::UnauthorizedIssuer { .. } => "UnauthorizedIssuer",
            RegistryError::UnauthorizedRevoker { .. } => "UnauthorizedRevoker",
            RegistryError::NotFound(_) => "NotFound",
            RegistryError::AlreadyRevoked(_) => "AlreadyRevoked",
            RegistryError::Journal(_) => "JournalFailure",
            RegistryError::Replay(_) => "ReplayFailure",
        }
    }
}
