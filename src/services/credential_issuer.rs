// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Issuer-side operations on the credential registry. Callers that hold the
//! raw claim use [`CredentialIssuer::issue_claim`], which binds the claim to
//! the caller and subject before issuing; callers that computed the
//! fingerprint themselves use [`CredentialIssuer::issue`].

use crate::contracts::content_binder;
use crate::contracts::credential_registry::{CredentialRegistry, IssueRequest};
use crate::errors::RegistryError;
use crate::models::credential::{CredentialId, Fingerprint};
use crate::models::identity::Identity;
use std::sync::Arc;

/// Result of issuing a raw claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedCredential {
    pub id: CredentialId,
    pub fingerprint: Fingerprint,
}

/// Service for issuing and revoking credentials
#[derive(Clone)]
pub struct CredentialIssuer {
    /// Shared registry
    registry: Arc<CredentialRegistry>,
}

impl CredentialIssuer {
    pub fn new(registry: Arc<CredentialRegistry>) -> Self {
        Self { registry }
    }

    /// Issues a credential for a precomputed fingerprint.
    ///
    /// # Arguments
    /// * `caller` - Authenticated identity invoking the operation
    /// * `request` - Issuer, subject, fingerprint and validity duration
    pub fn issue(&self, caller: &Identity, request: IssueRequest) -> Result<CredentialId, RegistryError> {
        self.registry.issue(caller, request)
    }

    /// Binds a claim to the caller and subject, then issues it.
    ///
    /// The caller is always the issuer here, so the call cannot fail with
    /// `UnauthorizedIssuer`.
    ///
    /// # Errors
    /// - `EmptyClaim` if `claim` is empty
    /// - `InvalidSubject` if `subject` is the zero address
    /// - `InvalidDuration` if `validity_seconds` is not positive
    pub fn issue_claim(
        &self,
        caller: &Identity,
        subject: &Identity,
        claim: &str,
        validity_seconds: i64,
    ) -> Result<IssuedCredential, RegistryError> {
        let fingerprint = content_binder::bind(caller, subject, claim)?;
        let id = self.registry.issue(
            caller,
            IssueRequest {
                issuer: *caller,
                subject: *subject,
                fingerprint,
                validity_seconds,
            },
        )?;
        Ok(IssuedCredential { id, fingerprint })
    }

    /// Revokes a credential previously issued by `caller`.
    pub fn revoke(&self, caller: &Identity, id: CredentialId) -> Result<(), RegistryError> {
        self.registry.revoke(id, caller)
    }
}
