// src/services/verifier.rs
//! Credential verification service.
//!
//! Read-only view of the registry for relying parties: validity checks,
//! lookups, and re-verification of a presented claim against the
//! fingerprint the registry recorded at issuance.

use crate::contracts::content_binder;
use crate::contracts::credential_registry::CredentialRegistry;
use crate::errors::RegistryError;
use crate::models::credential::{CredentialId, ValidityState};
use crate::models::identity::Identity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of checking a presented claim against a credential.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentCheck {
    /// Validity of the credential at check time
    pub state: ValidityState,
    /// Whether the presented issuer, subject and claim reproduce the stored fingerprint
    pub content_matches: bool,
}

/// Credential verifier over a shared registry.
#[derive(Clone)]
pub struct Verifier {
    registry: Arc<CredentialRegistry>,
}

impl Verifier {
    pub fn new(registry: Arc<CredentialRegistry>) -> Self {
        Self { registry }
    }

    /// Reports a credential's validity. Never fails; unknown ids are `NotFound`.
    pub fn verify(&self, id: CredentialId) -> ValidityState {
        self.registry.verify(id)
    }

    /// Recomputes the fingerprint from the presented inputs and compares it,
    /// together with the recorded issuer and subject, to the stored credential.
    ///
    /// # Errors
    /// - `InvalidIdentity` if `issuer` or `subject` is malformed
    /// - `EmptyClaim` if `claim` is empty
    pub fn verify_content(
        &self,
        id: CredentialId,
        issuer: &str,
        subject: &str,
        claim: &str,
    ) -> Result<ContentCheck, RegistryError> {
        let fingerprint = content_binder::fingerprint(issuer, subject, claim)?;

        let Some(credential) = self.registry.credential(id) else {
            return Ok(ContentCheck {
                state: ValidityState::NotFound,
                content_matches: false,
            });
        };

        Ok(ContentCheck {
            state: credential.validity_at(self.registry.now()),
            content_matches: credential.fingerprint == fingerprint,
        })
    }

    pub fn credentials_for_subject(&self, subject: &Identity) -> Vec<CredentialId> {
        self.registry.credentials_for_subject(subject)
    }

    pub fn credentials_for_issuer(&self, issuer: &Identity) -> Vec<CredentialId> {
        self.registry.credentials_for_issuer(issuer)
    }

    /// Subject lookup filtered to credentials that are currently `Valid`.
    pub fn valid_credentials_for_subject(&self, subject: &Identity) -> Vec<CredentialId> {
        self.registry
            .credentials_for_subject(subject)
            .into_iter()
            .filter(|id| self.registry.verify(*id) == ValidityState::Valid)
            .collect()
    }
}
