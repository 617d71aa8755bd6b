// src/models/credential.rs
//! Credential record data model.
//!
//! A credential is the registry's record that an issuer asserted a claim
//! about a subject, bound by a content fingerprint and valid for a bounded
//! window. The claim itself is never stored; only its fingerprint is.

use crate::models::identity::Identity;
use ethers_core::types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte Keccak-256 digest produced by the content binder.
///
/// Serializes as a `0x`-prefixed hex string.
pub type Fingerprint = H256;

/// Registry-assigned credential identifier.
///
/// Allocated from a monotonically increasing counter starting at 1, so ids are
/// never reused and sort in issuance order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CredentialId(pub u64);

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of checking a credential at a point in time.
///
/// None of these are errors: checking a possibly-invalid credential is a
/// normal operation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityState {
    Valid,
    Expired,
    Revoked,
    NotFound,
}

/// A credential record as held by the registry.
///
/// # Fields
/// - `id`: Registry-assigned identifier
/// - `issuer`: Identity that issued (and alone may revoke) the credential
/// - `subject`: Identity the claim is about
/// - `fingerprint`: Binding of issuer, subject and claim content
/// - `issued_at` / `expires_at`: Validity window in unix seconds
/// - `revoked` / `revoked_at`: Revocation flag and when it was set
///
/// All fields except the revocation pair are fixed at issuance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: CredentialId,
    pub issuer: Identity,
    pub subject: Identity,
    pub fingerprint: Fingerprint,
    pub issued_at: u64,
    pub expires_at: u64,
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<u64>,
}

impl Credential {
    /// Computes the validity state of this record at `now`.
    ///
    /// Revocation takes precedence over expiry, and the expiry boundary itself
    /// already counts as expired.
    pub fn validity_at(&self, now: u64) -> ValidityState {
        if self.revoked {
            ValidityState::Revoked
        } else if now >= self.expires_at {
            ValidityState::Expired
        } else {
            ValidityState::Valid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(revoked: bool) -> Credential {
        Credential {
            id: CredentialId(1),
            issuer: Identity::parse("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap(),
            subject: Identity::parse("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap(),
            fingerprint: H256::repeat_byte(0xab),
            issued_at: 1_000,
            expires_at: 4_600,
            revoked,
            revoked_at: None,
        }
    }

    #[test]
    fn test_validity_window_boundaries() {
        let credential = record(false);
        assert_eq!(credential.validity_at(1_000), ValidityState::Valid);
        assert_eq!(credential.validity_at(4_599), ValidityState::Valid);
        assert_eq!(credential.validity_at(4_600), ValidityState::Expired);
        assert_eq!(credential.validity_at(9_999), ValidityState::Expired);
    }

    #[test]
    fn test_revocation_takes_precedence() {
        let credential = record(true);
        assert_eq!(credential.validity_at(1_000), ValidityState::Revoked);
        assert_eq!(credential.validity_at(9_999), ValidityState::Revoked);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(record(false)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["subject"], "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        assert!(json["fingerprint"].as_str().unwrap().starts_with("0xabab"));
        assert!(json.get("revoked_at").is_none());
    }
}
