// src/models/event.rs
//! Registry events.
//!
//! The ordered log of these events is the durable source of truth for the
//! registry; records and indices are a cache rebuilt by replaying it.

use crate::models::credential::{CredentialId, Fingerprint};
use crate::models::identity::Identity;
use serde::{Deserialize, Serialize};

/// A state change applied to the registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    /// A new credential was created. Carries the full record contents so a
    /// replay can rebuild the record without any other input.
    CredentialIssued {
        id: CredentialId,
        issuer: Identity,
        subject: Identity,
        fingerprint: Fingerprint,
        issued_at: u64,
        expires_at: u64,
    },
    /// A credential was revoked by `caller` (always its issuer).
    CredentialRevoked {
        id: CredentialId,
        caller: Identity,
        revoked_at: u64,
    },
}

impl RegistryEvent {
    pub fn credential_id(&self) -> CredentialId {
        match self {
            RegistryEvent::CredentialIssued { id, .. } | RegistryEvent::CredentialRevoked { id, .. } => *id,
        }
    }
}

/// An event together with its position in the log. Sequence numbers start at 1.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub seq: u64,
    #[serde(flatten)]
    pub event: RegistryEvent,
}
