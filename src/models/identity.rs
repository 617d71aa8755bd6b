// src/models/identity.rs
//! Account identity model.
//!
//! Issuers, subjects and callers are all identified by a 20-byte account
//! address, the same addressable type the Ethereum tooling uses. Parsing
//! follows the rules wallets apply: hex with an optional `0x` prefix, and
//! mixed-case input must carry a valid EIP-55 checksum.

use crate::errors::RegistryError;
use ethers_core::types::Address;
use ethers_core::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A well-formed 20-byte account identity.
///
/// # Serialization
/// Serialized as the EIP-55 checksummed hex string and parsed back through
/// [`Identity::parse`], so malformed identities never deserialize.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(Address);

impl Identity {
    /// Parses an identity from its hex representation.
    ///
    /// # Arguments
    /// * `value` - 40 hex characters, optionally prefixed with `0x`
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidIdentity` if:
    /// - The value is not 20 bytes of hex
    /// - The value is mixed-case and the EIP-55 checksum does not match
    pub fn parse(value: &str) -> Result<Self, RegistryError> {
        let hex_part = value.strip_prefix("0x").unwrap_or(value);

        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RegistryError::InvalidIdentity(value.to_string()));
        }

        let address = Address::from_str(hex_part)
            .map_err(|_| RegistryError::InvalidIdentity(value.to_string()))?;

        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let checksummed = to_checksum(&address, None);
            if checksummed.trim_start_matches("0x") != hex_part {
                return Err(RegistryError::InvalidIdentity(value.to_string()));
            }
        }

        Ok(Identity(address))
    }

    /// Whether this is the zero (null) address. Never a valid credential subject.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Underlying address, used by the ABI encoder.
    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for Identity {
    fn from(address: Address) -> Self {
        Identity(address)
    }
}

impl FromStr for Identity {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identity::parse(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identity::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_string()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_checksum(&self.0, None))
    }
}
