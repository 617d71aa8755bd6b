// src/contracts/content_binder.rs
//! Content binder.
//!
//! Maps (issuer, subject, claim) to the fingerprint stored on a credential.
//! The triple is ABI-encoded as `(address, address, string)` and hashed with
//! Keccak-256, which is exactly what a client computes with
//! `keccak256(abi.encode(issuer, subject, claim))`. Addresses occupy fixed
//! 32-byte words and the claim is offset- and length-prefixed, so field
//! boundaries are never ambiguous.

use crate::errors::RegistryError;
use crate::models::credential::Fingerprint;
use crate::models::identity::Identity;
use crate::utils::crypto::hash_data;
use ethers_core::abi::{encode, Token};

/// Computes the fingerprint from raw identity strings.
///
/// # Arguments
/// * `issuer` - Issuer address (hex, optional `0x`)
/// * `subject` - Subject address (hex, optional `0x`)
/// * `claim` - Claim payload text
///
/// # Errors
/// - `InvalidIdentity` if either address is malformed
/// - `EmptyClaim` if the claim is empty
pub fn fingerprint(issuer: &str, subject: &str, claim: &str) -> Result<Fingerprint, RegistryError> {
    let issuer = Identity::parse(issuer)?;
    let subject = Identity::parse(subject)?;
    bind(&issuer, &subject, claim)
}

/// Computes the fingerprint for already-parsed identities.
///
/// # Errors
/// - `EmptyClaim` if the claim is empty
pub fn bind(issuer: &Identity, subject: &Identity, claim: &str) -> Result<Fingerprint, RegistryError> {
    if claim.is_empty() {
        return Err(RegistryError::EmptyClaim);
    }
    Ok(Fingerprint::from(hash_data(&encode_triple(issuer, subject, claim))))
}

fn encode_triple(issuer: &Identity, subject: &Identity, claim: &str) -> Vec<u8> {
    encode(&[
        Token::Address(issuer.address()),
        Token::Address(subject.address()),
        Token::String(claim.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Alphanumeric;
    use rand::Rng;
    use std::collections::HashSet;

    const ISSUER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const SUBJECT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
    const OTHER: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

    #[test]
    fn test_fingerprint_is_deterministic() {
        let first = fingerprint(ISSUER, SUBJECT, "age>=18").unwrap();
        let second = fingerprint(ISSUER, SUBJECT, "age>=18").unwrap();
        assert_eq!(first, second);

        // Case and prefix of the address do not change the identity
        let lower = fingerprint(&ISSUER.to_lowercase(), &SUBJECT[2..].to_lowercase(), "age>=18").unwrap();
        assert_eq!(first, lower);
    }

    #[test]
    fn test_fingerprint_binds_every_field() {
        let base = fingerprint(ISSUER, SUBJECT, "age>=18").unwrap();
        assert_ne!(base, fingerprint(OTHER, SUBJECT, "age>=18").unwrap());
        assert_ne!(base, fingerprint(ISSUER, OTHER, "age>=18").unwrap());
        assert_ne!(base, fingerprint(ISSUER, SUBJECT, "age>=19").unwrap());
        // Swapping issuer and subject is a different credential
        assert_ne!(base, fingerprint(SUBJECT, ISSUER, "age>=18").unwrap());
    }

    #[test]
    fn test_distinct_random_claims_have_distinct_fingerprints() {
        let mut rng = rand::thread_rng();
        let mut claims = HashSet::new();
        let mut fingerprints = HashSet::new();

        for _ in 0..500 {
            let len = rng.gen_range(1..64);
            let claim: String = (&mut rng).sample_iter(&Alphanumeric).take(len).map(char::from).collect();
            if claims.insert(claim.clone()) {
                assert!(fingerprints.insert(fingerprint(ISSUER, SUBJECT, &claim).unwrap()));
            }
        }
    }

    #[test]
    fn test_encoding_layout_is_fixed_width_then_length_prefixed() {
        let issuer = Identity::parse(ISSUER).unwrap();
        let subject = Identity::parse(SUBJECT).unwrap();
        let encoded = encode_triple(&issuer, &subject, "age>=18");

        // two address words, one offset word, one length word, one padded data word
        assert_eq!(encoded.len(), 5 * 32);
        assert_eq!(&encoded[12..32], issuer.address().as_bytes());
        assert_eq!(&encoded[44..64], subject.address().as_bytes());
        assert_eq!(encoded[95], 0x60);
        assert_eq!(encoded[127], 7);
        assert_eq!(&encoded[128..135], b"age>=18");
    }

    #[test]
    fn test_fingerprint_rejects_bad_input() {
        assert!(matches!(
            fingerprint("0x1234", SUBJECT, "age>=18"),
            Err(RegistryError::InvalidIdentity(_))
        ));
        assert!(matches!(
            fingerprint(ISSUER, "not-an-address", "age>=18"),
            Err(RegistryError::InvalidIdentity(_))
        ));
        assert!(matches!(fingerprint(ISSUER, SUBJECT, ""), Err(RegistryError::EmptyClaim)));
    }
}
