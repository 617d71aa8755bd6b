// src/utils/crypto.rs
//! Cryptographic utilities optimized for blockchain compatibility.
//!
//! Uses Keccak-256 (Ethereum's standard hash function) for all operations.

use ethers::utils::keccak256;

/// Computes a Keccak-256 hash of the input data (Ethereum-compatible).
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
///
/// Matches Solidity's `keccak256()`, so digests computed here can be
/// recomputed by any Ethereum tooling holding the same bytes.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}
