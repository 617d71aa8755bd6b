// src/utils/serialization.rs
//! Serialization utilities for the registry.
//!
//! JSON helpers for the event journal's line format.

use serde::{Serialize, Deserialize};
use serde_json;

/// Serializes a value to a single-line JSON string.
///
/// # Arguments
/// * `data` - The value to serialize (must implement `Serialize`)
///
/// # Returns
/// - `Ok(String)` with JSON representation on success
/// - `Err(serde_json::Error)` if serialization fails
///
/// The output never contains a newline, so it is safe as a JSON-lines record.
pub fn serialize<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(data)
}

/// Deserializes a value from a JSON string.
///
/// # Arguments
/// * `data` - JSON string to deserialize
///
/// # Returns
/// - `Ok(T)` with deserialized value on success
/// - `Err(serde_json::Error)` if deserialization fails
pub fn deserialize<'a, T: Deserialize<'a>>(data: &'a str) -> Result<T, serde_json::Error> {
    serde_json::from_str(data)
}
