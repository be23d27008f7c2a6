//! Content fingerprints for assembled models.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of the JSON serialization of `value`, as 64 lowercase hex characters.
///
/// Struct fields serialize in declaration order and catalogs are sorted maps, so
/// equal models always produce equal fingerprints.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&json);
    Ok(format!("{:x}", digest))
}
