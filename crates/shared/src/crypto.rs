//! Hashing helpers used to fingerprint session identifiers before storage.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint stored for a refresh token's `jti`.
///
/// The raw `jti` never reaches the database; only this digest does.
pub fn session_fingerprint(jti: &str) -> String {
    sha256_hex(jti)
}
