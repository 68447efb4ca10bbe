//! BLAKE3 content hashing for feed change detection

use blake3::Hasher;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate the content hash of a raw feed response body
///
/// The hash only detects no-op refreshes; it is never used as an integrity guarantee.
pub fn content_hash(body: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(body);
    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}

/// Verify a hash matches the expected value
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    // Normalize both hashes (ensure prefix)
    let normalize = |h: &str| {
        if h.starts_with(HASH_PREFIX) {
            h.to_string()
        } else {
            format!("{}{}", HASH_PREFIX, h)
        }
    };

    normalize(expected) == normalize(actual)
}
