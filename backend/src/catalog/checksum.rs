//! Content fingerprints for catalog sources.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of raw source bytes.
///
/// Returns the lowercase hexadecimal digest.
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
