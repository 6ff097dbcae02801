//! SHA-256 hex digest of uploaded content.
//!
//! The digest is half of the dedup key: `(tenant_id, content hash)` is
//! unique, so identical bytes from the same tenant are rejected at submit.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_hash_identically() {
        let config = b"hostname edge-1\nno telnet\n";
        assert_eq!(sha256_hex(config), sha256_hex(config));
        assert_eq!(sha256_hex(config).len(), 64);
    }

    #[test]
    fn different_bytes_hash_differently() {
        assert_ne!(sha256_hex(b"hostname a"), sha256_hex(b"hostname b"));
    }

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
