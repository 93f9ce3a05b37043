//! SHA-256 utilities for media files
//!
//! The upload collaborator is handed the base64 SHA-256 of the *encrypted*
//! file so the media server can verify what it received.

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Standard-alphabet, padded base64 of SHA-256(`encrypted`).
pub fn file_enc_sha256_b64(encrypted: &[u8]) -> String {
    general_purpose::STANDARD.encode(sha256(encrypted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn enc_sha_is_padded_base64() {
        let b64 = file_enc_sha256_b64(b"abc");
        assert_eq!(b64, "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=");
        assert_eq!(b64.len(), 44);
    }
}
