//! SHA-256 digests and their mapping into the field
//!
//! A 32-byte digest does not always fit below the BN254 modulus, so the field
//! mapping keeps the first 31 bytes as a little-endian integer. This loses one
//! byte of the digest but never needs a modular reduction.

use sha2::{Digest, Sha256};

use crate::field::{felt_from_le_slice, Felt, SAFE_BYTES};

/// SHA-256 over `domain || data`
pub fn sha256_with_domain(domain: &[u8], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Map a digest into the field using its first 31 bytes, little-endian
pub fn digest_to_felt(digest: &[u8; 32]) -> Felt {
    felt_from_le_slice(&digest[..SAFE_BYTES])
}
