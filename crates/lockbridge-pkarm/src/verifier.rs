//! Code verifier derivation
//!
//! The verifier is the secret half of an identity binding. A wallet signs a
//! fixed domain message; the verifier is SHA-256 over a domain tag and the
//! 65-byte signature, truncated to 31 bytes and read little-endian into the
//! field. RFC 6979 signing makes the signature, and so the verifier,
//! reproducible from the same key.

use alloy_primitives::eip191_hash_message;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use lockbridge_primitives::field::felt_serde;
use lockbridge_primitives::{digest_to_felt, felt_to_hex, sha256_with_domain, Felt};
use serde::{Deserialize, Serialize};

use crate::error::{PkarmError, PkarmResult};

/// Domain tag mixed into the verifier hash
pub const VERIFIER_DOMAIN: &[u8] = b"LOCKBRIDGE_PKARM_CODE_VERIFIER_V1";

/// Message a wallet signs to regenerate its verifier
pub const VERIFIER_MESSAGE: &str = "Lockbridge: derive my deposit code verifier";

/// Length of a recoverable secp256k1 signature (r | s | v)
pub const SIGNATURE_LEN: usize = 65;

/// Secret half of an identity binding
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeVerifier(#[serde(with = "felt_serde")] Felt);

impl CodeVerifier {
    pub fn from_felt(value: Felt) -> Self {
        Self(value)
    }

    pub fn as_felt(&self) -> Felt {
        self.0
    }

    pub fn to_hex(&self) -> String {
        felt_to_hex(&self.0)
    }
}

impl std::fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CodeVerifier(..)")
    }
}

/// Derive the verifier from a 65-byte wallet signature
pub fn derive_verifier(signature: &[u8]) -> PkarmResult<CodeVerifier> {
    if signature.len() != SIGNATURE_LEN {
        return Err(PkarmError::InvalidSignatureLength {
            expected: SIGNATURE_LEN,
            actual: signature.len(),
        });
    }
    let digest = sha256_with_domain(VERIFIER_DOMAIN, signature);
    Ok(CodeVerifier(digest_to_felt(&digest)))
}

/// Sign [`VERIFIER_MESSAGE`] (EIP-191) and return `r | s | v`
pub fn sign_verifier_message(signing_key: &SigningKey) -> PkarmResult<[u8; SIGNATURE_LEN]> {
    let digest = eip191_hash_message(VERIFIER_MESSAGE);
    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(digest.as_slice())
        .map_err(|e| PkarmError::Signing(e.to_string()))?;

    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery_id.to_byte();
    Ok(out)
}

/// Parse a 32-byte hex secp256k1 secret key
pub fn signing_key_from_hex(value: &str) -> PkarmResult<SigningKey> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).map_err(|e| PkarmError::InvalidSigningKey(e.to_string()))?;
    SigningKey::from_slice(&bytes).map_err(|e| PkarmError::InvalidSigningKey(e.to_string()))
}

/// Sign the domain message with `signing_key` and derive the verifier
pub fn verifier_from_key(signing_key: &SigningKey) -> PkarmResult<CodeVerifier> {
    derive_verifier(&sign_verifier_message(signing_key)?)
}
