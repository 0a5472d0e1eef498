//! Code challenge derivation and validation
//!
//! `challenge = H(verifier, recipient_lo, recipient_hi)` where the 32-byte
//! recipient is split into its first 31 bytes (little-endian) and its last
//! byte, so the recipient mapping is injective. The challenge is published as
//! the canonical little-endian bytes of the field element and is what a
//! deposit record carries as its attestation hash.

use alloy_primitives::B256;
use lockbridge_primitives::{
    felt_from_le_bytes, felt_from_le_slice, felt_from_u64, felt_to_le_bytes, poseidon_hash, Felt,
};
use serde::{Deserialize, Serialize};

use crate::error::{PkarmError, PkarmResult};
use crate::verifier::CodeVerifier;

/// Destination-chain recipient (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientIdentity(pub B256);

impl RecipientIdentity {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(B256::from(bytes))
    }

    pub fn from_hex(value: &str) -> PkarmResult<Self> {
        value
            .parse::<B256>()
            .map(Self)
            .map_err(|e| PkarmError::InvalidRecipient(format!("{value}: {e}")))
    }

    /// Field encoding: (first 31 bytes little-endian, last byte)
    pub fn to_fields(&self) -> [Felt; 2] {
        [
            felt_from_le_slice(&self.0[..31]),
            felt_from_u64(self.0[31] as u64),
        ]
    }
}

impl std::fmt::Display for RecipientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public half of an identity binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeChallenge(Felt);

impl CodeChallenge {
    pub fn as_felt(&self) -> Felt {
        self.0
    }

    pub fn to_b256(&self) -> B256 {
        B256::from(felt_to_le_bytes(&self.0))
    }

    pub fn from_b256(value: B256) -> PkarmResult<Self> {
        felt_from_le_bytes(&value.0)
            .map(Self)
            .map_err(|e| PkarmError::InvalidChallenge(e.to_string()))
    }
}

impl From<CodeChallenge> for B256 {
    fn from(value: CodeChallenge) -> Self {
        value.to_b256()
    }
}

/// Commit the verifier to one recipient
pub fn derive_challenge(verifier: &CodeVerifier, recipient: &RecipientIdentity) -> CodeChallenge {
    let [lo, hi] = recipient.to_fields();
    CodeChallenge(poseidon_hash([verifier.as_felt(), lo, hi]))
}

/// True when `challenge` was derived from (verifier, recipient)
pub fn verify_challenge(
    verifier: &CodeVerifier,
    recipient: &RecipientIdentity,
    challenge: B256,
) -> bool {
    derive_challenge(verifier, recipient).to_b256() == challenge
}

/// Like [`verify_challenge`], failing with the expected value on mismatch
pub fn ensure_challenge(
    verifier: &CodeVerifier,
    recipient: &RecipientIdentity,
    challenge: B256,
) -> PkarmResult<()> {
    let expected = derive_challenge(verifier, recipient).to_b256();
    if expected != challenge {
        return Err(PkarmError::ChallengeMismatch {
            expected: expected.to_string(),
            actual: challenge.to_string(),
        });
    }
    Ok(())
}

/// Verifier, challenge and recipient held together by the depositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityBinding {
    pub code_verifier: CodeVerifier,
    pub code_challenge: B256,
    pub recipient: RecipientIdentity,
}

impl IdentityBinding {
    pub fn new(code_verifier: CodeVerifier, recipient: RecipientIdentity) -> Self {
        Self {
            code_verifier,
            code_challenge: derive_challenge(&code_verifier, &recipient).to_b256(),
            recipient,
        }
    }

    pub fn verify(&self) -> bool {
        verify_challenge(&self.code_verifier, &self.recipient, self.code_challenge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::derive_verifier;

    fn test_verifier(seed: u8) -> CodeVerifier {
        derive_verifier(&[seed; 65]).unwrap()
    }

    #[test]
    fn test_challenge_deterministic() {
        let verifier = test_verifier(1);
        let recipient = RecipientIdentity::new([9u8; 32]);
        assert_eq!(
            derive_challenge(&verifier, &recipient),
            derive_challenge(&verifier, &recipient)
        );
    }

    #[test]
    fn test_challenge_unique_per_pair() {
        let recipient_a = RecipientIdentity::new([9u8; 32]);
        let mut bytes = [9u8; 32];
        bytes[31] = 10;
        let recipient_b = RecipientIdentity::new(bytes);

        let v1 = test_verifier(1);
        let v2 = test_verifier(2);

        let c1a = derive_challenge(&v1, &recipient_a);
        assert_ne!(c1a, derive_challenge(&v1, &recipient_b));
        assert_ne!(c1a, derive_challenge(&v2, &recipient_a));
    }

    #[test]
    fn test_verify_challenge() {
        let verifier = test_verifier(3);
        let recipient = RecipientIdentity::new([4u8; 32]);
        let challenge = derive_challenge(&verifier, &recipient).to_b256();

        assert!(verify_challenge(&verifier, &recipient, challenge));
        assert!(!verify_challenge(&test_verifier(4), &recipient, challenge));
        assert!(matches!(
            ensure_challenge(&verifier, &RecipientIdentity::new([5u8; 32]), challenge),
            Err(PkarmError::ChallengeMismatch { .. })
        ));
    }

    #[test]
    fn test_challenge_b256_roundtrip() {
        let challenge = derive_challenge(&test_verifier(5), &RecipientIdentity::new([1u8; 32]));
        let bytes = challenge.to_b256();
        assert_eq!(CodeChallenge::from_b256(bytes).unwrap(), challenge);
        assert!(CodeChallenge::from_b256(B256::repeat_byte(0xff)).is_err());
    }

    #[test]
    fn test_recipient_from_hex() {
        let hex = format!("0x{}", "ab".repeat(32));
        let recipient = RecipientIdentity::from_hex(&hex).unwrap();
        assert_eq!(recipient.0, B256::repeat_byte(0xab));
        assert!(RecipientIdentity::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_binding_verifies() {
        let binding = IdentityBinding::new(test_verifier(6), RecipientIdentity::new([2u8; 32]));
        assert!(binding.verify());

        let json = serde_json::to_value(binding).unwrap();
        assert!(json.get("codeChallenge").is_some());
    }
}
