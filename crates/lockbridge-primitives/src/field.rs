//! Field arithmetic over the BN254 scalar field
//!
//! The attestation circuit works natively over BN254 `Fr` (a ~254-bit prime field).
//! Byte strings are mapped into the field as little-endian integers; any 31-byte
//! value is always canonical, which is what the deposit packing relies on.

use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::{Field, PrimeField};

use crate::error::PrimitivesError;

/// The field element type used throughout lockbridge
pub type Felt = Fr;

/// Zero in the field
pub const FELT_ZERO: Felt = Fr::ZERO;

/// One in the field
pub const FELT_ONE: Felt = Fr::ONE;

/// Number of bytes that always fit below the modulus
pub const SAFE_BYTES: usize = 31;

/// Convert a u64 to a field element
#[inline]
pub fn felt_from_u64(value: u64) -> Felt {
    Fr::from(value)
}

/// Interpret 32 bytes as a little-endian integer.
///
/// Fails if the integer is not below the field modulus.
pub fn felt_from_le_bytes(bytes: &[u8; 32]) -> Result<Felt, PrimitivesError> {
    Option::from(Fr::from_repr(*bytes)).ok_or_else(|| {
        PrimitivesError::NonCanonicalField(format!("0x{}", hex::encode(bytes)))
    })
}

/// Interpret up to 31 bytes as a little-endian integer (always canonical).
pub fn felt_from_le_slice(bytes: &[u8]) -> Felt {
    let mut acc = FELT_ZERO;
    let base = Fr::from(256u64);
    for byte in bytes.iter().take(SAFE_BYTES).rev() {
        acc = acc * base + Fr::from(*byte as u64);
    }
    acc
}

/// Canonical 32-byte little-endian encoding of a field element
pub fn felt_to_le_bytes(felt: &Felt) -> [u8; 32] {
    let repr = felt.to_repr();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(repr.as_ref());
    bytes
}

/// Hex encoding (`0x` prefixed) of the canonical little-endian bytes
pub fn felt_to_hex(felt: &Felt) -> String {
    format!("0x{}", hex::encode(felt_to_le_bytes(felt)))
}

/// Parse a `0x` prefixed (or bare) hex string of 32 little-endian bytes
pub fn felt_from_hex(value: &str) -> Result<Felt, PrimitivesError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let decoded = hex::decode(stripped).map_err(|source| PrimitivesError::InvalidHex {
        field: "felt",
        source,
    })?;
    let bytes: [u8; 32] = decoded
        .as_slice()
        .try_into()
        .map_err(|_| PrimitivesError::InvalidLength {
            field: "felt",
            expected: 32,
            actual: decoded.len(),
        })?;
    felt_from_le_bytes(&bytes)
}

/// Serde adapter encoding field elements as hex strings
pub mod felt_serde {
    use super::{felt_from_hex, felt_to_hex, Felt};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(felt: &Felt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&felt_to_hex(felt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Felt, D::Error> {
        let s = String::deserialize(deserializer)?;
        felt_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_felt_from_le_slice_matches_repr() {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().take(31).enumerate() {
            *b = (i as u8).wrapping_mul(7).wrapping_add(3);
        }
        let from_slice = felt_from_le_slice(&bytes[..31]);
        let from_repr = felt_from_le_bytes(&bytes).unwrap();
        assert_eq!(from_slice, from_repr);
    }

    #[test]
    fn test_felt_byte_roundtrip() {
        let felt = felt_from_u64(0xdead_beef);
        let bytes = felt_to_le_bytes(&felt);
        assert_eq!(&bytes[..4], &[0xef, 0xbe, 0xad, 0xde]);
        assert_eq!(felt_from_le_bytes(&bytes).unwrap(), felt);
    }

    #[test]
    fn test_non_canonical_rejected() {
        let bytes = [0xffu8; 32];
        assert!(matches!(
            felt_from_le_bytes(&bytes),
            Err(PrimitivesError::NonCanonicalField(_))
        ));
    }

    #[test]
    fn test_hex_roundtrip_with_prefix() {
        let felt = felt_from_u64(42);
        let encoded = felt_to_hex(&felt);
        assert!(encoded.starts_with("0x2a00"));
        assert_eq!(felt_from_hex(&encoded).unwrap(), felt);
        assert_eq!(felt_from_hex(&encoded[2..]).unwrap(), felt);
    }

    #[test]
    fn test_hex_wrong_length() {
        let err = felt_from_hex("0xabcd").unwrap_err();
        assert!(matches!(
            err,
            PrimitivesError::InvalidLength { expected: 32, actual: 2, .. }
        ));
    }
}
