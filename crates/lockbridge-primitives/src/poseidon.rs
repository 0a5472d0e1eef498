//! Poseidon hash over BN254
//!
//! Parameterisation shared with the attestation circuit:
//! - Width: 6 field elements (rate 5, capacity 1)
//! - Rounds: 8 full, 57 partial
//! - S-box: x^5
//!
//! Inputs are fixed-length (`ConstantLength<L>`), so a 2-input node hash and a
//! 3-input leaf hash live in separate domains.

use halo2curves_axiom::bn256::Fr;
use halo2curves_axiom::ff::Field;
use poseidon_primitives::poseidon::primitives::{ConstantLength, Hash, Spec};

use crate::field::Felt;

/// State width (rate + capacity)
pub const POSEIDON_T: usize = 6;

/// Absorb rate
pub const POSEIDON_RATE: usize = 5;

/// Number of full rounds
pub const POSEIDON_FULL_ROUNDS: usize = 8;

/// Number of partial rounds
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;

#[derive(Clone, Copy, Debug)]
pub struct BridgePoseidonSpec;

impl Spec<Fr, POSEIDON_T, POSEIDON_RATE> for BridgePoseidonSpec {
    fn full_rounds() -> usize {
        POSEIDON_FULL_ROUNDS
    }

    fn partial_rounds() -> usize {
        POSEIDON_PARTIAL_ROUNDS
    }

    fn sbox(val: Fr) -> Fr {
        val.pow_vartime([5])
    }

    fn secure_mds() -> usize {
        0
    }
}

/// Hash a fixed number of field elements
pub fn poseidon_hash<const L: usize>(values: [Felt; L]) -> Felt {
    Hash::<Fr, BridgePoseidonSpec, ConstantLength<L>, POSEIDON_T, POSEIDON_RATE>::init()
        .hash(values)
}

/// Two-to-one compression used for Merkle nodes
#[inline]
pub fn hash_pair(left: Felt, right: Felt) -> Felt {
    poseidon_hash([left, right])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{felt_from_u64, FELT_ZERO};

    #[test]
    fn test_poseidon_deterministic() {
        let input = [felt_from_u64(1), felt_from_u64(2), felt_from_u64(3)];
        assert_eq!(poseidon_hash(input), poseidon_hash(input));
    }

    #[test]
    fn test_hash_pair_order_matters() {
        let a = felt_from_u64(7);
        let b = felt_from_u64(11);
        assert_ne!(hash_pair(a, b), hash_pair(b, a));
    }

    #[test]
    fn test_length_domains_differ() {
        let two = poseidon_hash([FELT_ZERO, FELT_ZERO]);
        let three = poseidon_hash([FELT_ZERO, FELT_ZERO, FELT_ZERO]);
        assert_ne!(two, three);
    }

    #[test]
    fn test_zero_input_is_not_zero_output() {
        assert_ne!(hash_pair(FELT_ZERO, FELT_ZERO), FELT_ZERO);
    }
}
