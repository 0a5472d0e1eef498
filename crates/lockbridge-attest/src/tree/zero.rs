//! Zero-hash sentinels
//!
//! Level 0 is the zero field element; level `k + 1` is `H(zero_k, zero_k)`.
//! A padded subtree of height `k` always folds to `zero_k`.

use std::sync::OnceLock;

use lockbridge_primitives::{hash_pair, Felt, FELT_ZERO};

use super::merkle::MAX_DEPTH;

static ZERO_HASHES: OnceLock<[Felt; MAX_DEPTH + 1]> = OnceLock::new();

/// Sentinels for levels `0..=MAX_DEPTH`, computed once per process
pub fn zero_hashes() -> &'static [Felt; MAX_DEPTH + 1] {
    ZERO_HASHES.get_or_init(|| {
        let mut zeros = [FELT_ZERO; MAX_DEPTH + 1];
        for level in 1..=MAX_DEPTH {
            zeros[level] = hash_pair(zeros[level - 1], zeros[level - 1]);
        }
        zeros
    })
}

/// Sentinel for one level; levels above `MAX_DEPTH` are clamped
#[inline]
pub fn zero_hash(level: usize) -> Felt {
    zero_hashes()[level.min(MAX_DEPTH)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_level_is_field_zero() {
        assert_eq!(zero_hash(0), FELT_ZERO);
    }

    #[test]
    fn test_levels_chain() {
        let zeros = zero_hashes();
        for level in 0..MAX_DEPTH {
            assert_eq!(zeros[level + 1], hash_pair(zeros[level], zeros[level]));
        }
    }
}
