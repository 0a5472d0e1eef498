//! Fuzz target for witness verification
//!
//! Builds a real batch from fuzzed records, then applies a fuzzed mutation to
//! one witness. Verification must accept the untouched witness and must never
//! accept a mutated one.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lockbridge_attest::{DepositMerkleTree, MAX_DEPTH};
use lockbridge_primitives::{felt_from_u64, DepositRecord, DEPOSIT_RECORD_LEN};

#[derive(Debug, Arbitrary)]
enum Mutation {
    None,
    FlipRecordByte { byte: u8, mask: u8 },
    ReplaceSibling { level: u8, value: u64 },
    ShiftIndex { delta: u64 },
    ToggleDummy { level: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    records: Vec<[u8; DEPOSIT_RECORD_LEN]>,
    leaf: u16,
    mutation: Mutation,
}

fuzz_target!(|input: Input| {
    if input.records.is_empty() || input.records.len() > 64 {
        return;
    }
    let records: Vec<DepositRecord> = input
        .records
        .iter()
        .map(DepositRecord::from_bytes)
        .collect();
    let tree = match DepositMerkleTree::from_records(records) {
        Ok(tree) => tree,
        Err(_) => return,
    };
    let index = input.leaf as usize % tree.num_leaves();
    let original = tree.witness(index).unwrap().pad_to(MAX_DEPTH);
    assert_eq!(original.verify().unwrap(), tree.root());

    let mut witness = original.clone();
    match input.mutation {
        Mutation::None => return,
        Mutation::FlipRecordByte { byte, mask } => {
            let mut bytes = witness.leaf_value.to_bytes();
            bytes[byte as usize % DEPOSIT_RECORD_LEN] ^= mask;
            witness.leaf_value = DepositRecord::from_bytes(&bytes);
        }
        Mutation::ReplaceSibling { level, value } => {
            // dummy siblings are never read
            let depth = tree.depth();
            if depth == 0 {
                return;
            }
            witness.path[level as usize % depth].sibling = felt_from_u64(value);
        }
        Mutation::ShiftIndex { delta } => {
            witness.leaf_index = witness.leaf_index.wrapping_add(delta);
        }
        Mutation::ToggleDummy { level } => {
            let level = level as usize % MAX_DEPTH;
            witness.path[level].is_dummy = !witness.path[level].is_dummy;
        }
    }

    if witness != original {
        assert!(witness.verify().is_err(), "mutated witness accepted: {:?}", witness);
    }
});
