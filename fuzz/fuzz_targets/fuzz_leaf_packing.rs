//! Fuzz target for deposit leaf packing
//!
//! This target ensures:
//! 1. Packing never panics and every packed buffer is a canonical field element
//! 2. The record byte encoding round-trips
//! 3. Leaf hashing is deterministic

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockbridge_primitives::{felt_from_le_bytes, DepositRecord, DEPOSIT_RECORD_LEN};

fuzz_target!(|data: [u8; DEPOSIT_RECORD_LEN]| {
    let record = DepositRecord::from_bytes(&data);
    assert_eq!(record.to_bytes(), data);

    let packed = record.pack();
    for buffer in [packed.a, packed.b, packed.c] {
        // 31 data bytes at most, so the top byte is always zero
        assert_eq!(buffer[31], 0);
        assert!(felt_from_le_bytes(&buffer).is_ok());
    }

    assert_eq!(record.leaf_hash(), record.leaf_hash());
});
