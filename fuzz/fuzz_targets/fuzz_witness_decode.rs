//! Fuzz target for binary witness decoding
//!
//! Arbitrary bytes must decode to an error or a witness that re-encodes to
//! the same bytes, and verifying a decoded witness must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockbridge_attest::SerializableWitness;

fuzz_target!(|data: &[u8]| {
    if let Ok(decoded) = SerializableWitness::from_bytes(data) {
        let encoded = decoded.to_bytes().expect("decoded witness re-encodes");
        assert_eq!(encoded, data);
        let _ = decoded.witness.verify();
    }
});
