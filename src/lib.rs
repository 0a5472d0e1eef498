//! Lockbridge - coordination layer for a lock-and-mint bridge
//!
//! Depositors lock funds on the source chain under a code challenge that binds
//! the deposit to one destination-chain recipient. Once the bridge commits the
//! batch containing the deposit, the depositor proves inclusion with a Merkle
//! witness and mints exactly the not-yet-minted part of their locked total.
//!
//! # Crates
//!
//! - `lockbridge-primitives`: BN254 field, Poseidon, deposit records and leaf packing
//! - `lockbridge-attest`: batch Merkle tree, witnesses, committed roots
//! - `lockbridge-pkarm`: code verifier/challenge identity binding and the lock contract
//! - `lockbridge-readiness`: deposit readiness state machine, feed hub and tracker
//! - `lockbridge-mint`: exactly-once cumulative mint accounting
//! - `lockbridge-client`: bridge API client, feed pollers and deposit cache
//!
//! # Example
//!
//! ```no_run
//! use lockbridge::attest::{BatchAttestation, BatchWindow, CommittedRoot, DepositMerkleTree};
//! use lockbridge::pkarm::{derive_challenge, derive_verifier, RecipientIdentity};
//! use lockbridge::primitives::{Address, DepositRecord, U256};
//!
//! let verifier = derive_verifier(&[7u8; 65]).unwrap();
//! let recipient = RecipientIdentity::new([1u8; 32]);
//! let challenge = derive_challenge(&verifier, &recipient).to_b256();
//!
//! let records = vec![DepositRecord::new(Address::ZERO, challenge, U256::from(1_000_000u64))];
//! let root = DepositMerkleTree::from_records(records.clone()).unwrap().root();
//! let batch = BatchAttestation::new(BatchWindow::new(1, 10), records, CommittedRoot::new(root));
//! let witness = batch.attest(Address::ZERO, challenge).unwrap();
//! ```

// Re-export sub-crates
pub use lockbridge_primitives as primitives;
pub use lockbridge_attest as attest;
pub use lockbridge_pkarm as pkarm;
pub use lockbridge_readiness as readiness;
pub use lockbridge_mint as mint;
pub use lockbridge_client as client;
