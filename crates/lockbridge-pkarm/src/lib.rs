//! Lockbridge Identity Binding (PKARM)
//!
//! Binds a source-chain deposit to exactly one destination-chain recipient:
//! - `derive_verifier`: secret code verifier from a wallet signature
//! - `derive_challenge`: public commitment to (verifier, recipient)
//! - `verify_challenge`: check a challenge against a claimed recipient
//! - `LockContract`: first-depositor binding and value accumulation

pub mod challenge;
pub mod contract;
pub mod error;
pub mod verifier;

pub use challenge::{
    derive_challenge, ensure_challenge, verify_challenge, CodeChallenge, IdentityBinding,
    RecipientIdentity,
};
pub use contract::{LockContract, LockEvent, LockParams};
pub use error::{PkarmError, PkarmResult};
pub use verifier::{
    derive_verifier, sign_verifier_message, signing_key_from_hex, verifier_from_key,
    CodeVerifier, SIGNATURE_LEN, VERIFIER_MESSAGE,
};

pub use k256::ecdsa::SigningKey;
