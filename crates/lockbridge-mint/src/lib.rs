//! Lockbridge Mint Guard
//!
//! Exactly-once, cumulative mint accounting on the destination side. A mint
//! is admitted after the identity binding, the Merkle witness and the
//! committed root all check out, and is then recorded with a compare-and-set
//! on the recipient's ledger entry.

pub mod error;
pub mod guard;
pub mod ledger;

pub use error::{ErrorClass, MintError, MintResult};
pub use guard::{MintGuard, MintReceipt, MintRequest};
pub use ledger::{InMemoryLedger, MintLedger, MintLedgerEntry};
