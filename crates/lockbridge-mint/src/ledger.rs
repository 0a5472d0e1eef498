//! Mint ledger
//!
//! Destination-side state: one entry per recipient, created by storage setup,
//! plus the batch roots relayed from source-chain consensus. The only mutation
//! of an entry is a compare-and-set of `minted_so_far`, which serializes
//! concurrent mints. A committed root is write-once per batch window.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use lockbridge_attest::{BatchWindow, CommittedRoot};
use lockbridge_pkarm::RecipientIdentity;
use lockbridge_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{MintError, MintResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintLedgerEntry {
    pub recipient: RecipientIdentity,
    pub minted_so_far: U256,
}

/// Destination-chain mint accounting storage
pub trait MintLedger: Send + Sync {
    /// Create the recipient's entry; a no-op if it already exists
    fn setup(&self, recipient: &RecipientIdentity) -> MintResult<()>;

    /// Minted total, `None` if storage was never set up
    fn minted(&self, recipient: &RecipientIdentity) -> MintResult<Option<U256>>;

    /// Set `minted_so_far` to `new` only if it still equals `expected`
    fn compare_and_set(
        &self,
        recipient: &RecipientIdentity,
        expected: U256,
        new: U256,
    ) -> MintResult<bool>;

    /// Record the consensus root for `window`; re-committing the same root is a no-op
    fn commit_root(&self, window: BatchWindow, root: CommittedRoot) -> MintResult<()>;

    /// Root committed for `window`, `None` if it was never relayed
    fn committed_root(&self, window: &BatchWindow) -> MintResult<Option<CommittedRoot>>;
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<HashMap<RecipientIdentity, MintLedgerEntry>>,
    roots: Mutex<HashMap<BatchWindow, CommittedRoot>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, recipient: &RecipientIdentity) -> MintResult<Option<MintLedgerEntry>> {
        Ok(self.lock()?.get(recipient).copied())
    }

    fn lock(&self) -> MintResult<MutexGuard<'_, HashMap<RecipientIdentity, MintLedgerEntry>>> {
        self.entries
            .lock()
            .map_err(|_| MintError::Ledger("ledger mutex poisoned".to_string()))
    }

    fn lock_roots(&self) -> MintResult<MutexGuard<'_, HashMap<BatchWindow, CommittedRoot>>> {
        self.roots
            .lock()
            .map_err(|_| MintError::Ledger("root registry mutex poisoned".to_string()))
    }
}

impl MintLedger for InMemoryLedger {
    fn setup(&self, recipient: &RecipientIdentity) -> MintResult<()> {
        self.lock()?.entry(*recipient).or_insert(MintLedgerEntry {
            recipient: *recipient,
            minted_so_far: U256::ZERO,
        });
        Ok(())
    }

    fn minted(&self, recipient: &RecipientIdentity) -> MintResult<Option<U256>> {
        Ok(self.lock()?.get(recipient).map(|e| e.minted_so_far))
    }

    fn compare_and_set(
        &self,
        recipient: &RecipientIdentity,
        expected: U256,
        new: U256,
    ) -> MintResult<bool> {
        let mut entries = self.lock()?;
        let entry = entries
            .get_mut(recipient)
            .ok_or_else(|| MintError::StorageNotSetup(recipient.to_string()))?;
        if entry.minted_so_far != expected {
            return Ok(false);
        }
        entry.minted_so_far = new;
        Ok(true)
    }

    fn commit_root(&self, window: BatchWindow, root: CommittedRoot) -> MintResult<()> {
        let mut roots = self.lock_roots()?;
        match roots.get(&window) {
            Some(existing) if *existing != root => Err(MintError::RootConflict {
                input: window.input_block_number,
                output: window.output_block_number,
            }),
            Some(_) => Ok(()),
            None => {
                roots.insert(window, root);
                Ok(())
            }
        }
    }

    fn committed_root(&self, window: &BatchWindow) -> MintResult<Option<CommittedRoot>> {
        Ok(self.lock_roots()?.get(window).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbridge_primitives::felt_from_u64;

    #[test]
    fn test_setup_is_idempotent() {
        let ledger = InMemoryLedger::new();
        let recipient = RecipientIdentity::new([1u8; 32]);
        assert_eq!(ledger.minted(&recipient).unwrap(), None);

        ledger.setup(&recipient).unwrap();
        assert!(ledger
            .compare_and_set(&recipient, U256::ZERO, U256::from(10u64))
            .unwrap());
        ledger.setup(&recipient).unwrap();
        assert_eq!(ledger.minted(&recipient).unwrap(), Some(U256::from(10u64)));
    }

    #[test]
    fn test_compare_and_set_rejects_stale_expected() {
        let ledger = InMemoryLedger::new();
        let recipient = RecipientIdentity::new([2u8; 32]);
        ledger.setup(&recipient).unwrap();

        assert!(ledger
            .compare_and_set(&recipient, U256::ZERO, U256::from(5u64))
            .unwrap());
        assert!(!ledger
            .compare_and_set(&recipient, U256::ZERO, U256::from(7u64))
            .unwrap());
        assert_eq!(
            ledger.entry(&recipient).unwrap().map(|e| e.minted_so_far),
            Some(U256::from(5u64))
        );
    }

    #[test]
    fn test_committed_root_is_write_once() {
        let ledger = InMemoryLedger::new();
        let window = BatchWindow::new(120, 180);
        let root = CommittedRoot::new(felt_from_u64(7));
        assert_eq!(ledger.committed_root(&window).unwrap(), None);

        ledger.commit_root(window, root).unwrap();
        ledger.commit_root(window, root).unwrap();
        assert!(matches!(
            ledger.commit_root(window, CommittedRoot::new(felt_from_u64(8))),
            Err(MintError::RootConflict {
                input: 120,
                output: 180
            })
        ));
        assert_eq!(ledger.committed_root(&window).unwrap(), Some(root));
        assert_eq!(
            ledger
                .committed_root(&BatchWindow::new(181, 240))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_compare_and_set_without_setup() {
        let ledger = InMemoryLedger::new();
        let recipient = RecipientIdentity::new([3u8; 32]);
        assert!(matches!(
            ledger.compare_and_set(&recipient, U256::ZERO, U256::from(1u64)),
            Err(MintError::StorageNotSetup(_))
        ));
    }
}
