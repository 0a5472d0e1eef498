//! Persisted deposit state
//!
//! One JSON file per in-flight deposit, named `{address}-{challenge}.json`,
//! holding what is needed to resume after a restart: the deposit block, the
//! recipient, and once attested the witness and its batch window, which
//! together with the verifier make up the mint payload. The code verifier is
//! never written to disk.
//!
//! Writes go to a temp file in the cache directory and are renamed over the
//! entry, so a crash never leaves a half-written entry behind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use lockbridge_attest::{BatchWindow, SerializableWitness};
use lockbridge_pkarm::RecipientIdentity;
use lockbridge_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::proof::{AttestedDeposit, ProofService};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedDeposit {
    pub deposit_block_number: u64,
    pub source_address: Address,
    pub recipient: RecipientIdentity,
    pub code_challenge: B256,
    /// Base64 of the binary witness envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
    /// Batch window the witness was built for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<BatchWindow>,
}

impl CachedDeposit {
    pub fn new(
        deposit_block_number: u64,
        source_address: Address,
        recipient: RecipientIdentity,
        code_challenge: B256,
    ) -> Self {
        Self {
            deposit_block_number,
            source_address,
            recipient,
            code_challenge,
            attestation: None,
            window: None,
        }
    }

    pub fn set_attestation(&mut self, attested: &AttestedDeposit) -> Result<()> {
        let bytes = SerializableWitness::new(attested.witness.clone()).to_bytes()?;
        self.attestation = Some(base64::engine::general_purpose::STANDARD.encode(bytes));
        self.window = Some(attested.window);
        Ok(())
    }

    /// Cached witness and window, `None` until both were stored
    pub fn attestation(&self) -> Result<Option<AttestedDeposit>> {
        let (Some(encoded), Some(window)) = (&self.attestation, self.window) else {
            return Ok(None);
        };
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        Ok(Some(AttestedDeposit {
            window,
            witness: SerializableWitness::from_bytes(&bytes)?.witness,
        }))
    }

    pub fn key(&self) -> String {
        cache_key(self.source_address, self.code_challenge)
    }
}

fn cache_key(address: Address, challenge: B256) -> String {
    format!(
        "{}-{}",
        hex::encode(address.as_slice()),
        hex::encode(challenge.as_slice())
    )
}

#[derive(Debug, Clone)]
pub struct DepositCache {
    dir: PathBuf,
}

impl DepositCache {
    /// Open (creating if needed) a cache rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn store(&self, entry: &CachedDeposit) -> Result<PathBuf> {
        let path = self.path_for(&entry.key());
        let json = serde_json::to_vec_pretty(entry)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| ClientError::Io(e.error))?;

        debug!(path = %path.display(), "deposit cached");
        Ok(path)
    }

    pub fn load(&self, address: Address, challenge: B256) -> Result<Option<CachedDeposit>> {
        let path = self.path_for(&cache_key(address, challenge));
        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| ClientError::Cache(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Resume the cached entry for `fresh`'s key, or start tracking `fresh`.
    ///
    /// An entry for a different deposit block belongs to an earlier lock
    /// under the same key; its attestation is stale, so it is replaced.
    pub fn resume(&self, fresh: CachedDeposit) -> Result<CachedDeposit> {
        match self.load(fresh.source_address, fresh.code_challenge)? {
            Some(cached) if cached.deposit_block_number == fresh.deposit_block_number => {
                info!(
                    block = cached.deposit_block_number,
                    attested = cached.window.is_some(),
                    "resuming cached deposit"
                );
                Ok(cached)
            }
            _ => {
                self.store(&fresh)?;
                Ok(fresh)
            }
        }
    }

    /// Attestation for `entry`, built through `proofs` only when none is cached
    pub async fn attest<P: ProofService + ?Sized>(
        &self,
        proofs: &P,
        entry: &mut CachedDeposit,
    ) -> Result<AttestedDeposit> {
        if let Some(attested) = entry.attestation()? {
            debug!(block = entry.deposit_block_number, "using cached attestation");
            return Ok(attested);
        }
        let attested = proofs
            .attest(
                entry.deposit_block_number,
                entry.source_address,
                entry.code_challenge,
            )
            .await?;
        entry.set_attestation(&attested)?;
        self.store(entry)?;
        Ok(attested)
    }

    /// Returns whether an entry was removed
    pub fn remove(&self, address: Address, challenge: B256) -> Result<bool> {
        match fs::remove_file(self.path_for(&cache_key(address, challenge))) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// All cached deposits, ordered by deposit block
    pub fn list(&self) -> Result<Vec<CachedDeposit>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path)?;
            let entry: CachedDeposit = serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::Cache(format!("{}: {}", path.display(), e)))?;
            entries.push(entry);
        }
        entries.sort_by_key(|e| e.deposit_block_number);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lockbridge_attest::{BatchAttestation, CommittedRoot, DepositMerkleTree};
    use lockbridge_primitives::{DepositRecord, U256};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(block: u64, seed: u8) -> CachedDeposit {
        CachedDeposit::new(
            block,
            Address::with_last_byte(seed),
            RecipientIdentity::new([seed; 32]),
            B256::with_last_byte(seed),
        )
    }

    #[test]
    fn test_store_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DepositCache::open(dir.path().join("deposits")).unwrap();

        let deposit = entry(150, 1);
        cache.store(&deposit).unwrap();
        assert_eq!(
            cache
                .load(deposit.source_address, deposit.code_challenge)
                .unwrap(),
            Some(deposit.clone())
        );

        assert!(cache
            .remove(deposit.source_address, deposit.code_challenge)
            .unwrap());
        assert!(!cache
            .remove(deposit.source_address, deposit.code_challenge)
            .unwrap());
        assert_eq!(
            cache
                .load(deposit.source_address, deposit.code_challenge)
                .unwrap(),
            None
        );
    }

    fn records() -> Vec<DepositRecord> {
        vec![
            DepositRecord::new(
                Address::with_last_byte(1),
                B256::with_last_byte(1),
                U256::from(1_000_000u64),
            ),
            DepositRecord::new(
                Address::with_last_byte(2),
                B256::with_last_byte(2),
                U256::from(2_000_000u64),
            ),
        ]
    }

    fn batch() -> BatchAttestation {
        let root = DepositMerkleTree::from_records(records()).unwrap().root();
        BatchAttestation::new(BatchWindow::new(120, 180), records(), CommittedRoot::new(root))
    }

    /// Serves one fixed batch and counts how often it was asked
    struct CountingProofs {
        batch: BatchAttestation,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProofService for CountingProofs {
        async fn batch_for_block(&self, _block: u64) -> Result<BatchAttestation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.batch.clone())
        }
    }

    #[test]
    fn test_store_overwrites_and_keeps_attestation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DepositCache::open(dir.path()).unwrap();

        let tree = DepositMerkleTree::from_records(records()).unwrap();
        let attested = AttestedDeposit {
            window: BatchWindow::new(120, 180),
            witness: tree.witness(0).unwrap(),
        };

        let mut deposit = entry(150, 1);
        cache.store(&deposit).unwrap();
        assert_eq!(deposit.attestation().unwrap(), None);
        deposit.set_attestation(&attested).unwrap();
        cache.store(&deposit).unwrap();

        let loaded = cache
            .load(deposit.source_address, deposit.code_challenge)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.attestation().unwrap(), Some(attested));
        assert_eq!(cache.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_restart_resumes_without_reattesting() {
        let dir = tempfile::tempdir().unwrap();
        let proofs = CountingProofs {
            batch: batch(),
            calls: AtomicUsize::new(0),
        };

        let attested = {
            let cache = DepositCache::open(dir.path()).unwrap();
            let mut deposit = cache.resume(entry(150, 1)).unwrap();
            assert_eq!(deposit.window, None);
            cache.attest(&proofs, &mut deposit).await.unwrap()
        };
        assert_eq!(proofs.calls.load(Ordering::SeqCst), 1);

        // Fresh process, same directory
        let cache = DepositCache::open(dir.path()).unwrap();
        let mut resumed = cache.resume(entry(150, 1)).unwrap();
        assert_eq!(resumed.window, Some(BatchWindow::new(120, 180)));

        let again = cache.attest(&proofs, &mut resumed).await.unwrap();
        assert_eq!(again, attested);
        assert_eq!(again.witness.verify().unwrap(), batch().committed_root.root());
        assert_eq!(proofs.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resume_replaces_entry_for_other_block() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DepositCache::open(dir.path()).unwrap();
        let proofs = CountingProofs {
            batch: batch(),
            calls: AtomicUsize::new(0),
        };

        let mut first = cache.resume(entry(150, 1)).unwrap();
        cache.attest(&proofs, &mut first).await.unwrap();

        // A later top-up under the same key starts over
        let later = cache.resume(entry(260, 1)).unwrap();
        assert_eq!(later.deposit_block_number, 260);
        assert_eq!(later.attestation().unwrap(), None);
        assert_eq!(
            cache
                .load(later.source_address, later.code_challenge)
                .unwrap(),
            Some(later)
        );
    }

    #[test]
    fn test_list_sorted_by_block() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DepositCache::open(dir.path()).unwrap();
        cache.store(&entry(300, 3)).unwrap();
        cache.store(&entry(100, 1)).unwrap();
        cache.store(&entry(200, 2)).unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let blocks: Vec<u64> = cache
            .list()
            .unwrap()
            .iter()
            .map(|e| e.deposit_block_number)
            .collect();
        assert_eq!(blocks, vec![100, 200, 300]);
    }

    #[test]
    fn test_corrupt_entry_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DepositCache::open(dir.path()).unwrap();
        let deposit = entry(150, 1);
        fs::write(
            dir.path().join(format!("{}.json", deposit.key())),
            b"{not json",
        )
        .unwrap();
        assert!(matches!(
            cache.load(deposit.source_address, deposit.code_challenge),
            Err(ClientError::Cache(_))
        ));
    }
}
