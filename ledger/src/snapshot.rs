//! Ledger snapshots: capture every opened account and the global rate at a
//! point in time.
//!
//! Snapshots are how a ledger instance is persisted between process runs and
//! moved between stores. The hash is computed deterministically from the
//! ledger state so a tampered or truncated file is detected on load.

use accrue_store::{LedgerStore, MemoryStore};
use accrue_types::{AccountId, LedgerParams, Rate, Timestamp};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::Account;
use crate::accrual::AccrualLedger;
use crate::coordinator::{encode_rate, TransferCoordinator, GLOBAL_RATE_KEY};
use crate::error::LedgerError;

/// Format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding error: {0}")]
    Encoding(String),

    #[error("snapshot hash mismatch")]
    HashMismatch,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("cannot restore into a store that already holds {0} accounts")]
    StoreNotEmpty(u64),
}

/// A ledger snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 over the global rate and account entries.
    pub hash: [u8; 32],
    pub version: u32,
    /// When the snapshot was taken. Not covered by the hash.
    pub taken_at: Timestamp,
    pub global_rate: Rate,
    /// Account entries ordered by id.
    pub accounts: Vec<AccountSnapshot>,
}

/// The stored state of a single account, without pending interest applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub principal: u64,
    pub rate: Rate,
    pub last_accrual: Timestamp,
    pub opened_at: Timestamp,
}

impl AccountSnapshot {
    fn from_account(id: AccountId, account: Account) -> Self {
        Self {
            id,
            principal: account.principal,
            rate: account.rate,
            last_accrual: account.last_accrual,
            opened_at: account.opened_at,
        }
    }

    fn to_account(&self) -> Account {
        Account {
            principal: self.principal,
            rate: self.rate,
            last_accrual: self.last_accrual,
            opened_at: self.opened_at,
        }
    }
}

impl LedgerSnapshot {
    pub fn create(global_rate: Rate, accounts: Vec<AccountSnapshot>, taken_at: Timestamp) -> Self {
        let mut snap = Self {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            taken_at,
            global_rate,
            accounts,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.global_rate.raw().to_le_bytes());
        for account in &self.accounts {
            let id = account.id.as_str().as_bytes();
            hasher.update((id.len() as u64).to_le_bytes());
            hasher.update(id);
            hasher.update(account.principal.to_le_bytes());
            hasher.update(account.rate.raw().to_le_bytes());
            hasher.update(account.last_accrual.as_secs().to_le_bytes());
            hasher.update(account.opened_at.as_secs().to_le_bytes());
        }

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches the ledger data.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    fn check(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        if !self.verify() {
            return Err(SnapshotError::HashMismatch);
        }
        Ok(())
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encoding(e.to_string()))
    }

    /// Decode and verify a binary snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snap: Self =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::Encoding(e.to_string()))?;
        snap.check()?;
        Ok(snap)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Encoding(e.to_string()))
    }

    /// Decode and verify a JSON snapshot.
    pub fn from_json(s: &str) -> Result<Self, SnapshotError> {
        let snap: Self =
            serde_json::from_str(s).map_err(|e| SnapshotError::Encoding(e.to_string()))?;
        snap.check()?;
        Ok(snap)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl<S: LedgerStore> TransferCoordinator<S> {
    /// Capture the stored state of every account. Pending interest is not
    /// realized; it is recomputed from `last_accrual` after restore.
    pub fn snapshot(&self, taken_at: Timestamp) -> Result<LedgerSnapshot, LedgerError> {
        let accounts = self
            .ledger()
            .accounts()?
            .into_iter()
            .map(|(id, account)| AccountSnapshot::from_account(id, account))
            .collect();
        Ok(LedgerSnapshot::create(self.global_rate(), accounts, taken_at))
    }

    /// Load a verified snapshot into an empty `store` and open a ledger over it.
    ///
    /// The global rate is written before the accounts. A restore that fails
    /// part-way leaves at most the rate behind, and the store can still be
    /// restored into afterwards.
    pub fn restore(store: S, snapshot: &LedgerSnapshot) -> Result<Self, LedgerError> {
        snapshot.check()?;

        let mut ledger = AccrualLedger::new(store);
        let existing = ledger.account_count()?;
        if existing != 0 {
            return Err(SnapshotError::StoreNotEmpty(existing).into());
        }

        ledger
            .store_mut()
            .put_meta(GLOBAL_RATE_KEY, &encode_rate(snapshot.global_rate)?)?;
        let accounts: Vec<(AccountId, Account)> = snapshot
            .accounts
            .iter()
            .map(|entry| (entry.id.clone(), entry.to_account()))
            .collect();
        let staged: Vec<_> = accounts.iter().map(|(id, account)| (id, account)).collect();
        ledger.commit(&staged)?;

        tracing::info!(
            accounts = snapshot.account_count(),
            global_rate = %snapshot.global_rate,
            hash = %snapshot.hash_hex(),
            "restored ledger snapshot"
        );
        Self::open(
            ledger.into_store(),
            &LedgerParams::with_initial_rate(snapshot.global_rate),
        )
    }
}

impl TransferCoordinator<MemoryStore> {
    /// Restore a snapshot into a fresh in-memory store.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, LedgerError> {
        Self::restore(MemoryStore::new(), snapshot)
    }
}
