//! The accrual ledger: per-account principal, rate and accrual clock kept in
//! an injected store.

use accrue_store::{LedgerStore, StoreError};
use accrue_types::{AccountId, Rate, Timestamp, PRECISION};

use crate::account::{Account, AccountState};
use crate::error::LedgerError;

/// Owns the account store and answers balance queries against it.
///
/// Mutations write a whole batch of staged accounts atomically and are only
/// reachable through the coordinator, never by writing records directly:
///
/// ```compile_fail
/// use accrue_ledger::{Account, AccrualLedger};
/// use accrue_store::MemoryStore;
/// use accrue_types::{AccountId, Rate, Timestamp};
///
/// let mut ledger = AccrualLedger::new(MemoryStore::new());
/// let account = Account::open(Rate::new(1), Timestamp::new(0));
/// ledger.commit(&[(&AccountId::new("a"), &account)]).unwrap();
/// ```
pub struct AccrualLedger<S> {
    store: S,
}

impl<S: LedgerStore> AccrualLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Load an account's lifecycle state.
    pub fn account_state(&self, id: &AccountId) -> Result<AccountState, LedgerError> {
        match self.store.get_account(id)? {
            None => Ok(AccountState::Unopened),
            Some(bytes) => Ok(AccountState::Active(decode_account(&bytes)?)),
        }
    }

    /// `PRECISION + rate × (now − last_accrual)`; exactly `PRECISION` for an
    /// unopened account.
    pub fn accrued_factor(&self, id: &AccountId, now: Timestamp) -> Result<u128, LedgerError> {
        match self.account_state(id)? {
            AccountState::Unopened => Ok(PRECISION),
            AccountState::Active(account) => account.accrued_factor(now),
        }
    }

    /// Displayed balance: principal plus interest pending at `now`.
    pub fn current_balance(&self, id: &AccountId, now: Timestamp) -> Result<u64, LedgerError> {
        match self.account_state(id)? {
            AccountState::Unopened => Ok(0),
            AccountState::Active(account) => account.balance_at(now),
        }
    }

    /// Principal without pending interest.
    pub fn raw_principal(&self, id: &AccountId) -> Result<u64, LedgerError> {
        Ok(self.account_state(id)?.principal())
    }

    /// The account's captured rate, or `None` if it was never funded.
    pub fn rate_of(&self, id: &AccountId) -> Result<Option<Rate>, LedgerError> {
        Ok(self.account_state(id)?.rate())
    }

    /// Fold pending interest into principal and persist it.
    ///
    /// Unopened accounts realize nothing and stay unopened. Returns the delta.
    pub fn realize_interest(&mut self, id: &AccountId, now: Timestamp) -> Result<u64, LedgerError> {
        let mut account = match self.account_state(id)? {
            AccountState::Unopened => return Ok(0),
            AccountState::Active(account) => account,
        };
        let delta = account.realize(now)?;
        self.commit(&[(id, &account)])?;
        tracing::debug!(account = %id, delta, principal = account.principal, "realized interest");
        Ok(delta)
    }

    /// Write every staged account or none of them.
    pub(crate) fn commit(&mut self, staged: &[(&AccountId, &Account)]) -> Result<(), LedgerError> {
        let batch = staged
            .iter()
            .map(|(id, account)| Ok(((*id).clone(), encode_account(account)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        self.store.write_accounts(&batch)?;
        Ok(())
    }

    /// Every opened account, ordered by id.
    pub fn accounts(&self) -> Result<Vec<(AccountId, Account)>, LedgerError> {
        self.store
            .iter_accounts()?
            .into_iter()
            .map(|(id, bytes)| Ok((id, decode_account(&bytes)?)))
            .collect()
    }

    pub fn account_count(&self) -> Result<u64, LedgerError> {
        Ok(self.store.account_count()?)
    }
}

fn encode_account(account: &Account) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(account).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_account(bytes: &[u8]) -> Result<Account, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corruption(e.to_string()))
}
