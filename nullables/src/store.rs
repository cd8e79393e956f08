//! Nullable store: in-memory storage whose writes can be made to fail.

use accrue_store::{AccountStore, MemoryStore, MetaStore, StoreError};
use accrue_types::AccountId;
use std::cell::Cell;

/// An in-memory store for testing all-or-nothing behaviour.
///
/// While writes are failing, every write is rejected before anything is
/// stored. Reads always succeed.
#[derive(Default)]
pub struct NullStore {
    inner: MemoryStore,
    fail_writes: Cell<bool>,
    write_budget: Cell<Option<u64>>,
    writes: Cell<u64>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again). Clears any budget set
    /// by [`NullStore::fail_writes_after`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
        self.write_budget.set(None);
    }

    /// Let the next `successes` writes through, then fail every write after.
    pub fn fail_writes_after(&self, successes: u64) {
        self.fail_writes.set(false);
        self.write_budget.set(Some(successes));
    }

    /// Number of successful write calls (account batches and meta puts).
    pub fn write_count(&self) -> u64 {
        self.writes.get()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        match self.write_budget.get() {
            _ if self.fail_writes.get() => {
                return Err(StoreError::Backend("injected write failure".into()));
            }
            Some(0) => return Err(StoreError::Backend("write budget exhausted".into())),
            Some(left) => self.write_budget.set(Some(left - 1)),
            None => {}
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, id: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get_account(id)
    }

    fn write_accounts(&mut self, batch: &[(AccountId, Vec<u8>)]) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.write_accounts(batch)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        self.inner.account_count()
    }

    fn iter_accounts(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        self.inner.iter_accounts()
    }
}

impl MetaStore for NullStore {
    fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.put_meta(key, value)
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get_meta(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> (AccountId, Vec<u8>) {
        (AccountId::new(name), vec![1, 2, 3])
    }

    #[test]
    fn passes_through_when_healthy() {
        let mut store = NullStore::new();
        store.write_accounts(&[entry("a"), entry("b")]).unwrap();
        store.put_meta("k", b"v").unwrap();

        assert_eq!(store.account_count().unwrap(), 2);
        assert_eq!(store.get_meta("k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn failed_batch_stores_nothing() {
        let mut store = NullStore::new();
        store.fail_writes(true);

        assert!(store.write_accounts(&[entry("a")]).is_err());
        assert!(store.put_meta("k", b"v").is_err());
        assert_eq!(store.account_count().unwrap(), 0);
        assert_eq!(store.get_meta("k").unwrap(), None);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn budget_allows_exactly_n_writes() {
        let mut store = NullStore::new();
        store.fail_writes_after(1);

        store.write_accounts(&[entry("a")]).unwrap();
        assert!(store.put_meta("k", b"v").is_err());
        assert!(store.write_accounts(&[entry("b")]).is_err());
        assert_eq!(store.account_count().unwrap(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn recovers_after_failures_are_cleared() {
        let mut store = NullStore::new();
        store.fail_writes(true);
        assert!(store.write_accounts(&[entry("a")]).is_err());

        store.fail_writes(false);
        store.write_accounts(&[entry("a")]).unwrap();
        assert!(store.get_account(&AccountId::new("a")).unwrap().is_some());
    }
}
