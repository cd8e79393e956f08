//! In-process store backed by ordered maps.

use std::collections::BTreeMap;

use crate::{AccountStore, MetaStore, StoreError};
use accrue_types::AccountId;

/// Ledger storage held entirely in memory.
///
/// Each ledger instance owns its own `MemoryStore`, so several independent
/// instances can live side by side in one process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    accounts: BTreeMap<AccountId, Vec<u8>>,
    meta: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn get_account(&self, id: &AccountId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.accounts.get(id).cloned())
    }

    fn write_accounts(&mut self, batch: &[(AccountId, Vec<u8>)]) -> Result<(), StoreError> {
        for (id, bytes) in batch {
            self.accounts.insert(id.clone(), bytes.clone());
        }
        Ok(())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.len() as u64)
    }

    fn iter_accounts(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .map(|(id, bytes)| (id.clone(), bytes.clone()))
            .collect())
    }
}

impl MetaStore for MemoryStore {
    fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_account_reads_as_none() {
        let store = MemoryStore::new();
        let id = AccountId::new("nobody");
        assert_eq!(store.get_account(&id).unwrap(), None);
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn batch_write_stores_every_record() {
        let mut store = MemoryStore::new();
        let batch = vec![
            (AccountId::new("b"), vec![2]),
            (AccountId::new("a"), vec![1]),
        ];
        store.write_accounts(&batch).unwrap();
        assert_eq!(store.account_count().unwrap(), 2);

        let ids: Vec<_> = store
            .iter_accounts()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn meta_overwrites_previous_value() {
        let mut store = MemoryStore::new();
        store.put_meta("k", &[1]).unwrap();
        store.put_meta("k", &[2]).unwrap();
        assert_eq!(store.get_meta("k").unwrap(), Some(vec![2]));
        assert_eq!(store.get_meta("other").unwrap(), None);
    }
}
