//! Metadata storage trait.

use crate::StoreError;

/// Generic key-value store for ledger-wide values that are not per-account,
/// such as the global rate.
pub trait MetaStore {
    fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}
