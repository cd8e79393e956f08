//! Account storage trait.

use crate::StoreError;
use accrue_types::AccountId;

/// Key-indexed storage of serialized account records.
///
/// Absent keys mean the account has never been opened.
pub trait AccountStore {
    fn get_account(&self, id: &AccountId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write every record in `batch` or none of them.
    fn write_accounts(&mut self, batch: &[(AccountId, Vec<u8>)]) -> Result<(), StoreError>;

    fn account_count(&self) -> Result<u64, StoreError>;

    /// All stored records, ordered by account id.
    fn iter_accounts(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError>;

    fn exists(&self, id: &AccountId) -> Result<bool, StoreError> {
        self.get_account(id).map(|record| record.is_some())
    }
}
