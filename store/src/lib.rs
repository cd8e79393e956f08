//! Abstract storage traits for the ACCRUE ledger.
//!
//! Every storage backend implements these traits. The ledger depends only on
//! the traits and serializes its own record types, so values cross this
//! boundary as opaque bytes.

pub mod account;
pub mod error;
pub mod memory;
pub mod meta;

pub use account::AccountStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use meta::MetaStore;

/// Everything a ledger instance needs from its backing store.
pub trait LedgerStore: AccountStore + MetaStore {}

impl<T: AccountStore + MetaStore> LedgerStore for T {}
