//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of a ledger instance (clock, storage, bridge
//! relay) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod relay;
pub mod store;

pub use clock::NullClock;
pub use relay::NullRelay;
pub use store::NullStore;
