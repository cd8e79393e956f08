//! Fundamental types for the ACCRUE ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, amounts, fixed-point rates, timestamps and ledger parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod rate;
pub mod time;

pub use address::AccountId;
pub use amount::TransferAmount;
pub use error::TypeError;
pub use params::LedgerParams;
pub use rate::{Rate, PRECISION};
pub use time::{Clock, SystemClock, Timestamp};
