//! The ACCRUE interest-accrual ledger.
//!
//! Each account records a principal and a rate captured when it was funded.
//! Interest accrues linearly in time and is realized into principal lazily,
//! right before any operation changes the balance.
//!
//! This crate handles:
//! - Balance computation and interest realization ([`AccrualLedger`])
//! - The global rate, which may only decrease ([`RateController`])
//! - Deposits, withdrawals and transfers with rate inheritance
//!   ([`TransferCoordinator`])
//! - Role-gated mint/burn, bridge messages and snapshots

pub mod account;
pub mod accrual;
pub mod authority;
pub mod bridge;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod rate;
pub mod snapshot;

pub use account::{Account, AccountState};
pub use accrual::AccrualLedger;
pub use authority::{GateError, MintAuthority, MintGate, Role, RoleRegistry};
pub use bridge::{burn_for_bridge, complete_bridge, BridgeMessage, BridgeRelay, RelayError};
pub use coordinator::{TransferCoordinator, GLOBAL_RATE_KEY};
pub use error::{ArithmeticError, LedgerError, ValidationError};
pub use event::{EventBus, LedgerEvent};
pub use rate::{RateChange, RateController};
pub use snapshot::{AccountSnapshot, LedgerSnapshot, SnapshotError};
