//! Ledger error taxonomy.

use accrue_store::StoreError;
use accrue_types::{Rate, Timestamp};
use thiserror::Error;

use crate::snapshot::SnapshotError;

/// A request the ledger refuses on its merits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("global rate must strictly decrease: current {current}, proposed {proposed}")]
    RateMustDecrease { current: Rate, proposed: Rate },

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("timestamp {now} precedes last accrual at {last_accrual}")]
    TimestampRegression { last_accrual: Timestamp, now: Timestamp },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("arithmetic overflow in accrual computation")]
    Overflow,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl LedgerError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Arithmetic(ArithmeticError::Overflow))
    }
}
