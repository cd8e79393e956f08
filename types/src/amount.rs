//! Amount arguments for balance-moving operations.
//!
//! Principal is stored as raw `u64` units. Withdrawals and transfers accept a
//! [`TransferAmount`], which can name an exact amount or the "everything"
//! sentinel resolved against the caller's current balance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Amount requested by a withdrawal or transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferAmount {
    /// A literal number of raw units.
    Exact(u64),
    /// The full current balance of the source account at execution time.
    Max,
}

impl TransferAmount {
    /// Raw value reserved as the wire encoding of [`TransferAmount::Max`].
    pub const MAX_SENTINEL: u64 = u64::MAX;

    /// Resolve against the source account's current balance.
    pub fn resolve(self, current_balance: u64) -> u64 {
        match self {
            Self::Exact(amount) => amount,
            Self::Max => current_balance,
        }
    }
}

impl From<u64> for TransferAmount {
    fn from(raw: u64) -> Self {
        if raw == Self::MAX_SENTINEL {
            Self::Max
        } else {
            Self::Exact(raw)
        }
    }
}

impl FromStr for TransferAmount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") || s.eq_ignore_ascii_case("all") {
            return Ok(Self::Max);
        }
        s.parse::<u64>()
            .map(Self::from)
            .map_err(|_| TypeError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for TransferAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(amount) => write!(f, "{amount}"),
            Self::Max => write!(f, "max"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_sentinel_converts_to_max() {
        assert_eq!(TransferAmount::from(u64::MAX), TransferAmount::Max);
        assert_eq!(TransferAmount::from(42), TransferAmount::Exact(42));
    }

    #[test]
    fn resolve_substitutes_balance_only_for_max() {
        assert_eq!(TransferAmount::Max.resolve(110), 110);
        assert_eq!(TransferAmount::Exact(7).resolve(110), 7);
    }

    #[test]
    fn parse_accepts_keywords_and_numbers() {
        assert_eq!("max".parse::<TransferAmount>().unwrap(), TransferAmount::Max);
        assert_eq!("ALL".parse::<TransferAmount>().unwrap(), TransferAmount::Max);
        assert_eq!("15".parse::<TransferAmount>().unwrap(), TransferAmount::Exact(15));
        assert!("-3".parse::<TransferAmount>().is_err());
    }
}
