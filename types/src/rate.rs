//! Fixed-point interest rates.
//!
//! A rate is the fraction of principal accrued per second, scaled by
//! [`PRECISION`]. The same scale is used for the accrued-interest multiplier,
//! so `PRECISION` on its own means "1.0".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Fixed-point scale shared by rates and the accrued multiplier (`10^18`).
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

const FRACTION_DIGITS: usize = 18;

/// Per-second interest rate scaled by [`PRECISION`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rate(u64);

impl Rate {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Parses a decimal fraction per second, e.g. `"0.05"` → `5 × 10^16`.
impl FromStr for Rate {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidRate(s.to_string());
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > FRACTION_DIGITS
            || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let padded = format!("{fraction:0<width$}", width = FRACTION_DIGITS);
        let fraction: u128 = padded.parse().map_err(|_| invalid())?;

        let scaled = whole
            .checked_mul(PRECISION)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(invalid)?;
        u64::try_from(scaled).map(Self).map_err(|_| invalid())
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0 as u128;
        let whole = raw / PRECISION;
        let fraction = raw % PRECISION;
        if fraction == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{fraction:0width$}", width = FRACTION_DIGITS);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_fraction() {
        let rate: Rate = "0.05".parse().unwrap();
        assert_eq!(rate.raw(), 50_000_000_000_000_000);
        let rate: Rate = ".5".parse().unwrap();
        assert_eq!(rate.raw(), 500_000_000_000_000_000);
        let rate: Rate = "2".parse().unwrap();
        assert_eq!(rate.raw(), 2_000_000_000_000_000_000);
    }

    #[test]
    fn parse_rejects_garbage_and_excess_precision() {
        assert!("".parse::<Rate>().is_err());
        assert!(".".parse::<Rate>().is_err());
        assert!("0.1a".parse::<Rate>().is_err());
        assert!("0.0000000000000000001".parse::<Rate>().is_err());
        // 19 whole units per second does not fit the u64 representation.
        assert!("19".parse::<Rate>().is_err());
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Rate::new(50_000_000_000_000_000).to_string(), "0.05");
        assert_eq!(Rate::new(2_000_000_000_000_000_000).to_string(), "2");
        assert_eq!(Rate::new(50_000_000_000).to_string(), "0.00000005");
    }
}
