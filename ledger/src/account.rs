//! Per-account accrual state and the linear interest arithmetic.
//!
//! `balance(now) = principal × (PRECISION + rate × elapsed) / PRECISION`
//!
//! Interest is simple, never compounded between realizations: only
//! [`Account::realize`] folds accrued interest back into principal.

use accrue_types::{Rate, Timestamp, PRECISION};
use serde::{Deserialize, Serialize};

use crate::error::{ArithmeticError, LedgerError, ValidationError};

/// A funded (or previously funded) account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Recorded amount excluding interest accrued since `last_accrual`.
    pub principal: u64,
    /// Rate captured when the account last went from empty to funded.
    pub rate: Rate,
    /// Time of the most recent realization.
    pub last_accrual: Timestamp,
    /// When the account was first funded.
    pub opened_at: Timestamp,
}

impl Account {
    /// A freshly opened account with an empty principal and its clock started
    /// at `now`.
    pub fn open(rate: Rate, now: Timestamp) -> Self {
        Self {
            principal: 0,
            rate,
            last_accrual: now,
            opened_at: now,
        }
    }

    fn elapsed(&self, now: Timestamp) -> Result<u64, ValidationError> {
        self.last_accrual
            .elapsed_until(now)
            .ok_or(ValidationError::TimestampRegression {
                last_accrual: self.last_accrual,
                now,
            })
    }

    /// `PRECISION + rate × (now − last_accrual)`.
    pub fn accrued_factor(&self, now: Timestamp) -> Result<u128, LedgerError> {
        let elapsed = self.elapsed(now)?;
        let interest = (self.rate.raw() as u128)
            .checked_mul(elapsed as u128)
            .ok_or(ArithmeticError::Overflow)?;
        Ok(PRECISION
            .checked_add(interest)
            .ok_or(ArithmeticError::Overflow)?)
    }

    /// Principal plus interest accrued up to `now`, rounded down.
    pub fn balance_at(&self, now: Timestamp) -> Result<u64, LedgerError> {
        let factor = self.accrued_factor(now)?;
        let scaled = (self.principal as u128)
            .checked_mul(factor)
            .ok_or(ArithmeticError::Overflow)?;
        Ok(u64::try_from(scaled / PRECISION).map_err(|_| ArithmeticError::Overflow)?)
    }

    /// Interest accrued since the last realization.
    pub fn pending_interest(&self, now: Timestamp) -> Result<u64, LedgerError> {
        // factor >= PRECISION, so the balance never drops below principal.
        Ok(self.balance_at(now)? - self.principal)
    }

    /// Fold pending interest into principal and restart the accrual clock.
    ///
    /// Returns the amount added. On error the account is left untouched.
    pub fn realize(&mut self, now: Timestamp) -> Result<u64, LedgerError> {
        let delta = self.pending_interest(now)?;
        self.principal += delta;
        self.last_accrual = now;
        Ok(delta)
    }

    /// Whether the account currently holds no value.
    pub fn is_drained(&self) -> bool {
        self.principal == 0
    }
}

/// Lifecycle of an account key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountState {
    /// Never funded; nothing is stored.
    Unopened,
    /// Funded at least once. Principal may have returned to zero since.
    Active(Account),
}

impl AccountState {
    pub fn principal(&self) -> u64 {
        match self {
            Self::Unopened => 0,
            Self::Active(account) => account.principal,
        }
    }

    pub fn rate(&self) -> Option<Rate> {
        match self {
            Self::Unopened => None,
            Self::Active(account) => Some(account.rate),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The stored account, if any.
    pub fn into_account(self) -> Option<Account> {
        match self {
            Self::Unopened => None,
            Self::Active(account) => Some(account),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0.05 per second.
    const FIVE_PERCENT: Rate = Rate::new(50_000_000_000_000_000);

    fn funded(principal: u64, rate: Rate, at: u64) -> Account {
        let mut account = Account::open(rate, Timestamp::new(at));
        account.principal = principal;
        account
    }

    #[test]
    fn ten_at_five_percent_for_two_seconds_is_eleven() {
        let account = funded(10, FIVE_PERCENT, 1_000);
        assert_eq!(account.balance_at(Timestamp::new(1_002)).unwrap(), 11);
    }

    #[test]
    fn factor_is_precision_at_zero_elapsed() {
        let account = funded(10, FIVE_PERCENT, 1_000);
        assert_eq!(account.accrued_factor(Timestamp::new(1_000)).unwrap(), PRECISION);
    }

    #[test]
    fn interest_is_linear_not_compounded() {
        let account = funded(1_000, FIVE_PERCENT, 0);
        // 20 seconds at 5% is +100%, not (1.05)^20.
        assert_eq!(account.balance_at(Timestamp::new(20)).unwrap(), 2_000);
    }

    #[test]
    fn realize_moves_interest_into_principal() {
        let mut account = funded(10, FIVE_PERCENT, 1_000);
        let delta = account.realize(Timestamp::new(1_002)).unwrap();
        assert_eq!(delta, 1);
        assert_eq!(account.principal, 11);
        assert_eq!(account.last_accrual, Timestamp::new(1_002));
    }

    #[test]
    fn realize_twice_at_same_time_adds_nothing() {
        let mut account = funded(500, FIVE_PERCENT, 0);
        account.realize(Timestamp::new(3)).unwrap();
        let principal = account.principal;
        assert_eq!(account.realize(Timestamp::new(3)).unwrap(), 0);
        assert_eq!(account.principal, principal);
    }

    #[test]
    fn rounding_loses_at_most_one_unit() {
        // 0.3 units of interest rounds down to zero.
        let account = funded(3, FIVE_PERCENT, 0);
        assert_eq!(account.balance_at(Timestamp::new(2)).unwrap(), 3);
    }

    #[test]
    fn clock_regression_is_rejected() {
        let mut account = funded(10, FIVE_PERCENT, 1_000);
        let err = account.realize(Timestamp::new(999)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::TimestampRegression { .. })
        ));
        assert_eq!(account.last_accrual, Timestamp::new(1_000));
    }

    #[test]
    fn overflow_is_signalled_not_truncated() {
        let mut account = funded(u64::MAX, Rate::new(u64::MAX), 0);
        let err = account.realize(Timestamp::new(u64::MAX)).unwrap_err();
        assert!(err.is_overflow());
        assert_eq!(account.principal, u64::MAX);

        // Factor fits but the result does not fit in u64.
        let account = funded(u64::MAX, FIVE_PERCENT, 0);
        assert!(account.balance_at(Timestamp::new(100)).unwrap_err().is_overflow());
    }

    #[test]
    fn unopened_state_reports_empty() {
        let state = AccountState::Unopened;
        assert_eq!(state.principal(), 0);
        assert_eq!(state.rate(), None);
        assert!(!state.is_active());
    }
}
