//! The global rate and its only-decreases rule.
//!
//! Every account opened by deposit captures the rate current at that moment.
//! Because the rate can only go down, a later depositor can never lock in a
//! better rate than an earlier one.

use accrue_types::{Rate, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A successful change of the global rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateChange {
    pub previous: Rate,
    pub new_rate: Rate,
    pub changed_at: Timestamp,
}

/// Owns the process-wide rate.
#[derive(Clone, Debug)]
pub struct RateController {
    current: Rate,
    history: Vec<RateChange>,
}

impl RateController {
    pub fn new(initial_rate: Rate) -> Self {
        Self {
            current: initial_rate,
            history: Vec::new(),
        }
    }

    pub fn global_rate(&self) -> Rate {
        self.current
    }

    /// Check a proposed rate without applying it.
    ///
    /// Equal rates are rejected along with increases.
    pub fn validate(&self, proposed: Rate) -> Result<(), ValidationError> {
        if proposed >= self.current {
            return Err(ValidationError::RateMustDecrease {
                current: self.current,
                proposed,
            });
        }
        Ok(())
    }

    /// Lower the global rate. On rejection nothing changes.
    pub fn set_global_rate(
        &mut self,
        new_rate: Rate,
        at: Timestamp,
    ) -> Result<RateChange, ValidationError> {
        self.validate(new_rate)?;
        let change = RateChange {
            previous: self.current,
            new_rate,
            changed_at: at,
        };
        self.current = new_rate;
        self.history.push(change);
        Ok(change)
    }

    /// Changes applied since this controller was created, oldest first.
    pub fn history(&self) -> &[RateChange] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE: Rate = Rate::new(50_000_000_000);
    const SIX: Rate = Rate::new(60_000_000_000);
    const FOUR: Rate = Rate::new(40_000_000_000);

    #[test]
    fn increase_is_rejected_and_rate_kept() {
        let mut rates = RateController::new(FIVE);
        let err = rates.set_global_rate(SIX, Timestamp::new(1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RateMustDecrease {
                current: FIVE,
                proposed: SIX
            }
        );
        assert_eq!(rates.global_rate(), FIVE);
        assert!(rates.history().is_empty());
    }

    #[test]
    fn equal_rate_is_rejected() {
        let mut rates = RateController::new(FIVE);
        assert!(rates.set_global_rate(FIVE, Timestamp::new(1)).is_err());
        assert_eq!(rates.global_rate(), FIVE);
    }

    #[test]
    fn one_below_current_is_accepted() {
        let mut rates = RateController::new(FIVE);
        let just_below = Rate::new(FIVE.raw() - 1);
        let change = rates.set_global_rate(just_below, Timestamp::new(1)).unwrap();
        assert_eq!(change.previous, FIVE);
        assert_eq!(rates.global_rate(), just_below);
    }

    #[test]
    fn history_records_each_decrease() {
        let mut rates = RateController::new(FIVE);
        rates.set_global_rate(FOUR, Timestamp::new(10)).unwrap();
        rates.set_global_rate(Rate::ZERO, Timestamp::new(20)).unwrap();
        assert!(rates.set_global_rate(Rate::ZERO, Timestamp::new(30)).is_err());

        let observed: Vec<_> = rates.history().iter().map(|c| c.new_rate).collect();
        assert_eq!(observed, vec![FOUR, Rate::ZERO]);
    }
}
