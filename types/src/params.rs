//! Ledger parameters fixed at instance creation.

use serde::{Deserialize, Serialize};

use crate::rate::Rate;

/// Parameters a fresh ledger instance starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Global rate before any governance change: raw units per second scaled by
    /// [`crate::PRECISION`]. Later changes may only lower it.
    pub initial_rate: Rate,
}

impl LedgerParams {
    /// `5 × 10^10` scaled, roughly 158% a year of simple interest.
    pub const DEFAULT_INITIAL_RATE: Rate = Rate::new(50_000_000_000);

    pub fn with_initial_rate(initial_rate: Rate) -> Self {
        Self { initial_rate }
    }
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            initial_rate: Self::DEFAULT_INITIAL_RATE,
        }
    }
}
