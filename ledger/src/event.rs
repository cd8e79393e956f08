//! Notifications emitted after ledger mutations commit.

use accrue_types::{AccountId, Rate};

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// The global rate was lowered.
    RateChanged { previous: Rate, new_rate: Rate },
    /// Pending interest was folded into an account's principal.
    InterestRealized { account: AccountId, delta: u64 },
    /// An account captured a rate on going from empty to funded.
    RateCaptured { account: AccountId, rate: Rate },
    /// An account received its first funding.
    AccountOpened { account: AccountId },
    Deposited { account: AccountId, amount: u64 },
    Withdrawn { account: AccountId, amount: u64 },
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: u64,
    },
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners run inline on the mutating call, after its writes are committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn emit_all(&self, events: &[LedgerEvent]) {
        for event in events {
            self.emit(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
