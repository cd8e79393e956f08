//! Nullable relay: record bridge messages without delivering them.

use accrue_ledger::{BridgeMessage, BridgeRelay, RelayError};
use std::collections::VecDeque;

/// A bridge relay that queues messages for the test to deliver by hand.
#[derive(Default)]
pub struct NullRelay {
    outbox: VecDeque<BridgeMessage>,
    refusing: bool,
}

impl NullRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every subsequent submission.
    pub fn refuse(&mut self, refusing: bool) {
        self.refusing = refusing;
    }

    /// Take the oldest undelivered message.
    pub fn next(&mut self) -> Option<BridgeMessage> {
        self.outbox.pop_front()
    }

    /// All undelivered messages (for assertions).
    pub fn pending(&self) -> Vec<BridgeMessage> {
        self.outbox.iter().cloned().collect()
    }
}

impl BridgeRelay for NullRelay {
    fn submit(&mut self, message: BridgeMessage) -> Result<(), RelayError> {
        if self.refusing {
            return Err(RelayError::Rejected {
                nonce: message.nonce,
                reason: "relay refusing submissions".into(),
            });
        }
        self.outbox.push_back(message);
        Ok(())
    }
}
