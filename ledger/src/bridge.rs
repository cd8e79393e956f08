//! Moving value between independent ledger instances.
//!
//! A bridge transfer is a burn on the source ledger followed, at some later
//! point, by a deposit on the destination ledger that carries the source
//! account's rate. The two ledgers are never updated atomically together and
//! nothing here detects a message delivered twice; deduplication belongs to
//! whoever carries [`BridgeMessage`]s between instances.

use accrue_store::LedgerStore;
use accrue_types::{AccountId, Rate, Timestamp, TransferAmount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinator::TransferCoordinator;
use crate::error::LedgerError;

/// A burn on one ledger waiting to be replayed as a deposit on another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeMessage {
    /// Caller-assigned identifier used by the relay for deduplication.
    pub nonce: u64,
    pub source_account: AccountId,
    pub recipient: AccountId,
    pub amount: u64,
    /// The source account's rate at the time of the burn.
    pub rate: Rate,
    pub burned_at: Timestamp,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay rejected message {nonce}: {reason}")]
    Rejected { nonce: u64, reason: String },

    /// The relay refused the message and re-depositing the burned amount
    /// failed too, so the burn stays committed with no message in flight.
    #[error("relay rejected message {nonce} ({relay}) and reversing the burn of {amount} failed: {ledger}")]
    Unreversed {
        nonce: u64,
        amount: u64,
        relay: String,
        #[source]
        ledger: LedgerError,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Carries burn messages to the destination ledger.
pub trait BridgeRelay {
    fn submit(&mut self, message: BridgeMessage) -> Result<(), RelayError>;
}

/// Burn `amount` from `account` and hand the resulting message to `relay`.
///
/// If the relay refuses the message the burn is reversed by re-depositing the
/// amount at the account's original rate. The burn and its reversal are two
/// separate commits: when the reversal itself fails the burned value is not
/// restored and [`RelayError::Unreversed`] reports the amount.
pub fn burn_for_bridge<S: LedgerStore, R: BridgeRelay>(
    ledger: &mut TransferCoordinator<S>,
    relay: &mut R,
    account: &AccountId,
    recipient: &AccountId,
    amount: TransferAmount,
    nonce: u64,
    now: Timestamp,
) -> Result<BridgeMessage, RelayError> {
    let burned = ledger.withdraw(account, amount, now)?;
    let rate = ledger
        .rate_of(account)?
        .unwrap_or_else(|| ledger.global_rate());

    let message = BridgeMessage {
        nonce,
        source_account: account.clone(),
        recipient: recipient.clone(),
        amount: burned,
        rate,
        burned_at: now,
    };

    if let Err(e) = relay.submit(message.clone()) {
        tracing::warn!(nonce, %account, error = %e, "relay refused bridge message, reversing burn");
        if let Err(ledger_err) = ledger.deposit(account, burned, Some(rate), now) {
            tracing::error!(
                nonce,
                %account,
                amount = burned,
                relay_error = %e,
                error = %ledger_err,
                "could not reverse refused bridge burn"
            );
            return Err(RelayError::Unreversed {
                nonce,
                amount: burned,
                relay: e.to_string(),
                ledger: ledger_err,
            });
        }
        return Err(e);
    }
    tracing::info!(nonce, %account, %recipient, amount = burned, "bridge burn submitted");
    Ok(message)
}

/// Replay a bridge message as a deposit, preserving the originating rate for
/// a recipient that holds no value.
pub fn complete_bridge<S: LedgerStore>(
    ledger: &mut TransferCoordinator<S>,
    message: &BridgeMessage,
    now: Timestamp,
) -> Result<(), LedgerError> {
    ledger.deposit(&message.recipient, message.amount, Some(message.rate), now)?;
    tracing::info!(nonce = message.nonce, recipient = %message.recipient, amount = message.amount, "bridge deposit completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use accrue_store::MemoryStore;
    use accrue_types::LedgerParams;

    const SOURCE_RATE: Rate = Rate::new(50_000_000_000_000_000);
    const DEST_RATE: Rate = Rate::new(10_000_000_000_000_000);

    struct Outbox(Vec<BridgeMessage>);

    impl BridgeRelay for Outbox {
        fn submit(&mut self, message: BridgeMessage) -> Result<(), RelayError> {
            self.0.push(message);
            Ok(())
        }
    }

    struct Refusing;

    impl BridgeRelay for Refusing {
        fn submit(&mut self, message: BridgeMessage) -> Result<(), RelayError> {
            Err(RelayError::Rejected {
                nonce: message.nonce,
                reason: "offline".into(),
            })
        }
    }

    fn ledger(rate: Rate) -> TransferCoordinator<MemoryStore> {
        TransferCoordinator::open(MemoryStore::new(), &LedgerParams::with_initial_rate(rate)).unwrap()
    }

    #[test]
    fn bridged_deposit_keeps_source_rate() {
        let mut source = ledger(SOURCE_RATE);
        let mut dest = ledger(DEST_RATE);
        let alice = AccountId::new("alice");
        source.deposit(&alice, 100, None, Timestamp::new(0)).unwrap();

        let mut outbox = Outbox(Vec::new());
        let message = burn_for_bridge(
            &mut source,
            &mut outbox,
            &alice,
            &alice,
            TransferAmount::Max,
            7,
            Timestamp::new(2),
        )
        .unwrap();
        assert_eq!(message.amount, 110);
        assert_eq!(outbox.0, vec![message.clone()]);
        assert_eq!(source.raw_principal(&alice).unwrap(), 0);

        complete_bridge(&mut dest, &message, Timestamp::new(5)).unwrap();
        assert_eq!(dest.raw_principal(&alice).unwrap(), 110);
        assert_eq!(dest.rate_of(&alice).unwrap(), Some(SOURCE_RATE));
    }

    #[test]
    fn refused_message_reverses_burn() {
        let mut source = ledger(SOURCE_RATE);
        let alice = AccountId::new("alice");
        source.deposit(&alice, 100, None, Timestamp::new(0)).unwrap();

        let err = burn_for_bridge(
            &mut source,
            &mut Refusing,
            &alice,
            &AccountId::new("bob"),
            TransferAmount::Max,
            1,
            Timestamp::new(2),
        )
        .unwrap_err();
        assert!(matches!(err, RelayError::Rejected { nonce: 1, .. }));
        assert_eq!(source.raw_principal(&alice).unwrap(), 110);
        assert_eq!(source.rate_of(&alice).unwrap(), Some(SOURCE_RATE));
    }
}
