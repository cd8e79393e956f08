//! Realize-then-mutate sequencing for deposits, withdrawals and transfers.
//!
//! Every operation loads the accounts it touches, realizes their interest on
//! local copies, applies the mutation, and only then commits the copies in a
//! single store batch. A failed precondition therefore leaves the store
//! exactly as it was. Events are emitted after the commit succeeds.

use accrue_store::{LedgerStore, StoreError};
use accrue_types::{AccountId, LedgerParams, Rate, Timestamp, TransferAmount};

use crate::account::{Account, AccountState};
use crate::accrual::AccrualLedger;
use crate::error::{ArithmeticError, LedgerError, ValidationError};
use crate::event::{EventBus, LedgerEvent};
use crate::rate::{RateChange, RateController};

/// Meta key under which the global rate is persisted.
pub const GLOBAL_RATE_KEY: &str = "global_rate";

/// The ledger service: accounts, global rate and event fan-out.
pub struct TransferCoordinator<S> {
    ledger: AccrualLedger<S>,
    rates: RateController,
    events: EventBus,
}

impl<S: LedgerStore> TransferCoordinator<S> {
    /// Open a ledger over `store`, resuming the persisted global rate if the
    /// store has one and starting from `params.initial_rate` otherwise.
    pub fn open(store: S, params: &LedgerParams) -> Result<Self, LedgerError> {
        let rate = match store.get_meta(GLOBAL_RATE_KEY)? {
            Some(bytes) => decode_rate(&bytes)?,
            None => params.initial_rate,
        };
        tracing::debug!(global_rate = %rate, "opened ledger");
        Ok(Self {
            ledger: AccrualLedger::new(store),
            rates: RateController::new(rate),
            events: EventBus::new(),
        })
    }

    pub fn ledger(&self) -> &AccrualLedger<S> {
        &self.ledger
    }

    pub fn rates(&self) -> &RateController {
        &self.rates
    }

    pub fn into_store(self) -> S {
        self.ledger.into_store()
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn global_rate(&self) -> Rate {
        self.rates.global_rate()
    }

    pub fn current_balance(&self, id: &AccountId, now: Timestamp) -> Result<u64, LedgerError> {
        self.ledger.current_balance(id, now)
    }

    pub fn accrued_factor(&self, id: &AccountId, now: Timestamp) -> Result<u128, LedgerError> {
        self.ledger.accrued_factor(id, now)
    }

    pub fn raw_principal(&self, id: &AccountId) -> Result<u64, LedgerError> {
        self.ledger.raw_principal(id)
    }

    pub fn rate_of(&self, id: &AccountId) -> Result<Option<Rate>, LedgerError> {
        self.ledger.rate_of(id)
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Lower the global rate. Increases and equal values are rejected.
    ///
    /// The new rate is persisted before it takes effect, so a failed write
    /// leaves the controller unchanged.
    pub fn set_global_rate(
        &mut self,
        new_rate: Rate,
        now: Timestamp,
    ) -> Result<RateChange, LedgerError> {
        self.rates.validate(new_rate)?;
        self.ledger
            .store_mut()
            .put_meta(GLOBAL_RATE_KEY, &encode_rate(new_rate)?)?;
        let change = self.rates.set_global_rate(new_rate, now)?;

        tracing::info!(previous = %change.previous, new_rate = %change.new_rate, "global rate lowered");
        self.events.emit(&LedgerEvent::RateChanged {
            previous: change.previous,
            new_rate: change.new_rate,
        });
        Ok(change)
    }

    /// Realize an account's pending interest and notify observers.
    pub fn realize_interest(&mut self, id: &AccountId, now: Timestamp) -> Result<u64, LedgerError> {
        let delta = self.ledger.realize_interest(id, now)?;
        if delta > 0 {
            self.events.emit(&LedgerEvent::InterestRealized {
                account: id.clone(),
                delta,
            });
        }
        Ok(delta)
    }

    /// Credit `amount` to an account.
    ///
    /// An account holding no value captures `explicit_rate` if one is given
    /// (the caller is responsible for deciding who may supply one) and the
    /// current global rate otherwise. A zero deposit into an unopened account
    /// does nothing.
    pub fn deposit(
        &mut self,
        id: &AccountId,
        amount: u64,
        explicit_rate: Option<Rate>,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        let mut events = Vec::new();
        let state = self.ledger.account_state(id)?;
        if amount == 0 && !state.is_active() {
            return Ok(());
        }

        let opened = !state.is_active();
        let rate = explicit_rate.unwrap_or_else(|| self.rates.global_rate());
        let mut account = stage(id, state, rate, now, &mut events)?;
        if account.is_drained() && amount > 0 {
            capture_rate(id, &mut account, rate, &mut events);
        }
        account.principal = account
            .principal
            .checked_add(amount)
            .ok_or(ArithmeticError::Overflow)?;

        self.ledger.commit(&[(id, &account)])?;
        if opened {
            tracing::info!(account = %id, rate = %account.rate, "opened account");
        }
        tracing::debug!(account = %id, amount, principal = account.principal, "deposit");
        events.push(LedgerEvent::Deposited {
            account: id.clone(),
            amount,
        });
        self.events.emit_all(&events);
        Ok(())
    }

    /// Debit an account. [`TransferAmount::Max`] withdraws the full current
    /// balance. Returns the amount withdrawn.
    pub fn withdraw(
        &mut self,
        id: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u64, LedgerError> {
        let mut events = Vec::new();
        let mut account = match self.ledger.account_state(id)? {
            AccountState::Unopened => return empty_source(amount),
            AccountState::Active(account) => account,
        };
        realize_staged(id, &mut account, now, &mut events)?;

        let amount = debit(&mut account, amount)?;

        self.ledger.commit(&[(id, &account)])?;
        tracing::debug!(account = %id, amount, principal = account.principal, "withdrawal");
        events.push(LedgerEvent::Withdrawn {
            account: id.clone(),
            amount,
        });
        self.events.emit_all(&events);
        Ok(amount)
    }

    /// Move value between two accounts. Returns the amount moved.
    ///
    /// Both sides are realized first. A recipient holding no value adopts the
    /// sender's rate; a recipient that already holds value keeps its own.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u64, LedgerError> {
        if from == to {
            return self.self_transfer(from, amount, now);
        }

        let mut events = Vec::new();
        let mut source = match self.ledger.account_state(from)? {
            AccountState::Unopened => return empty_source(amount),
            AccountState::Active(account) => account,
        };
        realize_staged(from, &mut source, now, &mut events)?;

        let to_state = self.ledger.account_state(to)?;
        let recipient_was_active = to_state.is_active();
        let amount = amount.resolve(source.principal);
        if amount == 0 && !recipient_was_active {
            // Nothing funds the recipient, so it stays unopened.
            self.ledger.commit(&[(from, &source)])?;
            self.events.emit_all(&events);
            return Ok(0);
        }

        let mut target = stage(to, to_state, source.rate, now, &mut events)?;
        debit(&mut source, TransferAmount::Exact(amount))?;
        if target.is_drained() && amount > 0 {
            capture_rate(to, &mut target, source.rate, &mut events);
        }
        target.principal = target
            .principal
            .checked_add(amount)
            .ok_or(ArithmeticError::Overflow)?;

        self.ledger.commit(&[(from, &source), (to, &target)])?;
        if !recipient_was_active {
            tracing::info!(account = %to, rate = %target.rate, "opened account");
        }
        tracing::debug!(%from, %to, amount, "transfer");
        events.push(LedgerEvent::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        self.events.emit_all(&events);
        Ok(amount)
    }

    fn self_transfer(
        &mut self,
        id: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u64, LedgerError> {
        let mut events = Vec::new();
        let mut account = match self.ledger.account_state(id)? {
            AccountState::Unopened => return empty_source(amount),
            AccountState::Active(account) => account,
        };
        realize_staged(id, &mut account, now, &mut events)?;

        let amount = amount.resolve(account.principal);
        if amount > account.principal {
            return Err(insufficient(amount, account.principal));
        }

        self.ledger.commit(&[(id, &account)])?;
        events.push(LedgerEvent::Transferred {
            from: id.clone(),
            to: id.clone(),
            amount,
        });
        self.events.emit_all(&events);
        Ok(amount)
    }
}

/// Load-or-open an account as a local copy with its interest realized.
fn stage(
    id: &AccountId,
    state: AccountState,
    opening_rate: Rate,
    now: Timestamp,
    events: &mut Vec<LedgerEvent>,
) -> Result<Account, LedgerError> {
    match state {
        AccountState::Unopened => {
            events.push(LedgerEvent::AccountOpened {
                account: id.clone(),
            });
            Ok(Account::open(opening_rate, now))
        }
        AccountState::Active(mut account) => {
            realize_staged(id, &mut account, now, events)?;
            Ok(account)
        }
    }
}

fn realize_staged(
    id: &AccountId,
    account: &mut Account,
    now: Timestamp,
    events: &mut Vec<LedgerEvent>,
) -> Result<(), LedgerError> {
    let delta = account.realize(now)?;
    if delta > 0 {
        events.push(LedgerEvent::InterestRealized {
            account: id.clone(),
            delta,
        });
    }
    Ok(())
}

fn capture_rate(id: &AccountId, account: &mut Account, rate: Rate, events: &mut Vec<LedgerEvent>) {
    account.rate = rate;
    events.push(LedgerEvent::RateCaptured {
        account: id.clone(),
        rate,
    });
}

/// Subtract a resolved amount from a realized account.
fn debit(account: &mut Account, amount: TransferAmount) -> Result<u64, LedgerError> {
    let amount = amount.resolve(account.principal);
    if amount > account.principal {
        return Err(insufficient(amount, account.principal));
    }
    account.principal -= amount;
    Ok(amount)
}

/// Outcome of debiting an account that was never funded.
fn empty_source(amount: TransferAmount) -> Result<u64, LedgerError> {
    match amount.resolve(0) {
        0 => Ok(0),
        needed => Err(insufficient(needed, 0)),
    }
}

fn insufficient(needed: u64, available: u64) -> LedgerError {
    ValidationError::InsufficientBalance { needed, available }.into()
}

pub(crate) fn encode_rate(rate: Rate) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(&rate).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_rate(bytes: &[u8]) -> Result<Rate, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corruption(e.to_string()))
}
