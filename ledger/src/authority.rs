//! Capability gate in front of the coordinator.
//!
//! The ledger itself has no notion of roles and trusts its caller. A
//! [`MintGate`] is that caller: it checks the capability for each request
//! against a [`MintAuthority`] and only then forwards it.

use std::collections::{HashMap, HashSet};

use accrue_store::LedgerStore;
use accrue_types::{AccountId, Rate, Timestamp, TransferAmount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinator::TransferCoordinator;
use crate::error::LedgerError;
use crate::rate::RateChange;

/// Capabilities a caller can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May credit accounts.
    Minter,
    /// May debit accounts.
    Burner,
    /// May choose the rate an account captures on first funding.
    RateOverride,
    /// May lower the global rate.
    RateAdmin,
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("{caller} lacks the {role:?} role")]
    Unauthorized { caller: AccountId, role: Role },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Decides which callers hold which roles.
pub trait MintAuthority {
    fn has_role(&self, caller: &AccountId, role: Role) -> bool;

    fn require(&self, caller: &AccountId, role: Role) -> Result<(), GateError> {
        if self.has_role(caller, role) {
            Ok(())
        } else {
            tracing::warn!(%caller, ?role, "unauthorized ledger call");
            Err(GateError::Unauthorized {
                caller: caller.clone(),
                role,
            })
        }
    }
}

/// In-memory role assignments.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    grants: HashMap<AccountId, HashSet<Role>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, caller: AccountId, role: Role) {
        self.grants.entry(caller).or_default().insert(role);
    }

    /// Returns whether the role was held.
    pub fn revoke(&mut self, caller: &AccountId, role: Role) -> bool {
        let Some(roles) = self.grants.get_mut(caller) else {
            return false;
        };
        let removed = roles.remove(&role);
        if roles.is_empty() {
            self.grants.remove(caller);
        }
        removed
    }

    pub fn roles_of(&self, caller: &AccountId) -> Vec<Role> {
        self.grants
            .get(caller)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl MintAuthority for RoleRegistry {
    fn has_role(&self, caller: &AccountId, role: Role) -> bool {
        self.grants
            .get(caller)
            .is_some_and(|roles| roles.contains(&role))
    }
}

/// Mint/burn entry points that enforce roles before touching the ledger.
pub struct MintGate<'a, S, A> {
    ledger: &'a mut TransferCoordinator<S>,
    authority: &'a A,
}

impl<'a, S: LedgerStore, A: MintAuthority> MintGate<'a, S, A> {
    pub fn new(ledger: &'a mut TransferCoordinator<S>, authority: &'a A) -> Self {
        Self { ledger, authority }
    }

    /// Credit `amount`; a rate override additionally requires [`Role::RateOverride`].
    pub fn mint(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: u64,
        rate_override: Option<Rate>,
        now: Timestamp,
    ) -> Result<(), GateError> {
        self.authority.require(caller, Role::Minter)?;
        if rate_override.is_some() {
            self.authority.require(caller, Role::RateOverride)?;
        }
        self.ledger.deposit(account, amount, rate_override, now)?;
        Ok(())
    }

    /// Debit `amount`, where [`TransferAmount::Max`] means the entire balance.
    pub fn burn(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u64, GateError> {
        self.authority.require(caller, Role::Burner)?;
        Ok(self.ledger.withdraw(account, amount, now)?)
    }

    pub fn set_global_rate(
        &mut self,
        caller: &AccountId,
        new_rate: Rate,
        now: Timestamp,
    ) -> Result<RateChange, GateError> {
        self.authority.require(caller, Role::RateAdmin)?;
        Ok(self.ledger.set_global_rate(new_rate, now)?)
    }
}
