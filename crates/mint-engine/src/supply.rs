// mint-engine/src/supply.rs

use crate::{types::Amount, MintError, MintResult};
use collection_crypto::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mint counter and supply cap.
///
/// `minted <= max_supply` holds in every state. The cap can only move down,
/// never below `minted`, and not at all once locked.
#[derive(Debug, Clone)]
pub struct SupplyLedger {
    minted: u64,
    max_supply: u64,
    locked: bool,
}

impl SupplyLedger {
    pub fn new(max_supply: u64) -> MintResult<Self> {
        if max_supply == 0 {
            return Err(MintError::InvalidConfiguration("max_supply must be positive".into()));
        }
        Ok(Self {
            minted: 0,
            max_supply,
            locked: false,
        })
    }

    pub fn minted(&self) -> u64 {
        self.minted
    }

    pub fn max_supply(&self) -> u64 {
        self.max_supply
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn remaining(&self) -> u64 {
        self.max_supply - self.minted
    }

    pub fn ensure_capacity(&self, amount: u64) -> MintResult<()> {
        let remaining = self.remaining();
        if amount > remaining {
            return Err(MintError::SupplyExceeded {
                requested: amount,
                remaining,
            });
        }
        Ok(())
    }

    /// Count `amount` new units. Capacity must have been checked.
    pub(crate) fn record_mint(&mut self, amount: u64) {
        debug_assert!(amount <= self.remaining());
        self.minted += amount;
    }

    /// Tighten the cap. Returns the previous cap.
    pub fn set_max_supply(&mut self, new_max: u64) -> MintResult<u64> {
        if self.locked {
            return Err(MintError::SupplyLocked);
        }
        if new_max == 0 {
            return Err(MintError::InvalidSupplyChange("max supply must be positive".into()));
        }
        if new_max < self.minted {
            return Err(MintError::InvalidSupplyChange(format!(
                "{} is below the {} already minted", new_max, self.minted
            )));
        }
        if new_max > self.max_supply {
            return Err(MintError::InvalidSupplyChange(format!(
                "{} exceeds the current cap {}", new_max, self.max_supply
            )));
        }

        let previous = self.max_supply;
        self.max_supply = new_max;
        Ok(previous)
    }

    /// Freeze the cap permanently. Locking twice is a no-op.
    pub fn lock(&mut self) -> bool {
        let changed = !self.locked;
        self.locked = true;
        changed
    }

    pub fn snapshot(&self) -> SupplySnapshot {
        SupplySnapshot {
            minted: self.minted,
            max_supply: self.max_supply,
            remaining: self.remaining(),
            locked: self.locked,
        }
    }
}

/// Point-in-time view of the supply counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplySnapshot {
    pub minted: u64,
    pub max_supply: u64,
    pub remaining: u64,
    pub locked: bool,
}

/// Moves funds out of the collection
pub trait Payout {
    fn transfer(&mut self, to: &Address, amount: &Amount) -> Result<(), String>;
}

/// Payout that credits an in-process balance sheet
#[derive(Debug, Clone, Default)]
pub struct InMemoryPayout {
    credited: HashMap<Address, Amount>,
}

impl InMemoryPayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credited(&self, account: &Address) -> Amount {
        self.credited.get(account).cloned().unwrap_or_else(Amount::zero)
    }
}

impl Payout for InMemoryPayout {
    fn transfer(&mut self, to: &Address, amount: &Amount) -> Result<(), String> {
        let entry = self.credited.entry(*to).or_insert_with(Amount::zero);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| "credit overflow".to_string())?;
        Ok(())
    }
}

/// Funds collected from mint payments
#[derive(Debug, Clone, Default)]
pub struct Treasury {
    balance: Amount,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> &Amount {
        &self.balance
    }

    pub(crate) fn deposit(&mut self, amount: &Amount) -> MintResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| MintError::InvalidAmount("treasury balance overflow".into()))?;
        Ok(())
    }

    /// Send the whole balance to `to`. The balance is cleared only if the
    /// transfer succeeds.
    pub(crate) fn withdraw_all<P: Payout + ?Sized>(
        &mut self,
        payout: &mut P,
        to: &Address,
    ) -> MintResult<Amount> {
        if self.balance.is_zero() {
            return Err(MintError::NothingToWithdraw);
        }

        payout
            .transfer(to, &self.balance)
            .map_err(MintError::TransferFailed)?;

        Ok(std::mem::take(&mut self.balance))
    }
}
