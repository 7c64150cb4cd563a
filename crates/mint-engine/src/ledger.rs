// mint-engine/src/ledger.rs

//! Token ledger collaborator.
//!
//! The engine never records ownership itself; it asks a [`TokenLedger`] to
//! mint sequential IDs and defers approval and existence questions to it.

use collection_crypto::Address;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Token identifier
pub type TokenId = u64;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Token {0} does not exist")]
    NonexistentToken(TokenId),

    #[error("{caller} is not owner nor approved for token {token_id}")]
    NotOwnerNorApproved { caller: Address, token_id: TokenId },

    #[error("Mint to the zero address")]
    MintToZeroAddress,

    #[error("Token id space exhausted")]
    IdOverflow,
}

/// Non-fungible token ledger the engine mints into
pub trait TokenLedger {
    /// Mint `count` consecutive token IDs to `recipient`. All or nothing.
    fn mint_sequential(&mut self, recipient: Address, count: u64) -> LedgerResult<Vec<TokenId>>;

    fn balance_of(&self, owner: &Address) -> u64;

    fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool;

    fn owner_of(&self, token_id: TokenId) -> Option<Address>;

    fn exists(&self, token_id: TokenId) -> bool {
        self.owner_of(token_id).is_some()
    }

    /// Burn a token; the ledger checks that `caller` may do so
    fn burn(&mut self, caller: &Address, token_id: TokenId) -> LedgerResult<()>;

    fn set_approval_for_all(&mut self, owner: Address, operator: Address, approved: bool);
}

/// In-process ledger with IDs starting at 1
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    owners: BTreeMap<TokenId, Address>,
    balances: HashMap<Address, u64>,
    operator_approvals: HashMap<Address, HashSet<Address>>,
    next_id: TokenId,
    burned: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            owners: BTreeMap::new(),
            balances: HashMap::new(),
            operator_approvals: HashMap::new(),
            next_id: 1,
            burned: 0,
        }
    }

    /// Tokens currently in circulation
    pub fn total_supply(&self) -> u64 {
        self.owners.len() as u64
    }

    pub fn total_burned(&self) -> u64 {
        self.burned
    }

    pub fn tokens_of(&self, owner: &Address) -> Vec<TokenId> {
        self.owners
            .iter()
            .filter(|(_, holder)| *holder == owner)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenLedger for InMemoryLedger {
    fn mint_sequential(&mut self, recipient: Address, count: u64) -> LedgerResult<Vec<TokenId>> {
        if recipient.is_zero() {
            return Err(LedgerError::MintToZeroAddress);
        }
        let end = self.next_id.checked_add(count).ok_or(LedgerError::IdOverflow)?;

        let ids: Vec<TokenId> = (self.next_id..end).collect();
        for id in &ids {
            self.owners.insert(*id, recipient);
        }
        *self.balances.entry(recipient).or_insert(0) += count;
        self.next_id = end;

        Ok(ids)
    }

    fn balance_of(&self, owner: &Address) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.operator_approvals
            .get(owner)
            .map(|ops| ops.contains(operator))
            .unwrap_or(false)
    }

    fn owner_of(&self, token_id: TokenId) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    fn burn(&mut self, caller: &Address, token_id: TokenId) -> LedgerResult<()> {
        let owner = self
            .owner_of(token_id)
            .ok_or(LedgerError::NonexistentToken(token_id))?;

        if owner != *caller && !self.is_approved_for_all(&owner, caller) {
            return Err(LedgerError::NotOwnerNorApproved {
                caller: *caller,
                token_id,
            });
        }

        self.owners.remove(&token_id);
        if let Some(balance) = self.balances.get_mut(&owner) {
            *balance = balance.saturating_sub(1);
        }
        self.burned += 1;

        Ok(())
    }

    fn set_approval_for_all(&mut self, owner: Address, operator: Address, approved: bool) {
        let operators = self.operator_approvals.entry(owner).or_default();
        if approved {
            operators.insert(operator);
        } else {
            operators.remove(&operator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_start_at_one() {
        let mut ledger = InMemoryLedger::new();
        let alice = Address::from_low_u64(1);
        let bob = Address::from_low_u64(2);

        assert_eq!(ledger.mint_sequential(alice, 2).unwrap(), vec![1, 2]);
        assert_eq!(ledger.mint_sequential(bob, 1).unwrap(), vec![3]);
        assert_eq!(ledger.balance_of(&alice), 2);
        assert_eq!(ledger.owner_of(3), Some(bob));
        assert!(!ledger.exists(4));
    }

    #[test]
    fn test_mint_to_zero_address_rejected() {
        let mut ledger = InMemoryLedger::new();
        assert_eq!(
            ledger.mint_sequential(Address::zero(), 1),
            Err(LedgerError::MintToZeroAddress)
        );
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn test_burn_requires_owner_or_operator() {
        let mut ledger = InMemoryLedger::new();
        let alice = Address::from_low_u64(1);
        let mallory = Address::from_low_u64(66);
        ledger.mint_sequential(alice, 2).unwrap();

        assert!(matches!(
            ledger.burn(&mallory, 1),
            Err(LedgerError::NotOwnerNorApproved { .. })
        ));

        ledger.set_approval_for_all(alice, mallory, true);
        ledger.burn(&mallory, 1).unwrap();
        ledger.burn(&alice, 2).unwrap();

        assert_eq!(ledger.balance_of(&alice), 0);
        assert_eq!(ledger.total_burned(), 2);
        assert_eq!(ledger.burn(&alice, 2), Err(LedgerError::NonexistentToken(2)));
    }

    #[test]
    fn test_burned_ids_are_not_reused() {
        let mut ledger = InMemoryLedger::new();
        let alice = Address::from_low_u64(1);
        ledger.mint_sequential(alice, 1).unwrap();
        ledger.burn(&alice, 1).unwrap();
        assert_eq!(ledger.mint_sequential(alice, 1).unwrap(), vec![2]);
        assert_eq!(ledger.tokens_of(&alice), vec![2]);
    }
}
