// mint-engine/src/roles.rs

use crate::{MintError, MintResult};
use collection_crypto::Address;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Privileged roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control, including supply, treasury and role administration
    Owner,
    /// Configuration admin; may also manage founders
    AuxAdmin,
    /// May mint in the founder tier
    Founder,
}

impl Role {
    /// Whether an auxiliary admin may grant or revoke this role
    pub fn delegable_to_aux_admin(self) -> bool {
        matches!(self, Role::Founder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleAction {
    Granted,
    Revoked,
}

/// Role membership with set semantics
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    members: HashMap<Role, HashSet<Address>>,
}

impl RoleRegistry {
    /// Create a registry with a single initial owner
    pub fn new(owner: Address) -> Self {
        let mut members = HashMap::new();
        members.insert(Role::Owner, HashSet::from([owner]));
        Self { members }
    }

    pub fn has(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }

    /// Add `account` to `role`. Returns false if it was already a member.
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    /// Remove `account` from `role`. Returns false if it was not a member.
    ///
    /// The last owner cannot be removed.
    pub fn revoke(&mut self, role: Role, account: &Address) -> MintResult<bool> {
        let Some(set) = self.members.get_mut(&role) else {
            return Ok(false);
        };
        if !set.contains(account) {
            return Ok(false);
        }
        if role == Role::Owner && set.len() == 1 {
            return Err(MintError::LastOwner);
        }
        Ok(set.remove(account))
    }

    pub fn count(&self, role: Role) -> usize {
        self.members.get(&role).map(HashSet::len).unwrap_or(0)
    }

    /// Members of `role`, sorted for stable output
    pub fn members(&self, role: Role) -> Vec<Address> {
        let mut out: Vec<Address> = self
            .members
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }
}
