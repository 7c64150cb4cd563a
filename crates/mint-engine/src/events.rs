// mint-engine/src/events.rs

//! Audit trail of applied operations

use crate::{
    engine::TierKind,
    ledger::TokenId,
    roles::{Role, RoleAction},
    types::Amount,
};
use chrono::{DateTime, Utc};
use collection_crypto::{Address, Hash};
use serde::Serialize;

/// Configuration values that can be overwritten after deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    Price,
    FoundersPrice,
    WhitelistPrice,
    MaxMintAmount,
    NftPerAddressLimit,
    OwnerNftLimit,
    FounderMintLimit,
    ListedAllocation,
    BaseUri,
    NotRevealedUri,
    BaseExtension,
}

/// What an operation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EngineEvent {
    RoleChanged {
        role: Role,
        account: Address,
        action: RoleAction,
    },
    Minted {
        tier: TierKind,
        payer: Address,
        recipient: Address,
        amount: u64,
        paid: Amount,
        token_ids: Vec<TokenId>,
    },
    ConfigUpdated {
        field: ConfigField,
        value: String,
    },
    PauseChanged {
        paused: bool,
    },
    RevealChanged {
        revealed: bool,
    },
    WhitelistRootChanged {
        root: Option<Hash>,
    },
    WhitelistListingChanged {
        account: Address,
        listed: bool,
    },
    MaxSupplyChanged {
        previous: u64,
        current: u64,
    },
    SupplyLocked {
        max_supply: u64,
    },
    Withdrawn {
        to: Address,
        amount: Amount,
    },
    Burned {
        token_id: TokenId,
    },
}

/// Whether the operation changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// Accepted, but state already matched (e.g. granting a held role)
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub actor: Address,
    #[serde(flatten)]
    pub event: EngineEvent,
    pub outcome: Outcome,
    pub at: DateTime<Utc>,
}

/// Append-only log of successful operations
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<AuditRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, actor: Address, event: EngineEvent, outcome: Outcome) {
        tracing::info!(
            actor = %actor,
            outcome = ?outcome,
            event = ?event,
            "engine operation"
        );
        self.records.push(AuditRecord {
            actor,
            event,
            outcome,
            at: Utc::now(),
        });
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&AuditRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hand the accumulated records to an external sink
    pub fn drain(&mut self) -> Vec<AuditRecord> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_drain() {
        let mut log = EventLog::new();
        let actor = Address::from_low_u64(1);

        log.record(actor, EngineEvent::PauseChanged { paused: false }, Outcome::Applied);
        log.record(actor, EngineEvent::RevealChanged { revealed: true }, Outcome::Applied);

        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().event, EngineEvent::RevealChanged { revealed: true });

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_record_serializes_flat() {
        let mut log = EventLog::new();
        log.record(
            Address::from_low_u64(1),
            EngineEvent::RoleChanged {
                role: Role::Founder,
                account: Address::from_low_u64(2),
                action: RoleAction::Granted,
            },
            Outcome::Applied,
        );

        let value = serde_json::to_value(&log.records()[0]).unwrap();
        assert_eq!(value["operation"], "role_changed");
        assert_eq!(value["role"], "founder");
        assert_eq!(value["action"], "granted");
        assert_eq!(value["outcome"], "applied");
    }
}
