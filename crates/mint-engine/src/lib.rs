// mint-engine/src/lib.rs

//! Minting authorization and allocation engine
//!
//! This crate decides, for every mint request against a capped collection,
//! whether it is admitted and what it costs:
//! - Role registry (owner, auxiliary admin, founder)
//! - Merkle whitelist verification and tree building
//! - Price and limit configuration
//! - Pause and reveal gates, token metadata resolution
//! - Supply cap, supply lock and treasury withdrawal
//! - Tiered mint evaluation (owner, founder, whitelist, public)
//!
//! Every mutating operation on [`MintEngine`] is all-or-nothing. Hosts that
//! call the engine from several tasks go through [`MintService`], which
//! serializes access behind a single lock.

pub mod config;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod reveal;
pub mod roles;
pub mod service;
pub mod supply;
pub mod types;
pub mod whitelist;

pub use config::{CollectionSettings, MintConfig};
pub use engine::{AddressMintCounters, MintEngine, MintReceipt, MintRequest, MintTier, Quote, TierKind, WhitelistClaim};
pub use events::{AuditRecord, ConfigField, EngineEvent, EventLog, Outcome};
pub use ledger::{InMemoryLedger, LedgerError, LedgerResult, TokenId, TokenLedger};
pub use reveal::{Gates, MetadataUris};
pub use roles::{Role, RoleAction, RoleRegistry};
pub use service::MintService;
pub use supply::{InMemoryPayout, Payout, SupplyLedger, SupplySnapshot, Treasury};
pub use types::Amount;
pub use whitelist::{Whitelist, WhitelistEntry, WhitelistTree, WhitelistTreeDump};

pub use collection_crypto::{Address, Hash};

/// Result type for engine operations
pub type MintResult<T> = Result<T, MintError>;

/// Reasons a request is rejected. Every variant leaves state untouched.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    #[error("The contract is paused")]
    Paused,

    #[error("You need to mint at least 1 NFT")]
    ZeroAmount,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid whitelist proof")]
    InvalidProof,

    #[error("Whitelist minting is disabled")]
    WhitelistDisabled,

    #[error("Whitelist allocation exceeded: requested {requested}, remaining {remaining}")]
    AllocationExceeded { requested: u64, remaining: u64 },

    #[error("Max mint amount per session exceeded: requested {requested}, cap {cap}")]
    PerTxCapExceeded { requested: u64, cap: u64 },

    #[error("Max NFT per address exceeded: requested {requested}, already minted {minted}, cap {cap}")]
    PerAddressCapExceeded { requested: u64, minted: u64, cap: u64 },

    #[error("Founder mint limit exceeded: requested {requested}, already minted {minted}, cap {cap}")]
    FounderCapExceeded { requested: u64, minted: u64, cap: u64 },

    #[error("Owner NFT limit exceeded: requested {requested}, already minted {minted}, cap {cap}")]
    OwnerCapExceeded { requested: u64, minted: u64, cap: u64 },

    #[error("Insufficient funds: required {required}, provided {provided}")]
    InsufficientFunds { required: Amount, provided: Amount },

    #[error("Max NFT limit exceeded: requested {requested}, remaining {remaining}")]
    SupplyExceeded { requested: u64, remaining: u64 },

    #[error("Supply is locked")]
    SupplyLocked,

    #[error("Invalid supply change: {0}")]
    InvalidSupplyChange(String),

    #[error("URI query for nonexistent token {0}")]
    NonexistentToken(TokenId),

    #[error("Cannot revoke the last owner")]
    LastOwner,

    #[error("Nothing to withdraw")]
    NothingToWithdraw,

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Whitelist error: {0}")]
    Whitelist(#[from] collection_crypto::CryptoError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
