// mint-engine/src/engine.rs

use crate::{
    config::{ensure_positive, CollectionSettings, MintConfig},
    events::{ConfigField, EngineEvent, EventLog, Outcome},
    ledger::{TokenId, TokenLedger},
    reveal::{Gates, MetadataUris},
    roles::{Role, RoleAction, RoleRegistry},
    supply::{Payout, SupplyLedger, SupplySnapshot, Treasury},
    types::Amount,
    whitelist::Whitelist,
    MintError, MintResult,
};
use collection_crypto::{Address, Hash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Eligibility class of a mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    Owner,
    Founder,
    Whitelist,
    Public,
}

/// How a whitelist minter proves eligibility
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitelistClaim {
    /// Merkle proof of `(payer, allocation)` against the current root
    Proof { proof: Vec<Hash>, allocation: u64 },
    /// Payer is on the explicit address list
    Listed,
}

/// Tier selector with tier-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintTier {
    Owner,
    Founder,
    Whitelist(WhitelistClaim),
    Public,
}

impl MintTier {
    pub fn kind(&self) -> TierKind {
        match self {
            MintTier::Owner => TierKind::Owner,
            MintTier::Founder => TierKind::Founder,
            MintTier::Whitelist(_) => TierKind::Whitelist,
            MintTier::Public => TierKind::Public,
        }
    }
}

/// A single mint call
#[derive(Debug, Clone)]
pub struct MintRequest {
    /// Caller; pays and is checked for eligibility
    pub payer: Address,
    /// Receives the tokens
    pub recipient: Address,
    pub amount: u64,
    /// Attached payment (wei)
    pub value: Amount,
    pub tier: MintTier,
}

impl MintRequest {
    /// Request minting to the payer's own address
    pub fn new(tier: MintTier, payer: Address, amount: u64, value: Amount) -> Self {
        Self {
            payer,
            recipient: payer,
            amount,
            value,
            tier,
        }
    }

    pub fn public(payer: Address, amount: u64, value: Amount) -> Self {
        Self::new(MintTier::Public, payer, amount, value)
    }

    pub fn owner(payer: Address, amount: u64) -> Self {
        Self::new(MintTier::Owner, payer, amount, Amount::zero())
    }

    pub fn founder(payer: Address, amount: u64, value: Amount) -> Self {
        Self::new(MintTier::Founder, payer, amount, value)
    }

    pub fn whitelist(payer: Address, amount: u64, value: Amount, claim: WhitelistClaim) -> Self {
        Self::new(MintTier::Whitelist(claim), payer, amount, value)
    }

    /// Deliver to someone else; the payer must be their approved operator
    pub fn to(mut self, recipient: Address) -> Self {
        self.recipient = recipient;
        self
    }
}

/// Units minted by one address, per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMintCounters {
    pub owner_minted: u64,
    pub founder_minted: u64,
    pub whitelist_minted: u64,
    pub public_minted: u64,
}

impl AddressMintCounters {
    pub fn get(&self, tier: TierKind) -> u64 {
        match tier {
            TierKind::Owner => self.owner_minted,
            TierKind::Founder => self.founder_minted,
            TierKind::Whitelist => self.whitelist_minted,
            TierKind::Public => self.public_minted,
        }
    }

    fn add(&mut self, tier: TierKind, amount: u64) {
        let slot = match tier {
            TierKind::Owner => &mut self.owner_minted,
            TierKind::Founder => &mut self.founder_minted,
            TierKind::Whitelist => &mut self.whitelist_minted,
            TierKind::Public => &mut self.public_minted,
        };
        *slot += amount;
    }
}

/// Outcome of a successful evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub tier: TierKind,
    pub price: Amount,
    pub remaining_supply: u64,
}

/// Result of an admitted mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tier: TierKind,
    pub token_ids: Vec<TokenId>,
    pub price: Amount,
    pub paid: Amount,
}

/// Collection state plus every operation on it.
///
/// Mutating operations take `&mut self` and either apply completely or
/// return an error without touching state.
pub struct MintEngine<L: TokenLedger> {
    name: String,
    symbol: String,
    roles: RoleRegistry,
    whitelist: Whitelist,
    config: MintConfig,
    gates: Gates,
    metadata: MetadataUris,
    supply: SupplyLedger,
    treasury: Treasury,
    counters: HashMap<Address, AddressMintCounters>,
    events: EventLog,
    ledger: L,
}

impl<L: TokenLedger> MintEngine<L> {
    pub fn new(owner: Address, settings: CollectionSettings, ledger: L) -> MintResult<Self> {
        if owner.is_zero() {
            return Err(MintError::InvalidConfiguration("owner must not be the zero address".into()));
        }
        settings.validate()?;

        tracing::info!(
            name = %settings.name,
            symbol = %settings.symbol,
            max_supply = settings.max_supply,
            owner = %owner,
            "collection initialized"
        );

        Ok(Self {
            name: settings.name,
            symbol: settings.symbol,
            roles: RoleRegistry::new(owner),
            whitelist: Whitelist::new(settings.whitelist_root),
            config: settings.mint,
            gates: Gates::new(settings.start_paused),
            metadata: settings.metadata,
            supply: SupplyLedger::new(settings.max_supply)?,
            treasury: Treasury::new(),
            counters: HashMap::new(),
            events: EventLog::new(),
            ledger,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    // ----- capability checks -----

    fn require_role(&self, actor: &Address, role: Role) -> MintResult<()> {
        if !self.roles.has(role, actor) {
            return Err(MintError::Unauthorized(format!("{} lacks role {:?}", actor, role)));
        }
        Ok(())
    }

    /// Owner or auxiliary admin
    fn require_admin(&self, actor: &Address) -> MintResult<()> {
        if self.is_admin(actor) {
            return Ok(());
        }
        Err(MintError::Unauthorized(format!("{} is not an admin", actor)))
    }

    /// Who may grant or revoke `role`
    fn require_role_admin(&self, actor: &Address, role: Role) -> MintResult<()> {
        if role.delegable_to_aux_admin() {
            self.require_admin(actor)
        } else {
            self.require_role(actor, Role::Owner)
        }
    }

    // ----- roles -----

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has(role, account)
    }

    pub fn role_members(&self, role: Role) -> Vec<Address> {
        self.roles.members(role)
    }

    pub fn grant_role(&mut self, actor: Address, role: Role, account: Address) -> MintResult<()> {
        self.require_role_admin(&actor, role)?;
        let changed = self.roles.grant(role, account);
        self.record_role(actor, role, account, RoleAction::Granted, changed);
        Ok(())
    }

    pub fn revoke_role(&mut self, actor: Address, role: Role, account: Address) -> MintResult<()> {
        self.require_role_admin(&actor, role)?;
        let changed = self.roles.revoke(role, &account)?;
        self.record_role(actor, role, account, RoleAction::Revoked, changed);
        Ok(())
    }

    fn record_role(&mut self, actor: Address, role: Role, account: Address, action: RoleAction, changed: bool) {
        let outcome = if changed { Outcome::Applied } else { Outcome::Unchanged };
        self.events.record(actor, EngineEvent::RoleChanged { role, account, action }, outcome);
    }

    pub fn is_admin(&self, account: &Address) -> bool {
        self.roles.has(Role::Owner, account) || self.roles.has(Role::AuxAdmin, account)
    }

    pub fn add_admin(&mut self, actor: Address, account: Address) -> MintResult<()> {
        self.grant_role(actor, Role::AuxAdmin, account)
    }

    pub fn remove_admin(&mut self, actor: Address, account: Address) -> MintResult<()> {
        self.revoke_role(actor, Role::AuxAdmin, account)
    }

    pub fn is_founder(&self, account: &Address) -> bool {
        self.roles.has(Role::Founder, account)
    }

    pub fn add_founders(&mut self, actor: Address, accounts: &[Address]) -> MintResult<()> {
        self.require_role_admin(&actor, Role::Founder)?;
        for account in accounts {
            self.grant_role(actor, Role::Founder, *account)?;
        }
        Ok(())
    }

    pub fn remove_founders(&mut self, actor: Address, accounts: &[Address]) -> MintResult<()> {
        self.require_role_admin(&actor, Role::Founder)?;
        for account in accounts {
            self.revoke_role(actor, Role::Founder, *account)?;
        }
        Ok(())
    }

    // ----- whitelist -----

    pub fn whitelist_root(&self) -> Option<Hash> {
        self.whitelist.root()
    }

    /// Replace the whitelist root; `None` or zero disables proof minting
    pub fn set_whitelist_root(&mut self, actor: Address, root: Option<Hash>) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.whitelist.set_root(root);
        let root = self.whitelist.root();
        self.events.record(actor, EngineEvent::WhitelistRootChanged { root }, Outcome::Applied);
        Ok(())
    }

    pub fn verify_whitelist(&self, proof: &[Hash], account: &Address, allocation: u64) -> bool {
        self.whitelist.verify(proof, account, allocation)
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.is_listed(account)
    }

    pub fn whitelist_users(&mut self, actor: Address, accounts: &[Address]) -> MintResult<()> {
        self.require_admin(&actor)?;
        for account in accounts {
            let changed = self.whitelist.add_listed(*account);
            self.record_listing(actor, *account, true, changed);
        }
        Ok(())
    }

    pub fn remove_whitelisted_users(&mut self, actor: Address, accounts: &[Address]) -> MintResult<()> {
        self.require_admin(&actor)?;
        for account in accounts {
            let changed = self.whitelist.remove_listed(account);
            self.record_listing(actor, *account, false, changed);
        }
        Ok(())
    }

    fn record_listing(&mut self, actor: Address, account: Address, listed: bool, changed: bool) {
        let outcome = if changed { Outcome::Applied } else { Outcome::Unchanged };
        self.events.record(actor, EngineEvent::WhitelistListingChanged { account, listed }, outcome);
    }

    // ----- price and limit configuration -----

    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    pub fn price(&self) -> &Amount {
        &self.config.price
    }

    pub fn founders_price(&self) -> &Amount {
        &self.config.founders_price
    }

    pub fn whitelist_price(&self) -> &Amount {
        &self.config.whitelist_price
    }

    pub fn max_mint_amount(&self) -> u64 {
        self.config.max_mint_amount
    }

    pub fn nft_per_address_limit(&self) -> u64 {
        self.config.nft_per_address_limit
    }

    pub fn owner_nft_limit(&self) -> u64 {
        self.config.owner_nft_limit
    }

    pub fn founder_mint_limit(&self) -> u64 {
        self.config.founder_mint_limit
    }

    pub fn listed_allocation(&self) -> u64 {
        self.config.listed_allocation
    }

    pub fn set_price(&mut self, actor: Address, price: Amount) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.record_config(actor, ConfigField::Price, price.to_string());
        self.config.price = price;
        Ok(())
    }

    pub fn set_founders_price(&mut self, actor: Address, price: Amount) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.record_config(actor, ConfigField::FoundersPrice, price.to_string());
        self.config.founders_price = price;
        Ok(())
    }

    pub fn set_whitelist_price(&mut self, actor: Address, price: Amount) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.record_config(actor, ConfigField::WhitelistPrice, price.to_string());
        self.config.whitelist_price = price;
        Ok(())
    }

    pub fn set_max_mint_amount(&mut self, actor: Address, amount: u64) -> MintResult<()> {
        self.set_cap(actor, ConfigField::MaxMintAmount, amount)
    }

    pub fn set_nft_per_address_limit(&mut self, actor: Address, limit: u64) -> MintResult<()> {
        self.set_cap(actor, ConfigField::NftPerAddressLimit, limit)
    }

    pub fn set_owner_nft_limit(&mut self, actor: Address, limit: u64) -> MintResult<()> {
        self.set_cap(actor, ConfigField::OwnerNftLimit, limit)
    }

    pub fn set_founder_mint_limit(&mut self, actor: Address, limit: u64) -> MintResult<()> {
        self.set_cap(actor, ConfigField::FounderMintLimit, limit)
    }

    pub fn set_listed_allocation(&mut self, actor: Address, allocation: u64) -> MintResult<()> {
        self.set_cap(actor, ConfigField::ListedAllocation, allocation)
    }

    fn set_cap(&mut self, actor: Address, field: ConfigField, value: u64) -> MintResult<()> {
        self.require_admin(&actor)?;
        ensure_positive(&format!("{:?}", field), value)?;

        let slot = match field {
            ConfigField::MaxMintAmount => &mut self.config.max_mint_amount,
            ConfigField::NftPerAddressLimit => &mut self.config.nft_per_address_limit,
            ConfigField::OwnerNftLimit => &mut self.config.owner_nft_limit,
            ConfigField::FounderMintLimit => &mut self.config.founder_mint_limit,
            ConfigField::ListedAllocation => &mut self.config.listed_allocation,
            other => {
                return Err(MintError::InvalidConfiguration(format!("{:?} is not a cap", other)))
            }
        };
        *slot = value;

        self.record_config(actor, field, value.to_string());
        Ok(())
    }

    fn record_config(&mut self, actor: Address, field: ConfigField, value: String) {
        self.events.record(actor, EngineEvent::ConfigUpdated { field, value }, Outcome::Applied);
    }

    // ----- metadata, pause and reveal -----

    pub fn base_uri(&self) -> &str {
        &self.metadata.base_uri
    }

    pub fn not_revealed_uri(&self) -> &str {
        &self.metadata.not_revealed_uri
    }

    pub fn base_extension(&self) -> &str {
        &self.metadata.base_extension
    }

    pub fn set_base_uri(&mut self, actor: Address, uri: String) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.record_config(actor, ConfigField::BaseUri, uri.clone());
        self.metadata.base_uri = uri;
        Ok(())
    }

    pub fn set_not_revealed_uri(&mut self, actor: Address, uri: String) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.record_config(actor, ConfigField::NotRevealedUri, uri.clone());
        self.metadata.not_revealed_uri = uri;
        Ok(())
    }

    pub fn set_base_extension(&mut self, actor: Address, extension: String) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.record_config(actor, ConfigField::BaseExtension, extension.clone());
        self.metadata.base_extension = extension;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.gates.is_paused()
    }

    pub fn pause(&mut self, actor: Address, paused: bool) -> MintResult<()> {
        self.require_admin(&actor)?;
        self.gates.set_paused(paused);
        self.events.record(actor, EngineEvent::PauseChanged { paused }, Outcome::Applied);
        Ok(())
    }

    pub fn is_revealed(&self) -> bool {
        self.gates.is_revealed()
    }

    pub fn reveal(&mut self, actor: Address) -> MintResult<()> {
        self.set_revealed(actor, true)
    }

    /// Admin override back to the placeholder URI
    pub fn hide(&mut self, actor: Address) -> MintResult<()> {
        self.set_revealed(actor, false)
    }

    fn set_revealed(&mut self, actor: Address, revealed: bool) -> MintResult<()> {
        self.require_admin(&actor)?;
        let outcome = if self.gates.is_revealed() == revealed {
            Outcome::Unchanged
        } else {
            Outcome::Applied
        };
        self.gates.set_revealed(revealed);
        self.events.record(actor, EngineEvent::RevealChanged { revealed }, outcome);
        Ok(())
    }

    pub fn token_uri(&self, token_id: TokenId) -> MintResult<String> {
        if !self.ledger.exists(token_id) {
            return Err(MintError::NonexistentToken(token_id));
        }
        Ok(self.metadata.resolve(self.gates.is_revealed(), token_id))
    }

    // ----- supply and treasury -----

    pub fn total_minted(&self) -> u64 {
        self.supply.minted()
    }

    pub fn max_supply(&self) -> u64 {
        self.supply.max_supply()
    }

    pub fn is_supply_locked(&self) -> bool {
        self.supply.is_locked()
    }

    pub fn supply_snapshot(&self) -> SupplySnapshot {
        self.supply.snapshot()
    }

    pub fn set_max_supply(&mut self, actor: Address, max_supply: u64) -> MintResult<()> {
        self.require_role(&actor, Role::Owner)?;
        let previous = self.supply.set_max_supply(max_supply)?;
        self.events.record(
            actor,
            EngineEvent::MaxSupplyChanged { previous, current: max_supply },
            Outcome::Applied,
        );
        Ok(())
    }

    pub fn lock_supply(&mut self, actor: Address) -> MintResult<()> {
        self.require_role(&actor, Role::Owner)?;
        let outcome = if self.supply.lock() { Outcome::Applied } else { Outcome::Unchanged };
        let max_supply = self.supply.max_supply();
        self.events.record(actor, EngineEvent::SupplyLocked { max_supply }, outcome);
        Ok(())
    }

    pub fn balance(&self) -> &Amount {
        self.treasury.balance()
    }

    /// Send the whole treasury balance to the calling owner
    pub fn withdraw<P: Payout + ?Sized>(&mut self, actor: Address, payout: &mut P) -> MintResult<Amount> {
        self.require_role(&actor, Role::Owner)?;
        let amount = self.treasury.withdraw_all(payout, &actor).map_err(|e| {
            tracing::warn!(owner = %actor, error = %e, "withdrawal failed");
            e
        })?;
        self.events.record(
            actor,
            EngineEvent::Withdrawn { to: actor, amount: amount.clone() },
            Outcome::Applied,
        );
        Ok(amount)
    }

    // ----- minting -----

    pub fn counters(&self, account: &Address) -> AddressMintCounters {
        self.counters.get(account).copied().unwrap_or_default()
    }

    /// Run every admission check without changing state
    pub fn quote(&self, request: &MintRequest) -> MintResult<Quote> {
        self.evaluate(request)
    }

    /// Admit or reject `request`. On admission the ledger mint, the counters
    /// and the treasury are updated together.
    pub fn mint(&mut self, request: MintRequest) -> MintResult<MintReceipt> {
        let quote = self.evaluate(&request).map_err(|e| {
            tracing::debug!(
                payer = %request.payer,
                tier = ?request.tier.kind(),
                amount = request.amount,
                error = %e,
                "mint rejected"
            );
            e
        })?;

        let token_ids = self.ledger.mint_sequential(request.recipient, request.amount)?;

        self.supply.record_mint(request.amount);
        self.counters
            .entry(request.payer)
            .or_default()
            .add(quote.tier, request.amount);
        self.treasury.deposit(&request.value)?;

        self.events.record(
            request.payer,
            EngineEvent::Minted {
                tier: quote.tier,
                payer: request.payer,
                recipient: request.recipient,
                amount: request.amount,
                paid: request.value.clone(),
                token_ids: token_ids.clone(),
            },
            Outcome::Applied,
        );

        Ok(MintReceipt {
            tier: quote.tier,
            token_ids,
            price: quote.price,
            paid: request.value,
        })
    }

    fn evaluate(&self, request: &MintRequest) -> MintResult<Quote> {
        if self.gates.is_paused() {
            return Err(MintError::Paused);
        }
        let amount = request.amount;
        if amount == 0 {
            return Err(MintError::ZeroAmount);
        }

        let counters = self.counters(&request.payer);
        let unit_price = match &request.tier {
            MintTier::Owner => {
                self.require_role(&request.payer, Role::Owner)?;
                self.check_per_tx(amount)?;
                let minted = counters.owner_minted;
                let cap = self.config.owner_nft_limit;
                if minted.saturating_add(amount) > cap {
                    return Err(MintError::OwnerCapExceeded { requested: amount, minted, cap });
                }
                Amount::zero()
            }
            MintTier::Founder => {
                self.require_role(&request.payer, Role::Founder)?;
                let minted = counters.founder_minted;
                let cap = self.config.founder_mint_limit;
                if minted.saturating_add(amount) > cap {
                    return Err(MintError::FounderCapExceeded { requested: amount, minted, cap });
                }
                self.config.founders_price.clone()
            }
            MintTier::Whitelist(claim) => {
                let allocation = self.whitelist_allocation(&request.payer, claim)?;
                let remaining = allocation.saturating_sub(counters.whitelist_minted);
                if amount > remaining {
                    return Err(MintError::AllocationExceeded { requested: amount, remaining });
                }
                self.config.whitelist_price.clone()
            }
            MintTier::Public => {
                self.check_per_tx(amount)?;
                let minted = counters.public_minted;
                let cap = self.config.nft_per_address_limit;
                if minted.saturating_add(amount) > cap {
                    return Err(MintError::PerAddressCapExceeded { requested: amount, minted, cap });
                }
                self.config.price.clone()
            }
        };

        if request.payer != request.recipient
            && !self.ledger.is_approved_for_all(&request.recipient, &request.payer)
        {
            return Err(MintError::Unauthorized(format!(
                "{} is not an approved operator for {}",
                request.payer, request.recipient
            )));
        }

        let price = unit_price.times(amount);
        if request.value < price {
            return Err(MintError::InsufficientFunds {
                required: price,
                provided: request.value.clone(),
            });
        }

        self.supply.ensure_capacity(amount)?;

        Ok(Quote {
            tier: request.tier.kind(),
            price,
            remaining_supply: self.supply.remaining() - amount,
        })
    }

    fn check_per_tx(&self, amount: u64) -> MintResult<()> {
        let cap = self.config.max_mint_amount;
        if amount > cap {
            return Err(MintError::PerTxCapExceeded { requested: amount, cap });
        }
        Ok(())
    }

    fn whitelist_allocation(&self, payer: &Address, claim: &WhitelistClaim) -> MintResult<u64> {
        match claim {
            WhitelistClaim::Proof { proof, allocation } => {
                if !self.whitelist.is_enabled() {
                    return Err(MintError::WhitelistDisabled);
                }
                if !self.whitelist.verify(proof, payer, *allocation) {
                    return Err(MintError::InvalidProof);
                }
                Ok(*allocation)
            }
            WhitelistClaim::Listed => {
                if !self.whitelist.is_listed(payer) {
                    return Err(MintError::Unauthorized(format!("{} is not whitelisted", payer)));
                }
                Ok(self.config.listed_allocation)
            }
        }
    }

    // ----- ledger passthrough -----

    /// Burn through the ledger; the mint counter is not decremented
    pub fn burn(&mut self, caller: Address, token_id: TokenId) -> MintResult<()> {
        self.ledger.burn(&caller, token_id)?;
        self.events.record(caller, EngineEvent::Burned { token_id }, Outcome::Applied);
        Ok(())
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// `owner` lets `operator` act for it, including minting on its behalf
    pub fn set_approval_for_all(&mut self, owner: Address, operator: Address, approved: bool) {
        self.ledger.set_approval_for_all(owner, operator, approved);
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }
}
