// mint-engine/src/config.rs

use crate::{reveal::MetadataUris, types::Amount, MintError, MintResult};
use collection_crypto::Hash;
use serde::{Deserialize, Serialize};

/// Prices and per-tier limits. Missing fields take the deployment defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    /// Public tier unit price (wei)
    pub price: Amount,
    /// Founder tier unit price (wei), may be zero
    pub founders_price: Amount,
    /// Whitelist tier unit price (wei)
    pub whitelist_price: Amount,
    /// Max units per public (and owner) mint call
    pub max_mint_amount: u64,
    /// Max public-tier units per address
    pub nft_per_address_limit: u64,
    /// Max owner-tier units per owner address
    pub owner_nft_limit: u64,
    /// Max founder-tier units per founder address
    pub founder_mint_limit: u64,
    /// Allocation granted to addresses on the explicit whitelist
    pub listed_allocation: u64,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            price: Amount::from_u64(20_000_000_000_000_000),           // 0.02 ether
            founders_price: Amount::zero(),
            whitelist_price: Amount::from_u64(10_000_000_000_000_000), // 0.01 ether
            max_mint_amount: 100,
            nft_per_address_limit: 100,
            owner_nft_limit: 100,
            founder_mint_limit: 10,
            listed_allocation: 3,
        }
    }
}

impl MintConfig {
    /// Every cap must be positive
    pub fn validate(&self) -> MintResult<()> {
        let caps = [
            ("max_mint_amount", self.max_mint_amount),
            ("nft_per_address_limit", self.nft_per_address_limit),
            ("owner_nft_limit", self.owner_nft_limit),
            ("founder_mint_limit", self.founder_mint_limit),
            ("listed_allocation", self.listed_allocation),
        ];
        for (name, value) in caps {
            ensure_positive(name, value)?;
        }
        Ok(())
    }
}

pub(crate) fn ensure_positive(name: &str, value: u64) -> MintResult<()> {
    if value == 0 {
        return Err(MintError::InvalidConfiguration(format!("{} must be positive", name)));
    }
    Ok(())
}

/// Everything needed to stand up a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSettings {
    pub name: String,
    pub symbol: String,
    pub max_supply: u64,
    #[serde(default = "default_start_paused")]
    pub start_paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist_root: Option<Hash>,
    #[serde(default)]
    pub metadata: MetadataUris,
    #[serde(default)]
    pub mint: MintConfig,
}

fn default_start_paused() -> bool {
    true
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            name: "Cows Gone Mad".into(),
            symbol: "CGM".into(),
            max_supply: 10_000,
            start_paused: true,
            whitelist_root: None,
            metadata: MetadataUris::default(),
            mint: MintConfig::default(),
        }
    }
}

impl CollectionSettings {
    pub fn validate(&self) -> MintResult<()> {
        if self.max_supply == 0 {
            return Err(MintError::InvalidConfiguration("max_supply must be positive".into()));
        }
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(MintError::InvalidConfiguration("name and symbol are required".into()));
        }
        self.mint.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = CollectionSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.mint.price, Amount::from_ether_str("0.02").unwrap());
        assert_eq!(settings.mint.whitelist_price, Amount::from_ether_str("0.01").unwrap());
        assert!(settings.mint.founders_price.is_zero());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let mut config = MintConfig::default();
        config.max_mint_amount = 0;
        assert!(matches!(config.validate(), Err(MintError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_zero_supply_rejected() {
        let settings = CollectionSettings {
            max_supply: 0,
            ..CollectionSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_mint_table() {
        let json = r#"{ "price": "5", "max_mint_amount": 2 }"#;
        let config: MintConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.price, Amount::from_u64(5));
        assert_eq!(config.max_mint_amount, 2);
        assert_eq!(config.whitelist_price, MintConfig::default().whitelist_price);
        assert_eq!(config.listed_allocation, 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_settings_json_defaults() {
        let json = r#"{ "name": "Test", "symbol": "TST", "max_supply": 50 }"#;
        let settings: CollectionSettings = serde_json::from_str(json).unwrap();
        assert!(settings.start_paused);
        assert_eq!(settings.mint, MintConfig::default());
        assert_eq!(settings.metadata.base_extension, ".json");
        assert!(settings.whitelist_root.is_none());
    }
}
