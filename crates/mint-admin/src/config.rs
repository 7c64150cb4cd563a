// mint-admin/src/config.rs
use mint_engine::{Address, CollectionSettings, InMemoryLedger, MintEngine};
use serde::{Deserialize, Serialize};

/// Deployment file: who owns the collection and how it is configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub owner: Address,
    /// Initial auxiliary admins
    #[serde(default)]
    pub admins: Vec<Address>,
    /// Initial founders
    #[serde(default)]
    pub founders: Vec<Address>,
    pub collection: CollectionSettings,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            owner: Address::from_low_u64(1),
            admins: vec![],
            founders: vec![],
            collection: CollectionSettings::default(),
        }
    }
}

impl DeploymentConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Stand up an engine over an empty in-memory ledger
    pub fn build_engine(&self) -> anyhow::Result<MintEngine<InMemoryLedger>> {
        let mut engine = MintEngine::new(self.owner, self.collection.clone(), InMemoryLedger::new())?;
        for admin in &self.admins {
            engine.add_admin(self.owner, *admin)?;
        }
        engine.add_founders(self.owner, &self.founders)?;
        Ok(engine)
    }
}
