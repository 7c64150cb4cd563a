// mint-engine/src/service.rs

//! Shared handle for hosts that drive one engine from many tasks.
//!
//! All writes go through one lock, so admission decisions are made against
//! a state no other mint can interleave with.

use crate::{
    engine::{MintEngine, MintReceipt, MintRequest, Quote},
    ledger::{TokenId, TokenLedger},
    supply::SupplySnapshot,
    MintResult,
};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MintService<L: TokenLedger> {
    engine: Arc<RwLock<MintEngine<L>>>,
}

impl<L: TokenLedger> Clone for MintService<L> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<L: TokenLedger> MintService<L> {
    pub fn new(engine: MintEngine<L>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }

    pub async fn mint(&self, request: MintRequest) -> MintResult<MintReceipt> {
        self.engine.write().await.mint(request)
    }

    pub async fn quote(&self, request: &MintRequest) -> MintResult<Quote> {
        self.engine.read().await.quote(request)
    }

    pub async fn token_uri(&self, token_id: TokenId) -> MintResult<String> {
        self.engine.read().await.token_uri(token_id)
    }

    pub async fn supply_snapshot(&self) -> SupplySnapshot {
        self.engine.read().await.supply_snapshot()
    }

    /// Run an admin operation under the write lock
    pub async fn execute<T, F>(&self, op: F) -> MintResult<T>
    where
        F: FnOnce(&mut MintEngine<L>) -> MintResult<T>,
    {
        let mut engine = self.engine.write().await;
        op(&mut engine)
    }

    /// Run a query under the read lock
    pub async fn read<T, F>(&self, op: F) -> T
    where
        F: FnOnce(&MintEngine<L>) -> T,
    {
        let engine = self.engine.read().await;
        op(&engine)
    }

    pub fn engine(&self) -> &Arc<RwLock<MintEngine<L>>> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::CollectionSettings, ledger::InMemoryLedger, types::Amount};
    use collection_crypto::Address;

    #[tokio::test]
    async fn test_service_roundtrip() {
        let owner = Address::from_low_u64(1);
        let engine = MintEngine::new(owner, CollectionSettings::default(), InMemoryLedger::new()).unwrap();
        let service = MintService::new(engine);

        let request = MintRequest::public(Address::from_low_u64(2), 1, Amount::from_ether_str("0.02").unwrap());
        assert!(service.mint(request.clone()).await.is_err());

        service.execute(|e| e.pause(owner, false)).await.unwrap();
        let receipt = service.clone().mint(request).await.unwrap();
        assert_eq!(receipt.token_ids, vec![1]);

        assert_eq!(service.supply_snapshot().await.minted, 1);
        assert!(!service.read(|e| e.is_paused()).await);
    }
}
