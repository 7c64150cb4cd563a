use mint_engine::{
    Address, Amount, CollectionSettings, InMemoryLedger, MintConfig, MintEngine, MintError,
    MintRequest, Role, WhitelistClaim, WhitelistEntry, WhitelistTree,
};
use proptest::prelude::*;

const OWNER: u64 = 1;

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn engine(max_supply: u64, mint: MintConfig) -> MintEngine<InMemoryLedger> {
    let settings = CollectionSettings {
        max_supply,
        start_paused: false,
        mint,
        ..CollectionSettings::default()
    };
    MintEngine::new(addr(OWNER), settings, InMemoryLedger::new()).unwrap()
}

/// (tier selector, payer, amount)
fn mint_op() -> impl Strategy<Value = (u8, u64, u64)> {
    (0u8..5, 1u64..6, 0u64..8)
}

proptest! {
    #[test]
    fn prop_minted_never_exceeds_caps(
        max_supply in 1u64..40,
        per_tx in 1u64..6,
        per_address in 1u64..10,
        founder_cap in 1u64..6,
        owner_cap in 1u64..10,
        listed in 1u64..5,
        proof_allocations in proptest::collection::vec(1u64..6, 4),
        ops in proptest::collection::vec(mint_op(), 1..60),
    ) {
        let config = MintConfig {
            price: Amount::from_u64(10),
            founders_price: Amount::from_u64(5),
            whitelist_price: Amount::from_u64(7),
            max_mint_amount: per_tx,
            nft_per_address_limit: per_address,
            owner_nft_limit: owner_cap,
            founder_mint_limit: founder_cap,
            listed_allocation: listed,
        };
        let mut engine = engine(max_supply, config);
        engine.add_founders(addr(OWNER), &[addr(2), addr(3)]).unwrap();
        engine.whitelist_users(addr(OWNER), &[addr(3), addr(4)]).unwrap();

        // addresses 2..=5 hold proof allocations; the owner is left out
        let entries: Vec<_> = proof_allocations
            .iter()
            .enumerate()
            .map(|(i, a)| WhitelistEntry::new(addr(2 + i as u64), *a))
            .collect();
        let tree = WhitelistTree::build(entries).unwrap();
        engine.set_whitelist_root(addr(OWNER), Some(tree.root())).unwrap();

        for (tier, payer, amount) in ops {
            let payer = addr(payer);
            let value = Amount::from_u64(10 * amount);
            let request = match tier {
                0 => MintRequest::owner(payer, amount),
                1 => MintRequest::founder(payer, amount, value),
                2 => MintRequest::whitelist(payer, amount, value, WhitelistClaim::Listed),
                3 => {
                    let claim = match tree.proof_for(&payer) {
                        Some((entry, proof)) => WhitelistClaim::Proof { proof, allocation: entry.allocation },
                        None => WhitelistClaim::Proof { proof: vec![], allocation: amount },
                    };
                    MintRequest::whitelist(payer, amount, value, claim)
                }
                _ => MintRequest::public(payer, amount, value),
            };
            let before = engine.total_minted();
            match engine.mint(request) {
                Ok(receipt) => prop_assert_eq!(engine.total_minted(), before + receipt.token_ids.len() as u64),
                Err(_) => prop_assert_eq!(engine.total_minted(), before),
            }
            prop_assert!(engine.total_minted() <= engine.max_supply());
        }

        for n in 1..6 {
            let counters = engine.counters(&addr(n));
            prop_assert!(counters.owner_minted <= owner_cap);
            prop_assert!(counters.founder_minted <= founder_cap);
            let proof_allocation = tree.proof_for(&addr(n)).map(|(e, _)| e.allocation).unwrap_or(0);
            prop_assert!(counters.whitelist_minted <= listed.max(proof_allocation));
            prop_assert!(counters.public_minted <= per_address);
        }
        prop_assert_eq!(engine.ledger().total_supply(), engine.total_minted());
    }

    #[test]
    fn prop_zero_amount_always_rejected(tier in 0u8..4, payer in 1u64..5) {
        let mut engine = engine(100, MintConfig::default());
        engine.add_founders(addr(OWNER), &[addr(payer)]).unwrap();
        let request = match tier {
            0 => MintRequest::owner(addr(payer), 0),
            1 => MintRequest::founder(addr(payer), 0, Amount::zero()),
            2 => MintRequest::whitelist(addr(payer), 0, Amount::zero(), WhitelistClaim::Listed),
            _ => MintRequest::public(addr(payer), 0, Amount::zero()),
        };
        prop_assert!(matches!(engine.mint(request), Err(MintError::ZeroAmount)));
    }

    #[test]
    fn prop_verify_iff_member(
        allocations in proptest::collection::vec(1u64..10, 1..20),
        outsider in 1000u64..2000,
    ) {
        let entries: Vec<_> = allocations
            .iter()
            .enumerate()
            .map(|(i, a)| WhitelistEntry::new(addr(100 + i as u64), *a))
            .collect();
        let tree = WhitelistTree::build(entries.clone()).unwrap();

        let mut engine = engine(100, MintConfig::default());
        engine.set_whitelist_root(addr(OWNER), Some(tree.root())).unwrap();

        for entry in &entries {
            let (_, proof) = tree.proof_for(&entry.address).unwrap();
            prop_assert!(engine.verify_whitelist(&proof, &entry.address, entry.allocation));
            prop_assert!(!engine.verify_whitelist(&proof, &entry.address, entry.allocation + 1));
            prop_assert!(!engine.verify_whitelist(&proof, &addr(outsider), entry.allocation));
        }
    }

    #[test]
    fn prop_role_grants_are_idempotent(grants in proptest::collection::vec((0u8..3, 2u64..8), 1..30)) {
        let mut engine = engine(100, MintConfig::default());
        for (role, account) in grants {
            let role = match role {
                0 => Role::Owner,
                1 => Role::AuxAdmin,
                _ => Role::Founder,
            };
            engine.grant_role(addr(OWNER), role, addr(account)).unwrap();
            let members = engine.role_members(role);
            engine.grant_role(addr(OWNER), role, addr(account)).unwrap();
            prop_assert_eq!(engine.role_members(role), members);
            prop_assert!(engine.has_role(role, &addr(account)));
        }
    }

    #[test]
    fn prop_payment_below_price_rejected(amount in 1u64..10, short in 1u64..10) {
        let mut engine = engine(100, MintConfig::default());
        let price = engine.price().times(amount);
        let value = price.checked_sub(&Amount::from_u64(short)).unwrap();
        let rejected = matches!(
            engine.mint(MintRequest::public(addr(9), amount, value)),
            Err(MintError::InsufficientFunds { .. })
        );
        prop_assert!(rejected);
        prop_assert!(engine.balance().is_zero());
    }
}
