// mint-engine/src/whitelist.rs

//! Whitelist eligibility: the on-chain verifier and the offline tree builder.
//!
//! Trees use the `standard-v1` layout with leaf encoding
//! `["address", "uint256"]`, so roots and proofs interoperate with
//! OpenZeppelin's `StandardMerkleTree`.

use crate::{MintError, MintResult};
use collection_crypto::{whitelist_leaf, Address, CryptoError, Hash, MerkleTree};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

pub const DUMP_FORMAT: &str = "standard-v1";

/// Verifier state: the current root plus an explicit address list
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    root: Option<Hash>,
    listed: HashSet<Address>,
}

impl Whitelist {
    pub fn new(root: Option<Hash>) -> Self {
        let mut whitelist = Self::default();
        whitelist.set_root(root);
        whitelist
    }

    pub fn root(&self) -> Option<Hash> {
        self.root
    }

    /// Replace the root. A zero root disables proof-based minting.
    pub fn set_root(&mut self, root: Option<Hash>) {
        self.root = root.filter(|r| !r.is_zero());
    }

    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    /// Check that `(address, allocation)` is committed to by the current root
    pub fn verify(&self, proof: &[Hash], address: &Address, allocation: u64) -> bool {
        match self.root {
            Some(root) => MerkleTree::verify(root, whitelist_leaf(address, allocation), proof),
            None => false,
        }
    }

    pub fn add_listed(&mut self, account: Address) -> bool {
        self.listed.insert(account)
    }

    pub fn remove_listed(&mut self, account: &Address) -> bool {
        self.listed.remove(account)
    }

    pub fn is_listed(&self, account: &Address) -> bool {
        self.listed.contains(account)
    }
}

/// One `(address, allocation)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub address: Address,
    pub allocation: u64,
}

impl WhitelistEntry {
    pub fn new(address: Address, allocation: u64) -> Self {
        Self { address, allocation }
    }

    pub fn leaf(&self) -> Hash {
        whitelist_leaf(&self.address, self.allocation)
    }
}

/// Uint values appear as JSON numbers or decimal strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UintValue {
    Number(u64),
    Text(String),
}

impl UintValue {
    pub fn to_u64(&self) -> MintResult<u64> {
        match self {
            UintValue::Number(n) => Ok(*n),
            UintValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| MintError::InvalidAmount(format!("'{}' is not a u64 allocation", s))),
        }
    }
}

/// Parse a whitelist file: a JSON array of `[address, allocation]` pairs
pub fn parse_whitelist_json(json: &str) -> MintResult<Vec<WhitelistEntry>> {
    let raw: Vec<(Address, UintValue)> = serde_json::from_str(json)
        .map_err(|e| CryptoError::DeserializationError(e.to_string()))?;

    raw.into_iter()
        .map(|(address, allocation)| -> MintResult<WhitelistEntry> {
            Ok(WhitelistEntry::new(address, allocation.to_u64()?))
        })
        .collect()
}

/// Serialized tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistTreeDump {
    pub format: String,
    #[serde(rename = "leafEncoding")]
    pub leaf_encoding: Vec<String>,
    pub tree: Vec<Hash>,
    pub values: Vec<DumpValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpValue {
    pub value: (Address, UintValue),
    #[serde(rename = "treeIndex")]
    pub tree_index: usize,
}

/// Tree over whitelist entries, remembering where each entry landed
#[derive(Debug, Clone)]
pub struct WhitelistTree {
    tree: MerkleTree,
    entries: Vec<(WhitelistEntry, usize)>,
}

impl WhitelistTree {
    pub fn build(entries: Vec<WhitelistEntry>) -> MintResult<Self> {
        let tree = MerkleTree::from_leaves(entries.iter().map(WhitelistEntry::leaf).collect())?;

        // Leaves sit at the tail in reverse sorted order; equal leaves keep
        // input order, the first claiming the highest slot.
        let nodes = tree.nodes();
        let leaf_start = nodes.len() - tree.leaf_count();
        let mut slots: HashMap<Hash, VecDeque<usize>> = HashMap::new();
        for index in (leaf_start..nodes.len()).rev() {
            slots.entry(nodes[index]).or_default().push_back(index);
        }

        let mut indexed = Vec::with_capacity(entries.len());
        for entry in entries {
            let index = slots
                .get_mut(&entry.leaf())
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| CryptoError::MerkleError("leaf missing from tree".into()))?;
            indexed.push((entry, index));
        }

        Ok(Self {
            tree,
            entries: indexed,
        })
    }

    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &WhitelistEntry> {
        self.entries.iter().map(|(entry, _)| entry)
    }

    /// Proof for the first entry belonging to `address`
    pub fn proof_for(&self, address: &Address) -> Option<(WhitelistEntry, Vec<Hash>)> {
        let (entry, index) = self.entries.iter().find(|(e, _)| e.address == *address)?;
        let proof = self.tree.proof(*index).ok()?;
        Some((*entry, proof.into_siblings()))
    }

    pub fn dump(&self) -> WhitelistTreeDump {
        WhitelistTreeDump {
            format: DUMP_FORMAT.into(),
            leaf_encoding: vec!["address".into(), "uint256".into()],
            tree: self.tree.nodes().to_vec(),
            values: self
                .entries
                .iter()
                .map(|(entry, index)| DumpValue {
                    value: (entry.address, UintValue::Text(entry.allocation.to_string())),
                    tree_index: *index,
                })
                .collect(),
        }
    }

    /// Load a dump, checking the tree and every value against it
    pub fn load(dump: WhitelistTreeDump) -> MintResult<Self> {
        if dump.format != DUMP_FORMAT {
            return Err(CryptoError::DeserializationError(format!(
                "unknown tree format '{}'", dump.format
            ))
            .into());
        }
        if dump.leaf_encoding != ["address", "uint256"] {
            return Err(CryptoError::DeserializationError(format!(
                "unsupported leaf encoding {:?}", dump.leaf_encoding
            ))
            .into());
        }

        let tree = MerkleTree::from_nodes(dump.tree)?;
        let mut entries = Vec::with_capacity(dump.values.len());
        for value in dump.values {
            let allocation = value.value.1.to_u64()?;
            let entry = WhitelistEntry::new(value.value.0, allocation);
            let stored = tree.nodes().get(value.tree_index).copied();
            if stored != Some(entry.leaf()) {
                return Err(CryptoError::MerkleError(format!(
                    "value for {} does not match tree index {}",
                    entry.address, value.tree_index
                ))
                .into());
            }
            entries.push((entry, value.tree_index));
        }

        Ok(Self { tree, entries })
    }
}
