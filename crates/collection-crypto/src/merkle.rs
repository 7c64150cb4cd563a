// collection-crypto/src/merkle.rs

use crate::{hash::keccak256, CryptoError, CryptoResult, Hash};
use serde::{Deserialize, Serialize};

/// Merkle tree over pre-hashed leaves with sorted-pair node hashing.
///
/// Layout is a complete binary tree of `2n - 1` nodes stored as a flat
/// array: root at 0, children of `i` at `2i + 1` and `2i + 2`. Leaves are
/// sorted ascending and written in reverse order to the tail of the array.
/// Because every parent hashes `min(a, b) || max(a, b)`, proofs carry no
/// left/right flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleTree {
    nodes: Vec<Hash>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build a tree from leaf hashes
    pub fn from_leaves(mut leaves: Vec<Hash>) -> CryptoResult<Self> {
        if leaves.is_empty() {
            return Err(CryptoError::MerkleError("Cannot create empty tree".into()));
        }

        leaves.sort();

        let leaf_count = leaves.len();
        let total_nodes = 2 * leaf_count - 1;
        let mut nodes = vec![Hash::zero(); total_nodes];

        for (i, leaf) in leaves.into_iter().enumerate() {
            nodes[total_nodes - 1 - i] = leaf;
        }

        for i in (0..total_nodes - leaf_count).rev() {
            nodes[i] = hash_pair(nodes[left_child(i)], nodes[right_child(i)]);
        }

        Ok(Self { nodes, leaf_count })
    }

    /// Rebuild a tree from a previously dumped node array, checking that
    /// every internal node is consistent with its children.
    pub fn from_nodes(nodes: Vec<Hash>) -> CryptoResult<Self> {
        if nodes.is_empty() || nodes.len() % 2 == 0 {
            return Err(CryptoError::MerkleError(format!(
                "Invalid node count {}", nodes.len()
            )));
        }

        let leaf_count = (nodes.len() + 1) / 2;
        for i in 0..nodes.len() - leaf_count {
            if nodes[i] != hash_pair(nodes[left_child(i)], nodes[right_child(i)]) {
                return Err(CryptoError::MerkleError(format!(
                    "Node {} does not match its children", i
                )));
            }
        }

        Ok(Self { nodes, leaf_count })
    }

    /// Get the root hash of the tree
    pub fn root(&self) -> Hash {
        self.nodes[0]
    }

    /// Get the number of leaves
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// All nodes in storage order
    pub fn nodes(&self) -> &[Hash] {
        &self.nodes
    }

    /// Position of `leaf` in the node array, if present
    pub fn tree_index_of(&self, leaf: &Hash) -> Option<usize> {
        (self.leaf_start()..self.nodes.len()).find(|&i| self.nodes[i] == *leaf)
    }

    /// Generate a proof for the leaf stored at `tree_index`
    pub fn proof(&self, tree_index: usize) -> CryptoResult<MerkleProof> {
        if tree_index < self.leaf_start() || tree_index >= self.nodes.len() {
            return Err(CryptoError::MerkleError(format!(
                "Index {} is not a leaf", tree_index
            )));
        }

        let mut siblings = Vec::new();
        let mut current = tree_index;
        while current > 0 {
            siblings.push(self.nodes[sibling_index(current)]);
            current = parent_index(current);
        }

        Ok(MerkleProof {
            tree_index,
            leaf: self.nodes[tree_index],
            siblings,
        })
    }

    /// Fold a leaf up through its proof
    pub fn process_proof(leaf: Hash, proof: &[Hash]) -> Hash {
        proof.iter().fold(leaf, |acc, sibling| hash_pair(acc, *sibling))
    }

    /// Verify a proof against a root
    pub fn verify(root: Hash, leaf: Hash, proof: &[Hash]) -> bool {
        Self::process_proof(leaf, proof) == root
    }

    fn leaf_start(&self) -> usize {
        self.nodes.len() - self.leaf_count
    }
}

/// Proof for a single leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    tree_index: usize,
    leaf: Hash,
    siblings: Vec<Hash>,
}

impl MerkleProof {
    pub fn tree_index(&self) -> usize {
        self.tree_index
    }

    pub fn leaf(&self) -> Hash {
        self.leaf
    }

    pub fn siblings(&self) -> &[Hash] {
        &self.siblings
    }

    pub fn into_siblings(self) -> Vec<Hash> {
        self.siblings
    }

    pub fn verify(&self, root: Hash) -> bool {
        MerkleTree::verify(root, self.leaf, &self.siblings)
    }
}

/// `keccak256(min(a, b) || max(a, b))`
pub fn hash_pair(a: Hash, b: Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(lo.as_bytes());
    combined[32..].copy_from_slice(hi.as_bytes());
    keccak256(&combined)
}

fn left_child(index: usize) -> usize {
    2 * index + 1
}

fn right_child(index: usize) -> usize {
    2 * index + 2
}

fn parent_index(index: usize) -> usize {
    (index - 1) / 2
}

fn sibling_index(index: usize) -> usize {
    if index % 2 == 0 {
        index - 1
    } else {
        index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hashable;
    use proptest::prelude::*;

    fn leaves(data: &[&[u8]]) -> Vec<Hash> {
        data.iter().map(|d| d.hash()).collect()
    }

    #[test]
    fn test_merkle_tree_basic() {
        let tree = MerkleTree::from_leaves(leaves(&[b"leaf1", b"leaf2", b"leaf3", b"leaf4"])).unwrap();

        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.nodes().len(), 7);
        assert_ne!(tree.root(), Hash::zero());
    }

    #[test]
    fn test_every_leaf_proves() {
        let input = leaves(&[b"apple", b"banana", b"cherry", b"dates", b"elder"]);
        let tree = MerkleTree::from_leaves(input.clone()).unwrap();

        for leaf in &input {
            let index = tree.tree_index_of(leaf).unwrap();
            let proof = tree.proof(index).unwrap();
            assert_eq!(proof.leaf(), *leaf);
            assert!(proof.verify(tree.root()));
        }
    }

    #[test]
    fn test_proof_rejects_other_leaf() {
        let input = leaves(&[b"apple", b"banana", b"cherry"]);
        let tree = MerkleTree::from_leaves(input.clone()).unwrap();

        let index = tree.tree_index_of(&input[0]).unwrap();
        let proof = tree.proof(index).unwrap();
        assert!(!MerkleTree::verify(tree.root(), b"invalid".hash(), proof.siblings()));
    }

    #[test]
    fn test_single_leaf() {
        let leaf = b"single".hash();
        let tree = MerkleTree::from_leaves(vec![leaf]).unwrap();
        let proof = tree.proof(0).unwrap();
        assert!(proof.siblings().is_empty());
        assert_eq!(tree.root(), leaf);
        assert!(proof.verify(tree.root()));
    }

    #[test]
    fn test_empty_tree_rejected() {
        assert!(MerkleTree::from_leaves(vec![]).is_err());
    }

    #[test]
    fn test_two_leaf_root_is_sorted_pair() {
        let a = b"a".hash();
        let b = b"b".hash();
        let tree = MerkleTree::from_leaves(vec![a, b]).unwrap();
        assert_eq!(tree.root(), hash_pair(a, b));
        assert_eq!(hash_pair(a, b), hash_pair(b, a));
    }

    #[test]
    fn test_leaf_order_does_not_change_root() {
        let forward = leaves(&[b"x", b"y", b"z"]);
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(
            MerkleTree::from_leaves(forward).unwrap().root(),
            MerkleTree::from_leaves(backward).unwrap().root()
        );
    }

    #[test]
    fn test_from_nodes_roundtrip_and_tamper() {
        let tree = MerkleTree::from_leaves(leaves(&[b"1", b"2", b"3"])).unwrap();
        let rebuilt = MerkleTree::from_nodes(tree.nodes().to_vec()).unwrap();
        assert_eq!(rebuilt.root(), tree.root());

        let mut tampered = tree.nodes().to_vec();
        let last = tampered.len() - 1;
        tampered[last] = b"evil".hash();
        assert!(MerkleTree::from_nodes(tampered).is_err());
        assert!(MerkleTree::from_nodes(vec![Hash::zero(); 2]).is_err());
    }

    #[test]
    fn test_proof_index_must_be_leaf() {
        let tree = MerkleTree::from_leaves(leaves(&[b"1", b"2", b"3"])).unwrap();
        assert!(tree.proof(0).is_err());
        assert!(tree.proof(5).is_err());
    }

    proptest! {
        #[test]
        fn prop_all_members_verify(data in proptest::collection::vec(any::<u64>(), 1..40)) {
            let input: Vec<Hash> = data.iter().map(|n| n.to_be_bytes().to_vec().hash()).collect();
            let tree = MerkleTree::from_leaves(input.clone()).unwrap();
            for leaf in &input {
                let index = tree.tree_index_of(leaf).unwrap();
                prop_assert!(tree.proof(index).unwrap().verify(tree.root()));
            }
        }
    }
}
