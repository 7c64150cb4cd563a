// collection-crypto/src/lib.rs

//! Cryptographic primitives for the collection minting engine
//!
//! This crate provides:
//! - Keccak-256 hashing
//! - 20-byte account addresses
//! - ABI-style leaf encoding for whitelist entries
//! - Sorted-pair Merkle tree construction and proof verification

pub mod abi;
pub mod address;
pub mod hash;
pub mod merkle;

pub use abi::{encode_address_uint, whitelist_leaf};
pub use address::Address;
pub use hash::{keccak256, Hash, Hashable, HASH_SIZE};
pub use merkle::{MerkleProof, MerkleTree};

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid hash")]
    InvalidHash,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Merkle tree error: {0}")]
    MerkleError(String),
}
