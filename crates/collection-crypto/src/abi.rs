// collection-crypto/src/abi.rs

//! Leaf encoding for `(address, uint256)` whitelist entries.
//!
//! Matches `abi.encode(address, uint256)`: the address left-padded to a
//! 32-byte word followed by the amount as a big-endian 32-byte word. The leaf
//! is the double Keccak-256 of that encoding.

use crate::{keccak256, Address, Hash};

/// `abi.encode(address, uint256)` for an allocation that fits in a u64
pub fn encode_address_uint(address: &Address, value: u64) -> [u8; 64] {
    let mut out = [0u8; 64];
    out[12..32].copy_from_slice(address.as_bytes());
    out[56..64].copy_from_slice(&value.to_be_bytes());
    out
}

/// Whitelist leaf hash: `keccak256(keccak256(abi.encode(address, allocation)))`
pub fn whitelist_leaf(address: &Address, allocation: u64) -> Hash {
    let encoded = encode_address_uint(address, allocation);
    keccak256(keccak256(&encoded).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_layout() {
        let address = Address::new([0xab; 20]);
        let encoded = encode_address_uint(&address, 0x0102);

        assert!(encoded[..12].iter().all(|b| *b == 0));
        assert!(encoded[12..32].iter().all(|b| *b == 0xab));
        assert!(encoded[32..62].iter().all(|b| *b == 0));
        assert_eq!(encoded[62], 0x01);
        assert_eq!(encoded[63], 0x02);
    }

    #[test]
    fn test_leaf_binds_allocation() {
        let address = Address::from_low_u64(7);
        assert_ne!(whitelist_leaf(&address, 1), whitelist_leaf(&address, 2));
        assert_ne!(
            whitelist_leaf(&address, 1),
            whitelist_leaf(&Address::from_low_u64(8), 1)
        );
    }

    #[test]
    fn test_leaf_matches_standard_merkle_tree() {
        let first = whitelist_leaf(&Address::new([0x11; 20]), 5_000_000_000_000_000_000);
        let second = whitelist_leaf(&Address::new([0x22; 20]), 2_500_000_000_000_000_000);

        assert_eq!(
            first.to_hex(),
            "0xeb02c421cfa48976e66dfb29120745909ea3a0f843456c263cf8f1253483e283"
        );
        assert_eq!(
            second.to_hex(),
            "0xb92c48e9d7abe27fd8dfd6b5dfdbfb1c9a463f80c712b66f3a5180a090cccafc"
        );
        assert_eq!(
            crate::merkle::hash_pair(first, second).to_hex(),
            "0xd4dee0beab2d53f2cc83e567171bd2820e49898130a22622b10ead383e90bd77"
        );
    }
}
