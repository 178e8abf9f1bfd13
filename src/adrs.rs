//! Hash addresses.
//!
//! Every keyed-hash invocation in the scheme carries an `Adrs`, a 32-byte
//! tag naming the structural role of that one call: which layer, which
//! tree, which leaf, which chain, which position in the chain. No two
//! semantically distinct hash calls during one key's lifetime may share
//! address bytes; this is what keeps the many thousands of hash calls
//! behind a single seed cryptographically independent.
//!
//! Addresses are cheap `Copy` values. Callers construct a fresh one per
//! hash invocation instead of threading a shared mutable address through
//! the call tree, so a stale field can never leak into an unrelated call.

use crate::utils::set_be;

/// The three address discriminants of RFC 8391.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AdrsType {
    /// Hashing along a WOTS+ chain (and expanding its secret starts).
    OtsHash = 0,
    /// Compressing a WOTS+ public key down to a leaf.
    Ltree = 1,
    /// Combining Merkle tree nodes.
    HashTree = 2,
}

/// A 32-byte (8 x u32, big-endian) domain-separation tag.
///
/// Word layout: 0 layer, 1-2 tree (64-bit), 3 type, 4 keypair/L-tree
/// address, 5 chain address or tree height, 6 hash address or tree index,
/// 7 key-and-mask selector.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Adrs {
    words: [u32; 8],
}

impl Adrs {
    /// Fresh address for the given role within `(layer, tree)`.
    pub fn new(adrs_type: AdrsType, layer: u32, tree: u64) -> Self {
        let mut adrs = Self::default();
        adrs.set_layer_addr(layer);
        adrs.set_tree_addr(tree);
        adrs.set_type(adrs_type);
        adrs
    }

    /// Which hypertree layer this invocation belongs to.
    pub fn set_layer_addr(&mut self, layer: u32) {
        self.words[0] = layer;
    }

    /// Which tree within the layer.
    pub fn set_tree_addr(&mut self, tree: u64) {
        self.words[1] = (tree >> 32) as u32;
        self.words[2] = tree as u32;
    }

    /// Switches the discriminant and zeroes every type-specific word.
    /// Skipping the zeroing would let a field from the previous role leak
    /// into the new one, which is a domain-separation bug.
    pub fn set_type(&mut self, adrs_type: AdrsType) {
        self.words[3] = adrs_type as u32;
        for word in &mut self.words[4..] {
            *word = 0;
        }
    }

    /// Which OTS keypair (Merkle leaf) is being worked on.
    pub fn set_keypair_addr(&mut self, keypair: u32) {
        self.words[4] = keypair;
    }

    /// Which leaf's WOTS+ public key an L-tree is compressing.
    pub fn set_ltree_addr(&mut self, ltree: u32) {
        self.words[4] = ltree;
    }

    /// Which WOTS+ chain within the keypair.
    pub fn set_chain_addr(&mut self, chain: u32) {
        self.words[5] = chain;
    }

    /// Position along the current chain.
    pub fn set_hash_addr(&mut self, hash: u32) {
        self.words[6] = hash;
    }

    /// Height of the children being combined in an L-tree or Merkle tree.
    pub fn set_tree_height(&mut self, height: u32) {
        self.words[5] = height;
    }

    /// Index of the node being produced at that height.
    pub fn set_tree_index(&mut self, index: u32) {
        self.words[6] = index;
    }

    /// Selects key (0) or bitmask (1, 2) derivation in the keyed hash.
    pub fn set_key_and_mask(&mut self, key_and_mask: u32) {
        self.words[7] = key_and_mask;
    }

    /// Serializes the eight words big-endian, ready to feed a hash.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, word) in self.words.iter().enumerate() {
            set_be(&mut bytes[4 * i..4 * (i + 1)], u64::from(*word));
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_layout() {
        let mut adrs = Adrs::new(AdrsType::HashTree, 1, 0x0102_0304_0506_0708);
        adrs.set_tree_height(3);
        adrs.set_tree_index(0x0a0b);

        let bytes = adrs.to_bytes();
        assert_eq!(&bytes[..4], &[0, 0, 0, 1]);
        assert_eq!(&bytes[4..12], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 2]);
        assert_eq!(&bytes[20..24], &[0, 0, 0, 3]);
        assert_eq!(&bytes[24..28], &[0, 0, 0x0a, 0x0b]);
    }

    #[test]
    fn test_set_type_clears_stale_fields() {
        let mut adrs = Adrs::new(AdrsType::OtsHash, 0, 7);
        adrs.set_keypair_addr(5);
        adrs.set_chain_addr(9);
        adrs.set_hash_addr(11);
        adrs.set_key_and_mask(1);

        adrs.set_type(AdrsType::Ltree);
        let mut expected = Adrs::new(AdrsType::Ltree, 0, 7);
        assert_eq!(adrs, expected);

        // The layer and tree survive a type switch.
        expected.set_ltree_addr(5);
        adrs.set_ltree_addr(5);
        assert_eq!(adrs, expected);
    }

    #[test]
    fn test_distinct_roles_never_collide() {
        let ots = Adrs::new(AdrsType::OtsHash, 0, 0);
        let ltree = Adrs::new(AdrsType::Ltree, 0, 0);
        let tree = Adrs::new(AdrsType::HashTree, 0, 0);
        assert_ne!(ots.to_bytes(), ltree.to_bytes());
        assert_ne!(ltree.to_bytes(), tree.to_bytes());
    }
}
