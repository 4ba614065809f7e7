use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::{Digest, HashCode};

/// A block of data identified by the cryptographic digest of its payload.
///
/// The key is computed exactly once, in [`Block::from_data`], and never
/// recomputed. A block may also exist as a key-only reference to content
/// that is not locally held; its data is then empty.
///
/// Constructing a block never touches a backing store; persistence is a
/// separate insert into a `BlockStore`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Block {
    key: Digest,
    data: Vec<u8>,
}

impl Block {
    /// Create a block by hashing a data payload.
    pub fn from_data(data: impl Into<Vec<u8>>, code: HashCode) -> Self {
        let data = data.into();
        let key = code.digest(&data);
        Self { key, data }
    }

    /// Create a key-only reference block. No hashing is performed.
    pub fn from_key(key: Digest) -> Self {
        Self {
            key,
            data: Vec::new(),
        }
    }

    /// Create a block from an existing key and payload.
    ///
    /// The caller is trusted that `key` is the correct digest of `data`;
    /// this is never re-validated. Reads from a block store reconstruct
    /// blocks this way without re-hashing.
    pub fn from_parts(key: Digest, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            data: data.into(),
        }
    }

    /// The unique identifier of the block.
    pub fn key(&self) -> &Digest {
        &self.key
    }

    /// The block payload. Empty for key-only reference blocks.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns `true` if the block carries no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decompose into `(key, data)`.
    pub fn into_parts(self) -> (Digest, Vec<u8>) {
        (self.key, self.data)
    }
}

// Ordering rule: a key-only block on either side forces key comparison, a
// key-less block on either side forces data comparison, otherwise keys
// decide. This stays a strict weak ordering even when some blocks are
// key-only, so blocks work as members of ordered sets.
impl Ord for Block {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs_key_only = self.data.is_empty() && !self.key.is_empty();
        let rhs_key_only = other.data.is_empty() && !other.key.is_empty();
        if lhs_key_only || rhs_key_only {
            self.key.cmp(&other.key)
        } else if self.key.is_empty() || other.key.is_empty() {
            self.data.cmp(&other.data)
        } else {
            self.key.cmp(&other.key)
        }
    }
}

impl PartialOrd for Block {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality is derived from the ordering: equal iff neither side orders
// before the other. Note `Hash` is intentionally not implemented; equality
// can ignore `data`, so a derived `Hash` would violate the Eq/Hash contract.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Block {}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("key", &self.key)
            .field("data_len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn key_is_digest_of_data() {
        let block = Block::from_data(&b"some data"[..], HashCode::Sha2_256);
        assert_eq!(*block.key(), HashCode::Sha2_256.digest(b"some data"));
        assert_eq!(block.data(), b"some data");
    }

    #[test]
    fn distinct_data_gives_distinct_blocks() {
        let a = Block::from_data(&b"some data"[..], HashCode::Sha2_256);
        let b = Block::from_data(&b"some other data"[..], HashCode::Sha2_256);
        assert_ne!(a, b);
    }

    #[test]
    fn matching_keys_compare_equal() {
        let a = Block::from_data(&b"some data"[..], HashCode::Sha2_256);
        let b = Block::from_data(&b"some other data"[..], HashCode::Sha2_256);
        // Same key, different data: keys decide.
        let b = Block::from_parts(a.key().clone(), b.data());
        assert_eq!(a, b);
    }

    #[test]
    fn key_only_reference_equals_full_block() {
        let a = Block::from_data(&b"some data"[..], HashCode::Sha2_256);
        let reference = Block::from_key(a.key().clone());
        assert_eq!(a, reference);
        assert_eq!(reference, a);
        assert!(reference.is_empty());
    }

    #[test]
    fn key_less_blocks_compare_by_data() {
        let a = Block::from_parts(Digest::empty(), &b"aaa"[..]);
        let b = Block::from_parts(Digest::empty(), &b"bbb"[..]);
        assert!(a < b);
        assert_ne!(a, b);
    }

    #[test]
    fn copy_preserves_identity() {
        let a = Block::from_data(&b"some data"[..], HashCode::Blake3);
        let a_copy = a.clone();
        assert_eq!(a_copy.key(), a.key());
        assert_eq!(a_copy.data(), a.data());
        assert_eq!(a, a_copy);
    }

    #[test]
    fn blocks_deduplicate_in_an_ordered_set() {
        let set: BTreeSet<Block> = ["a", "b", "c", "d", "a", "b"]
            .iter()
            .map(|s| Block::from_data(s.as_bytes(), HashCode::Sha2_256))
            .collect();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn set_lookup_by_key_only_block() {
        let mut set = BTreeSet::new();
        let block = Block::from_data(&b"some data"[..], HashCode::Sha2_256);
        set.insert(block.clone());
        assert!(set.contains(&Block::from_key(block.key().clone())));
    }

    #[test]
    fn from_parts_is_trusted() {
        // Wrong key on purpose: construction never re-validates.
        let block = Block::from_parts(HashCode::Sha2_256.digest(b"other"), &b"data"[..]);
        assert_eq!(block.data(), b"data");
    }

    #[test]
    fn into_parts_roundtrip() {
        let block = Block::from_data(&b"payload"[..], HashCode::Blake3);
        let expected_key = block.key().clone();
        let (key, data) = block.into_parts();
        assert_eq!(key, expected_key);
        assert_eq!(data, b"payload");
    }
}
