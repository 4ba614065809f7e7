use cairn_types::{Block, Digest};

use crate::datastore::Datastore;
use crate::error::StoreResult;
use crate::iter::Entries;

/// Content-addressed façade over any [`Datastore`].
///
/// Blocks are keyed by their digest bytes; the payload is stored verbatim.
/// The store never re-hashes on the way out: a block read back is
/// reassembled from the stored key and data exactly as they were written,
/// so a caller that inserted an unverified block gets the same unverified
/// block back.
pub struct BlockStore {
    store: Box<dyn Datastore>,
}

impl BlockStore {
    /// Wrap a backend. The backend's existing entries are interpreted as
    /// blocks.
    pub fn new(store: Box<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Insert a block. Returns `true` on insertion, `false` when a block
    /// with the same key already exists (the stored payload is left
    /// untouched).
    pub fn insert(&mut self, block: &Block) -> StoreResult<bool> {
        let (_, inserted) = self.store.insert(block.key().as_bytes(), block.data())?;
        Ok(inserted)
    }

    /// Look up the block matching `block`'s key. Key-only lookup blocks
    /// compare equal to the stored full block, so any `Block` with the
    /// right digest finds it.
    pub fn find(&self, block: &Block) -> StoreResult<Option<Block>> {
        let mut it = self.store.find(block.key().as_bytes())?;
        if it.is_end() {
            return Ok(None);
        }
        let (key, data) = it.entry()?.clone();
        Ok(Some(Block::from_parts(Digest::from_bytes(&key), data)))
    }

    /// Returns `true` if a block with `block`'s key is stored.
    pub fn contains(&self, block: &Block) -> StoreResult<bool> {
        self.store.contains(block.key().as_bytes())
    }

    /// Remove the block with `block`'s key if present. Returns the number
    /// of blocks removed (0 or 1).
    pub fn erase(&mut self, block: &Block) -> StoreResult<u64> {
        self.store.erase(block.key().as_bytes())
    }

    /// Number of stored blocks.
    pub fn len(&self) -> StoreResult<u64> {
        self.store.len()
    }

    /// Returns `true` if no blocks are stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.store.is_empty()
    }

    /// Maximum number of blocks the backend can hold.
    pub fn max_size(&self) -> StoreResult<u64> {
        self.store.max_size()
    }

    /// Remove all blocks.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.store.clear()
    }

    /// Iterator over stored blocks in digest order.
    pub fn iter(&self) -> StoreResult<Blocks> {
        Ok(Blocks {
            entries: self.store.iter()?,
        })
    }
}

impl std::fmt::Debug for BlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockStore").finish_non_exhaustive()
    }
}

/// Iterator over the blocks of a [`BlockStore`], in digest order.
pub struct Blocks {
    entries: Entries,
}

impl Iterator for Blocks {
    type Item = StoreResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(entry.map(|(key, data)| Block::from_parts(Digest::from_bytes(&key), data)))
    }
}
