use crate::cursor::Cursor;
use crate::error::{StoreError, StoreResult};
use crate::iter::{Entries, Iter};

/// Ordered, byte-keyed, mutable key/value store.
///
/// Backends implement six primitives ([`first`](Datastore::first),
/// [`last`](Datastore::last), [`lookup`](Datastore::lookup),
/// [`insert_at`](Datastore::insert_at), [`erase_at`](Datastore::erase_at)
/// and [`capacity`](Datastore::capacity)), and every derived operation is
/// implemented once, generically, on top of them. Keys are unique within a
/// store; entry order is backend-defined (both shipped backends order keys
/// lexicographically).
///
/// A `Datastore` handle is single-threaded by contract. Callers that need
/// concurrency create separate handles or serialize access externally.
pub trait Datastore {
    /// Cursor at the first live entry, or the sentinel if the store is
    /// empty. "No entries" is a normal outcome, never an error.
    fn first(&self) -> StoreResult<Box<dyn Cursor>>;

    /// The sentinel cursor. Holds no engine state.
    fn last(&self) -> StoreResult<Box<dyn Cursor>>;

    /// Cursor at the entry with exactly `key`, or the sentinel if absent.
    fn lookup(&self, key: &[u8]) -> StoreResult<Box<dyn Cursor>>;

    /// Insert `(key, value)` and return a cursor at the inserted entry.
    ///
    /// `pos` is a purely advisory position hint; backends may use it to
    /// amortize nearby insertions or ignore it entirely. Uniqueness is
    /// enforced by the derived [`insert`](Datastore::insert), not here.
    fn insert_at(
        &mut self,
        pos: Box<dyn Cursor>,
        key: &[u8],
        value: &[u8],
    ) -> StoreResult<Box<dyn Cursor>>;

    /// Remove the entry under `pos` and return a cursor at the following
    /// entry (or the sentinel if it was the last one).
    fn erase_at(&mut self, pos: Box<dyn Cursor>) -> StoreResult<Box<dyn Cursor>>;

    /// Theoretical maximum number of entries the backend can hold.
    fn capacity(&self) -> StoreResult<u64>;

    // ------------------------------------------------------------------
    // Derived operations
    // ------------------------------------------------------------------

    /// Iterator over the first live entry, or the end iterator when the
    /// store is empty.
    fn begin(&self) -> StoreResult<Iter> {
        Ok(Iter::from_cursor(self.first()?))
    }

    /// The end iterator.
    fn end(&self) -> StoreResult<Iter> {
        Ok(Iter::from_cursor(self.last()?))
    }

    /// Iterator at the matching entry, or the end iterator if absent.
    /// Never an error for "not found".
    fn find(&self, key: &[u8]) -> StoreResult<Iter> {
        Ok(Iter::from_cursor(self.lookup(key)?))
    }

    /// Insert an entry. Returns `(iterator, true)` on insertion, or
    /// `(iterator-to-existing, false)` when the key is already present.
    /// Never creates duplicate keys.
    fn insert(&mut self, key: &[u8], value: &[u8]) -> StoreResult<(Iter, bool)> {
        let found = self.find(key)?;
        if !found.is_end() {
            return Ok((found, false));
        }
        let hint = match found.into_cursor() {
            Some(cursor) => cursor,
            None => self.last()?,
        };
        let cursor = self.insert_at(hint, key, value)?;
        Ok((Iter::from_cursor(cursor), true))
    }

    /// Position-hinted insert. The hint is advisory only: a real lookup
    /// always runs first, so a stale or foreign hint can cost a lookup but
    /// never corrupt the store. Returns an iterator at the entry.
    fn insert_hint(&mut self, pos: Iter, key: &[u8], value: &[u8]) -> StoreResult<Iter> {
        let existing = self.find(key)?;
        if !existing.is_end() {
            return Ok(existing);
        }
        let hint = match pos.into_cursor() {
            Some(cursor) => cursor,
            None => self.last()?,
        };
        Ok(Iter::from_cursor(self.insert_at(hint, key, value)?))
    }

    /// Remove the entry with `key` if present. Returns the number of
    /// entries removed (0 or 1).
    fn erase(&mut self, key: &[u8]) -> StoreResult<u64> {
        let it = self.find(key)?;
        if it.is_end() {
            return Ok(0);
        }
        self.erase_entry(it)?;
        Ok(1)
    }

    /// Remove the entry under `pos`, consuming it, and return an iterator
    /// at the following entry, so iterate-while-erasing keeps a valid
    /// position.
    fn erase_entry(&mut self, pos: Iter) -> StoreResult<Iter> {
        if pos.is_end() {
            return Err(StoreError::InvalidArgument(
                "cannot erase through an end iterator".to_string(),
            ));
        }
        let cursor = pos.into_cursor().ok_or_else(|| {
            StoreError::InvalidArgument("cannot erase through a null iterator".to_string())
        })?;
        Ok(Iter::from_cursor(self.erase_at(cursor)?))
    }

    /// The value stored under `key`. Fails with
    /// [`StoreError::NotFound`] if absent; never mutates the store.
    fn get(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        let mut it = self.find(key)?;
        if it.is_end() {
            return Err(StoreError::NotFound(hex::encode(key)));
        }
        it.value()
    }

    /// Returns `true` if an entry with `key` exists.
    fn contains(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(!self.find(key)?.is_end())
    }

    /// Remove all entries by repeatedly erasing the first one. Not atomic;
    /// a backend wanting atomic truncation overrides this.
    fn clear(&mut self) -> StoreResult<()> {
        loop {
            let it = self.begin()?;
            if it.is_end() {
                return Ok(());
            }
            self.erase_entry(it)?;
        }
    }

    /// Number of entries. Defaults to counting a full traversal; backends
    /// with an O(1) statistic override this.
    fn len(&self) -> StoreResult<u64> {
        let mut count = 0;
        let mut it = self.begin()?;
        while !it.is_end() {
            count += 1;
            it.advance()?;
        }
        Ok(count)
    }

    /// Returns `true` if the store has no entries.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.begin()?.is_end())
    }

    /// Maximum possible number of entries.
    fn max_size(&self) -> StoreResult<u64> {
        self.capacity()
    }

    /// Owned-entry iterator from the first entry, in the backend's key
    /// order.
    fn iter(&self) -> StoreResult<Entries> {
        Ok(Entries::new(self.begin()?))
    }
}
