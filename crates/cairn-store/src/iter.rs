use std::fmt;

use crate::cursor::Cursor;
use crate::error::{StoreError, StoreResult};

/// A key/value entry as stored: raw bytes.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Backend-agnostic bidirectional iterator over a [`Cursor`].
///
/// The entry under the iterator is materialized lazily on first access and
/// cached until the next [`advance`](Iter::advance) or
/// [`retreat`](Iter::retreat). Cloning an iterator deep-copies the cursor
/// position, so two iterators advance independently.
///
/// Equality delegates to [`Cursor::equal`], except that two null iterators
/// (no cursor at all) compare equal without consulting a backend; an end
/// comparison must never require a live engine handle.
pub struct Iter {
    cursor: Option<Box<dyn Cursor>>,
    cached: Option<Entry>,
}

impl Iter {
    /// A null iterator. Equal to any other null iterator and to nothing
    /// else.
    pub fn sentinel() -> Self {
        Self {
            cursor: None,
            cached: None,
        }
    }

    /// Wrap a backend cursor. Backends hand out their own sentinel cursor
    /// for the end position.
    pub fn from_cursor(cursor: Box<dyn Cursor>) -> Self {
        Self {
            cursor: Some(cursor),
            cached: None,
        }
    }

    /// Returns `true` at the end position.
    pub fn is_end(&self) -> bool {
        self.cursor.as_ref().map_or(true, |c| c.is_end())
    }

    /// The entry at the current position, materialized on first access.
    pub fn entry(&mut self) -> StoreResult<&Entry> {
        if self.cached.is_none() {
            let cursor = self
                .cursor
                .as_ref()
                .ok_or_else(|| StoreError::NotFound("end iterator dereferenced".to_string()))?;
            self.cached = Some((cursor.key()?, cursor.value()?));
        }
        Ok(self.cached.as_ref().expect("entry cached above"))
    }

    /// The key at the current position.
    pub fn key(&mut self) -> StoreResult<Vec<u8>> {
        Ok(self.entry()?.0.clone())
    }

    /// The value at the current position.
    pub fn value(&mut self) -> StoreResult<Vec<u8>> {
        Ok(self.entry()?.1.clone())
    }

    /// Step to the next entry, invalidating the cached one.
    pub fn advance(&mut self) -> StoreResult<()> {
        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| StoreError::NotFound("end iterator advanced".to_string()))?;
        cursor.increment()?;
        self.cached = None;
        Ok(())
    }

    /// Step to the previous entry, invalidating the cached one.
    pub fn retreat(&mut self) -> StoreResult<()> {
        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| StoreError::NotFound("end iterator retreated".to_string()))?;
        cursor.decrement()?;
        self.cached = None;
        Ok(())
    }

    /// Borrow the underlying cursor, if any.
    pub fn cursor(&self) -> Option<&dyn Cursor> {
        self.cursor.as_deref()
    }

    /// Take the underlying cursor, consuming the iterator.
    pub fn into_cursor(self) -> Option<Box<dyn Cursor>> {
        self.cursor
    }
}

impl Default for Iter {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl Clone for Iter {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.as_ref().map(|c| c.clone_box()),
            cached: None,
        }
    }
}

impl PartialEq for Iter {
    fn eq(&self, other: &Self) -> bool {
        match (&self.cursor, &other.cursor) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equal(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Debug for Iter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("at_end", &self.is_end())
            .field("cached", &self.cached.is_some())
            .finish()
    }
}

/// `std::iter::Iterator` adapter over an [`Iter`], yielding owned entries
/// in the backend's key order.
pub struct Entries {
    it: Iter,
}

impl Entries {
    pub fn new(it: Iter) -> Self {
        Self { it }
    }
}

impl Iterator for Entries {
    type Item = StoreResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.it.is_end() {
            return None;
        }
        let entry = match self.it.entry() {
            Ok(entry) => entry.clone(),
            Err(e) => return Some(Err(e)),
        };
        if let Err(e) = self.it.advance() {
            return Some(Err(e));
        }
        Some(Ok(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_iterators_are_equal() {
        assert_eq!(Iter::sentinel(), Iter::sentinel());
        assert_eq!(Iter::default(), Iter::sentinel());
    }

    #[test]
    fn null_iterator_is_at_end() {
        assert!(Iter::sentinel().is_end());
    }

    #[test]
    fn dereferencing_a_null_iterator_is_not_found() {
        let mut it = Iter::sentinel();
        assert!(matches!(it.entry(), Err(StoreError::NotFound(_))));
        assert!(matches!(it.advance(), Err(StoreError::NotFound(_))));
        assert!(matches!(it.retreat(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn empty_entries_yields_nothing() {
        let mut entries = Entries::new(Iter::sentinel());
        assert!(entries.next().is_none());
    }
}
