use std::any::Any;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use crate::cursor::Cursor;
use crate::datastore::Datastore;
use crate::error::{StoreError, StoreResult};

type SharedMap = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

/// In-memory, ordered-map-backed datastore.
///
/// Entries live in a `BTreeMap` (lexicographic key order) behind an
/// `RwLock`. Cursors hold a shared handle to the map plus an owned position
/// key, so they never dangle regardless of store mutation; a cursor whose
/// entry has been erased simply reports `NotFound` on dereference.
///
/// Process lifetime only; nothing is persisted.
pub struct MemoryStore {
    data: SharedMap,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    fn cursor(&self, position: Option<Vec<u8>>) -> Box<dyn Cursor> {
        Box::new(MemoryCursor {
            data: Arc::clone(&self.data),
            position,
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.data.read().expect("lock poisoned").len();
        f.debug_struct("MemoryStore")
            .field("entry_count", &count)
            .finish()
    }
}

impl Datastore for MemoryStore {
    fn first(&self) -> StoreResult<Box<dyn Cursor>> {
        let position = self.data.read().expect("lock poisoned").keys().next().cloned();
        Ok(self.cursor(position))
    }

    fn last(&self) -> StoreResult<Box<dyn Cursor>> {
        Ok(self.cursor(None))
    }

    fn lookup(&self, key: &[u8]) -> StoreResult<Box<dyn Cursor>> {
        let position = self
            .data
            .read()
            .expect("lock poisoned")
            .contains_key(key)
            .then(|| key.to_vec());
        Ok(self.cursor(position))
    }

    fn insert_at(
        &mut self,
        _pos: Box<dyn Cursor>,
        key: &[u8],
        value: &[u8],
    ) -> StoreResult<Box<dyn Cursor>> {
        // BTreeMap has no position-hint API; the hint is advisory and
        // simply dropped.
        self.data
            .write()
            .expect("lock poisoned")
            .insert(key.to_vec(), value.to_vec());
        Ok(self.cursor(Some(key.to_vec())))
    }

    fn erase_at(&mut self, pos: Box<dyn Cursor>) -> StoreResult<Box<dyn Cursor>> {
        let cursor = pos
            .as_any()
            .downcast_ref::<MemoryCursor>()
            .filter(|c| Arc::ptr_eq(&c.data, &self.data))
            .ok_or_else(|| {
                StoreError::InvalidArgument("cursor does not belong to this store".to_string())
            })?;
        let key = cursor.position.clone().ok_or_else(|| {
            StoreError::InvalidArgument("cannot erase at the end cursor".to_string())
        })?;
        let mut map = self.data.write().expect("lock poisoned");
        let next = map
            .range::<[u8], _>((Bound::Excluded(key.as_slice()), Bound::Unbounded))
            .next()
            .map(|(k, _)| k.clone());
        map.remove(&key);
        Ok(self.cursor(next))
    }

    fn capacity(&self) -> StoreResult<u64> {
        Ok(u64::MAX)
    }
}

/// Cursor over a [`MemoryStore`]: a shared map handle plus the key it is
/// positioned at (`None` = sentinel).
struct MemoryCursor {
    data: SharedMap,
    position: Option<Vec<u8>>,
}

impl Cursor for MemoryCursor {
    fn key(&self) -> StoreResult<Vec<u8>> {
        self.position
            .clone()
            .ok_or_else(|| StoreError::NotFound("cursor at end".to_string()))
    }

    fn value(&self) -> StoreResult<Vec<u8>> {
        let key = self
            .position
            .as_ref()
            .ok_or_else(|| StoreError::NotFound("cursor at end".to_string()))?;
        self.data
            .read()
            .expect("lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(hex::encode(key)))
    }

    fn is_end(&self) -> bool {
        self.position.is_none()
    }

    fn equal(&self, other: &dyn Cursor) -> bool {
        match other.as_any().downcast_ref::<MemoryCursor>() {
            Some(other) => Arc::ptr_eq(&self.data, &other.data) && self.position == other.position,
            None => false,
        }
    }

    fn increment(&mut self) -> StoreResult<()> {
        let key = self
            .position
            .take()
            .ok_or_else(|| StoreError::NotFound("cursor advanced past the end".to_string()))?;
        self.position = self
            .data
            .read()
            .expect("lock poisoned")
            .range::<[u8], _>((Bound::Excluded(key.as_slice()), Bound::Unbounded))
            .next()
            .map(|(k, _)| k.clone());
        Ok(())
    }

    fn decrement(&mut self) -> StoreResult<()> {
        let map = self.data.read().expect("lock poisoned");
        match self.position.take() {
            // Stepping before the first entry lands on the sentinel, the
            // mirror of running off the end.
            Some(key) => {
                self.position = map
                    .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key.as_slice())))
                    .next_back()
                    .map(|(k, _)| k.clone());
                Ok(())
            }
            // The sentinel steps back onto the last entry, like the native
            // ordered container.
            None => match map.keys().next_back().cloned() {
                Some(last) => {
                    self.position = Some(last);
                    Ok(())
                }
                None => Err(StoreError::NotFound(
                    "cursor retreated past the beginning".to_string(),
                )),
            },
        }
    }

    fn clone_box(&self) -> Box<dyn Cursor> {
        Box::new(MemoryCursor {
            data: Arc::clone(&self.data),
            position: self.position.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
