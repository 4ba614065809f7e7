use std::marker::PhantomData;

use crate::codec::{Codec, TextCodec};
use crate::datastore::Datastore;
use crate::error::StoreResult;

/// Typed set view over a [`Datastore`].
///
/// Elements are stored as encoded keys with empty values. Like
/// [`crate::TypedMap`], iteration follows the byte order of the encoded
/// elements.
pub struct TypedSet<'a, K, KC = TextCodec<K>> {
    store: &'a mut dyn Datastore,
    codec: KC,
    _marker: PhantomData<fn() -> K>,
}

impl<'a, K> TypedSet<'a, K>
where
    TextCodec<K>: Codec<K>,
{
    /// Set view with a text codec.
    pub fn new(store: &'a mut dyn Datastore) -> Self {
        Self::with_codec(store, TextCodec::new())
    }
}

impl<'a, K, KC> TypedSet<'a, K, KC>
where
    KC: Codec<K>,
{
    /// Set view with an explicit codec.
    pub fn with_codec(store: &'a mut dyn Datastore, codec: KC) -> Self {
        Self {
            store,
            codec,
            _marker: PhantomData,
        }
    }

    /// Insert an element. Returns `true` on insertion, `false` when it is
    /// already present.
    pub fn insert(&mut self, element: &K) -> StoreResult<bool> {
        let key = self.codec.encode(element)?;
        let (_, inserted) = self.store.insert(&key, &[])?;
        Ok(inserted)
    }

    /// Returns `true` if `element` is in the set.
    pub fn contains(&self, element: &K) -> StoreResult<bool> {
        self.store.contains(&self.codec.encode(element)?)
    }

    /// Remove `element` if present. Returns the number of elements removed
    /// (0 or 1).
    pub fn erase(&mut self, element: &K) -> StoreResult<u64> {
        self.store.erase(&self.codec.encode(element)?)
    }

    /// Number of elements.
    pub fn len(&self) -> StoreResult<u64> {
        self.store.len()
    }

    /// Returns `true` if the set has no elements.
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.store.is_empty()
    }

    /// Remove all elements.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.store.clear()
    }

    /// Iterator over decoded elements, in encoded byte order.
    pub fn iter(&self) -> StoreResult<impl Iterator<Item = StoreResult<K>> + use<'_, 'a, K, KC>> {
        let entries = self.store.iter()?;
        Ok(entries.map(move |entry| {
            let (key, _) = entry?;
            self.codec.decode(&key)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn insert_contains_erase() {
        let mut store = MemoryStore::new();
        let mut set: TypedSet<u32> = TypedSet::new(&mut store);
        assert!(set.insert(&5).unwrap());
        assert!(!set.insert(&5).unwrap());
        assert!(set.contains(&5).unwrap());
        assert_eq!(set.erase(&5).unwrap(), 1);
        assert!(!set.contains(&5).unwrap());
    }

    #[test]
    fn elements_are_stored_with_empty_values() {
        let mut store = MemoryStore::new();
        {
            let mut set: TypedSet<u32> = TypedSet::new(&mut store);
            set.insert(&7).unwrap();
        }
        assert_eq!(store.get(b"7").unwrap(), b"");
    }

    #[test]
    fn iteration_decodes_every_element() {
        let mut store = MemoryStore::new();
        let mut set: TypedSet<u32> = TypedSet::new(&mut store);
        for x in [3u32, 1, 2] {
            set.insert(&x).unwrap();
        }
        let mut seen: Vec<u32> = set.iter().unwrap().map(|e| e.unwrap()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
