use std::marker::PhantomData;

use crate::codec::{Codec, PairCodec, TextCodec};
use crate::datastore::Datastore;
use crate::error::StoreResult;

/// Typed map view over a [`Datastore`].
///
/// Keys and values pass through codecs on every access; the underlying
/// store only ever sees bytes. Entry order follows the byte order of the
/// encoded keys, not the natural order of `K`. The view borrows the store
/// exclusively for its lifetime, so the encoded namespace cannot be
/// mutated underneath it.
pub struct TypedMap<'a, K, V, KC = TextCodec<K>, VC = TextCodec<V>> {
    store: &'a mut dyn Datastore,
    codec: PairCodec<KC, VC>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<'a, K, V> TypedMap<'a, K, V>
where
    TextCodec<K>: Codec<K>,
    TextCodec<V>: Codec<V>,
{
    /// Map view with text codecs for both keys and values.
    pub fn new(store: &'a mut dyn Datastore) -> Self {
        Self::with_codecs(store, PairCodec::default())
    }
}

impl<'a, K, V, KC, VC> TypedMap<'a, K, V, KC, VC>
where
    KC: Codec<K>,
    VC: Codec<V>,
{
    /// Map view with explicit codecs.
    pub fn with_codecs(store: &'a mut dyn Datastore, codec: PairCodec<KC, VC>) -> Self {
        Self {
            store,
            codec,
            _marker: PhantomData,
        }
    }

    /// Insert an entry. Returns `true` on insertion, `false` when the key
    /// is already present (the stored value is left untouched).
    pub fn insert(&mut self, key: &K, value: &V) -> StoreResult<bool> {
        let (key, value) = self.codec.encode_pair(key, value)?;
        let (_, inserted) = self.store.insert(&key, &value)?;
        Ok(inserted)
    }

    /// The value under `key`. Fails with [`crate::StoreError::NotFound`]
    /// if absent.
    pub fn get(&self, key: &K) -> StoreResult<V> {
        let bytes = self.store.get(&self.codec.key.encode(key)?)?;
        self.codec.value.decode(&bytes)
    }

    /// The entry under `key`, decoded, or `None` if absent.
    pub fn find(&self, key: &K) -> StoreResult<Option<(K, V)>> {
        let mut it = self.store.find(&self.codec.key.encode(key)?)?;
        if it.is_end() {
            return Ok(None);
        }
        let (key, value) = it.entry()?;
        Ok(Some(self.codec.decode_pair(key, value)?))
    }

    /// Returns `true` if an entry with `key` exists.
    pub fn contains(&self, key: &K) -> StoreResult<bool> {
        self.store.contains(&self.codec.key.encode(key)?)
    }

    /// Remove the entry with `key` if present. Returns the number of
    /// entries removed (0 or 1).
    pub fn erase(&mut self, key: &K) -> StoreResult<u64> {
        self.store.erase(&self.codec.key.encode(key)?)
    }

    /// Number of entries.
    pub fn len(&self) -> StoreResult<u64> {
        self.store.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.store.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.store.clear()
    }

    /// Iterator over decoded entries, in encoded-key byte order.
    pub fn iter(&self) -> StoreResult<impl Iterator<Item = StoreResult<(K, V)>> + use<'_, 'a, K, V, KC, VC>> {
        let entries = self.store.iter()?;
        Ok(entries.map(move |entry| {
            let (key, value) = entry?;
            self.codec.decode_pair(&key, &value)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BytesCodec;
    use crate::memory::MemoryStore;
    use crate::StoreError;

    #[test]
    fn insert_get_round_trips() {
        let mut store = MemoryStore::new();
        let mut map: TypedMap<i32, f64> = TypedMap::new(&mut store);
        assert!(map.insert(&2, &3.5).unwrap());
        assert_eq!(map.get(&2).unwrap(), 3.5);
    }

    #[test]
    fn duplicate_key_keeps_the_first_value() {
        let mut store = MemoryStore::new();
        let mut map: TypedMap<i32, f64> = TypedMap::new(&mut store);
        assert!(map.insert(&2, &3.5).unwrap());
        assert!(!map.insert(&2, &9.0).unwrap());
        assert_eq!(map.get(&2).unwrap(), 3.5);
    }

    #[test]
    fn find_decodes_the_stored_entry() {
        let mut store = MemoryStore::new();
        let mut map: TypedMap<i32, f64> = TypedMap::new(&mut store);
        map.insert(&7, &1.25).unwrap();
        assert_eq!(map.find(&7).unwrap(), Some((7, 1.25)));
        assert_eq!(map.find(&8).unwrap(), None);
    }

    #[test]
    fn get_missing_key_is_not_found() {
        let mut store = MemoryStore::new();
        let map: TypedMap<i32, f64> = TypedMap::new(&mut store);
        assert!(matches!(map.get(&1), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn erase_and_clear() {
        let mut store = MemoryStore::new();
        let mut map: TypedMap<i32, f64> = TypedMap::new(&mut store);
        map.insert(&1, &1.0).unwrap();
        map.insert(&2, &2.0).unwrap();
        assert_eq!(map.erase(&1).unwrap(), 1);
        assert_eq!(map.erase(&1).unwrap(), 0);
        map.clear().unwrap();
        assert!(map.is_empty().unwrap());
    }

    #[test]
    fn iteration_follows_encoded_key_order() {
        // Text-encoded integers order as strings: "10" sorts before "9".
        let mut store = MemoryStore::new();
        let mut map: TypedMap<i32, f64> = TypedMap::new(&mut store);
        map.insert(&9, &9.0).unwrap();
        map.insert(&10, &10.0).unwrap();

        let keys: Vec<i32> = map
            .iter()
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(keys, vec![10, 9]);
    }

    #[test]
    fn decode_failure_surfaces_from_iteration() {
        // Entries written outside the codec fail to decode on the way out.
        let mut store = MemoryStore::new();
        store.insert(b"not-an-int", b"1.0").unwrap();
        let map: TypedMap<i32, f64> = TypedMap::new(&mut store);
        let result: Vec<_> = map.iter().unwrap().collect();
        assert!(matches!(result[0], Err(StoreError::Decode { .. })));
    }

    #[test]
    fn custom_codecs_are_honored() {
        let mut store = MemoryStore::new();
        let mut map: TypedMap<Vec<u8>, u32, BytesCodec, TextCodec<u32>> =
            TypedMap::with_codecs(&mut store, PairCodec::new(BytesCodec, TextCodec::new()));
        map.insert(&vec![0, 1, 2], &42).unwrap();
        assert_eq!(map.get(&vec![0, 1, 2]).unwrap(), 42);
    }
}
