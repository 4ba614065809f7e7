//! Cross-backend scenarios: every test body runs unchanged against the
//! in-memory store and the transactional store.

use cairn_store::{
    BlockStore, Datastore, MemoryStore, RedbConfig, RedbStore, StoreError, TypedMap,
};
use cairn_types::{Block, HashCode};
use tempfile::TempDir;

fn each_backend(scenario: impl Fn(&mut dyn Datastore)) {
    let mut memory = MemoryStore::new();
    scenario(&mut memory);

    let dir = TempDir::new().unwrap();
    let mut redb = RedbStore::open(RedbConfig::new(dir.path().join("test.redb"))).unwrap();
    scenario(&mut redb);
}

#[test]
fn insert_then_get_round_trips() {
    each_backend(|store| {
        let (mut it, inserted) = store.insert(b"key", b"value").unwrap();
        assert!(inserted);
        assert_eq!(it.key().unwrap(), b"key");
        assert_eq!(it.value().unwrap(), b"value");
        assert_eq!(store.get(b"key").unwrap(), b"value");
        assert!(store.contains(b"key").unwrap());
    });
}

#[test]
fn duplicate_insert_returns_the_existing_entry() {
    each_backend(|store| {
        store.insert(b"key", b"first").unwrap();
        let (mut it, inserted) = store.insert(b"key", b"second").unwrap();
        assert!(!inserted);
        assert_eq!(it.value().unwrap(), b"first");
        assert_eq!(store.len().unwrap(), 1);
    });
}

#[test]
fn get_missing_key_is_not_found() {
    each_backend(|store| {
        assert!(matches!(
            store.get(b"missing"),
            Err(StoreError::NotFound(_))
        ));
        // find never errors on a miss; it lands on the end iterator.
        assert!(store.find(b"missing").unwrap().is_end());
        assert_eq!(store.find(b"missing").unwrap(), store.end().unwrap());
    });
}

#[test]
fn erase_is_idempotent() {
    each_backend(|store| {
        store.insert(b"key", b"value").unwrap();
        assert_eq!(store.erase(b"key").unwrap(), 1);
        assert_eq!(store.erase(b"key").unwrap(), 0);
        assert!(store.is_empty().unwrap());
    });
}

#[test]
fn iteration_visits_keys_in_order() {
    each_backend(|store| {
        store.insert(b"b", b"2").unwrap();
        store.insert(b"c", b"3").unwrap();
        store.insert(b"a", b"1").unwrap();

        let entries: Vec<_> = store
            .iter()
            .unwrap()
            .map(|entry| entry.unwrap())
            .collect();
        assert_eq!(
            entries,
            vec![
                (b"a".to_vec(), b"1".to_vec()),
                (b"b".to_vec(), b"2".to_vec()),
                (b"c".to_vec(), b"3".to_vec()),
            ]
        );
        assert_eq!(store.len().unwrap(), 3);
    });
}

#[test]
fn drain_by_erasing_the_front_skips_nothing() {
    each_backend(|store| {
        for key in [b"a", b"b", b"c", b"d"] {
            store.insert(key, b"v").unwrap();
        }

        let mut drained = Vec::new();
        let mut it = store.begin().unwrap();
        while !it.is_end() {
            drained.push(it.key().unwrap());
            it = store.erase_entry(it).unwrap();
        }
        assert_eq!(
            drained,
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]
        );
        assert!(store.is_empty().unwrap());
    });
}

#[test]
fn erase_through_the_end_iterator_is_rejected() {
    each_backend(|store| {
        let end = store.end().unwrap();
        assert!(matches!(
            store.erase_entry(end),
            Err(StoreError::InvalidArgument(_))
        ));
    });
}

#[test]
fn clear_empties_the_store() {
    each_backend(|store| {
        for key in [b"a", b"b", b"c"] {
            store.insert(key, b"v").unwrap();
        }
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.len().unwrap(), 0);
    });
}

#[test]
fn insert_hint_tolerates_a_stale_hint() {
    each_backend(|store| {
        store.insert(b"a", b"1").unwrap();
        let stale = store.end().unwrap();
        store.insert(b"b", b"2").unwrap();

        let mut it = store.insert_hint(stale, b"c", b"3").unwrap();
        assert_eq!(it.key().unwrap(), b"c");
        assert_eq!(store.len().unwrap(), 3);

        // A hint at an existing key degrades to a find.
        let hint = store.begin().unwrap();
        let mut existing = store.insert_hint(hint, b"a", b"clobber").unwrap();
        assert_eq!(existing.value().unwrap(), b"1");
    });
}

#[test]
fn max_size_dominates_len() {
    each_backend(|store| {
        store.insert(b"a", b"1").unwrap();
        assert!(store.max_size().unwrap() >= store.len().unwrap());
    });
}

#[test]
fn typed_map_round_trips_over_each_backend() {
    each_backend(|store| {
        let mut map: TypedMap<i32, f64> = TypedMap::new(store);
        assert!(map.insert(&2, &3.5).unwrap());
        assert!(!map.insert(&2, &9.0).unwrap());
        assert_eq!(map.get(&2).unwrap(), 3.5);
        assert_eq!(map.find(&2).unwrap(), Some((2, 3.5)));
        assert_eq!(map.erase(&2).unwrap(), 1);
        assert!(map.is_empty().unwrap());
    });
}

#[test]
fn blockstore_over_the_transactional_backend() {
    let dir = TempDir::new().unwrap();
    let backend = RedbStore::open(RedbConfig::new(dir.path().join("blocks.redb"))).unwrap();
    let mut store = BlockStore::new(Box::new(backend));

    let block = Block::from_data("payload", HashCode::Blake3);
    assert!(store.insert(&block).unwrap());
    assert!(!store.insert(&block).unwrap());

    let probe = Block::from_key(block.key().clone());
    let found = store.find(&probe).unwrap().unwrap();
    assert_eq!(found.data(), b"payload");
    assert_eq!(found.key(), block.key());

    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.erase(&block).unwrap(), 1);
    assert!(store.is_empty().unwrap());
}

#[test]
fn blocks_survive_a_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blocks.redb");
    let block = Block::from_data("durable", HashCode::Sha2_256);
    {
        let backend = RedbStore::open(RedbConfig::new(&path)).unwrap();
        let mut store = BlockStore::new(Box::new(backend));
        store.insert(&block).unwrap();
    }
    let backend = RedbStore::open(RedbConfig::new(&path)).unwrap();
    let store = BlockStore::new(Box::new(backend));
    let found = store.find(&block).unwrap().unwrap();
    assert_eq!(found.data(), b"durable");
}
