use std::any::Any;
use std::io::ErrorKind;
use std::ops::Bound;
use std::path::PathBuf;
use std::sync::Arc;

use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableTable, ReadableTableMetadata,
    TableDefinition,
};
use tracing::debug;

use crate::cursor::Cursor;
use crate::datastore::Datastore;
use crate::error::{StoreError, StoreResult};

/// Configuration for a [`RedbStore`].
#[derive(Clone, Debug)]
pub struct RedbConfig {
    path: PathBuf,
    table: String,
}

impl RedbConfig {
    /// Store entries in the database file at `path`, in the default table.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: "cairn".to_string(),
        }
    }

    /// Use a different named table inside the database file.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();
        self
    }

    /// The database file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// The table name.
    pub fn table_name(&self) -> &str {
        &self.table
    }
}

/// Transactional datastore backed by the redb embedded engine.
///
/// Every mutating primitive opens a write transaction, performs exactly one
/// mutation, and commits before returning; write transactions never span
/// calls. Read traversal opens a read transaction per cursor and keeps it
/// for the cursor's lifetime, so repeated stepping sees one consistent MVCC
/// snapshot. The engine serializes writers process-wide and admits
/// unlimited snapshot readers.
///
/// Precondition: one `RedbStore` per database file per process. The engine
/// rejects a second open of the same file with an error; that error is
/// surfaced, never silently tolerated.
pub struct RedbStore {
    db: Arc<Database>,
    table: String,
}

impl RedbStore {
    /// Open (creating if needed) the database described by `config`.
    ///
    /// The table is created up front so later read snapshots always find
    /// it.
    pub fn open(config: RedbConfig) -> StoreResult<Self> {
        let db = Database::create(&config.path).map_err(db_err)?;
        let store = Self {
            db: Arc::new(db),
            table: config.table,
        };
        let txn = store.db.begin_write().map_err(txn_err)?;
        txn.open_table(store.definition()).map_err(table_err)?;
        txn.commit().map_err(commit_err)?;
        debug!(path = %config.path.display(), table = %store.table, "opened redb environment");
        Ok(store)
    }

    fn definition(&self) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
        TableDefinition::new(&self.table)
    }

    /// Begin a read transaction and pin the table snapshot. `None` when the
    /// table does not exist yet: that is "no entries", not a failure.
    fn snapshot(&self) -> StoreResult<Option<Arc<Snapshot>>> {
        let txn = self.db.begin_read().map_err(txn_err)?;
        match txn.open_table(self.definition()) {
            Ok(table) => Ok(Some(Arc::new(Snapshot { table, _txn: txn }))),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(table_err(e)),
        }
    }

    fn sentinel(&self) -> Box<dyn Cursor> {
        Box::new(RedbCursor {
            snapshot: None,
            position: None,
        })
    }

    /// Run one mutation inside its own committed write transaction.
    fn write_one(
        &self,
        mutate: impl FnOnce(&mut redb::Table<'_, &'static [u8], &'static [u8]>) -> StoreResult<()>,
    ) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(txn_err)?;
        {
            let mut table = txn.open_table(self.definition()).map_err(table_err)?;
            mutate(&mut table)?;
        }
        txn.commit().map_err(commit_err)
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("table", &self.table).finish()
    }
}

impl Datastore for RedbStore {
    fn first(&self) -> StoreResult<Box<dyn Cursor>> {
        let Some(snapshot) = self.snapshot()? else {
            return Ok(self.sentinel());
        };
        let position = snapshot
            .table
            .first()
            .map_err(storage_err)?
            .map(|(key, _)| key.value().to_vec());
        match position {
            Some(position) => Ok(Box::new(RedbCursor {
                snapshot: Some(snapshot),
                position: Some(position),
            })),
            None => Ok(self.sentinel()),
        }
    }

    fn last(&self) -> StoreResult<Box<dyn Cursor>> {
        Ok(self.sentinel())
    }

    fn lookup(&self, key: &[u8]) -> StoreResult<Box<dyn Cursor>> {
        let Some(snapshot) = self.snapshot()? else {
            return Ok(self.sentinel());
        };
        match snapshot.table.get(key).map_err(storage_err)? {
            Some(_) => Ok(Box::new(RedbCursor {
                snapshot: Some(snapshot),
                position: Some(key.to_vec()),
            })),
            None => Ok(self.sentinel()),
        }
    }

    fn insert_at(
        &mut self,
        _pos: Box<dyn Cursor>,
        key: &[u8],
        value: &[u8],
    ) -> StoreResult<Box<dyn Cursor>> {
        // The hint is never trusted across a write; after committing,
        // re-seek a fresh read cursor at the inserted key.
        self.write_one(|table| {
            table.insert(key, value).map_err(storage_err)?;
            Ok(())
        })?;
        debug!(key = %hex::encode(key), "inserted entry");
        self.lookup(key)
    }

    fn erase_at(&mut self, pos: Box<dyn Cursor>) -> StoreResult<Box<dyn Cursor>> {
        // Capture the key, advance the cursor past it, then delete the
        // captured key in its own short write transaction. The caller gets
        // back a cursor already positioned at the next surviving entry.
        let mut cursor = pos;
        let key = cursor.key()?;
        if cursor.increment().is_err() {
            cursor = self.last()?;
        }
        self.write_one(|table| {
            table.remove(key.as_slice()).map_err(storage_err)?;
            Ok(())
        })?;
        debug!(key = %hex::encode(&key), "erased entry");
        Ok(cursor)
    }

    fn capacity(&self) -> StoreResult<u64> {
        // The engine grows its file on demand; there is no configured map
        // size to report.
        Ok(u64::MAX)
    }

    fn len(&self) -> StoreResult<u64> {
        match self.snapshot()? {
            Some(snapshot) => snapshot.table.len().map_err(storage_err),
            None => Ok(0),
        }
    }
}

/// A pinned read view: the table keeps the MVCC snapshot alive, and the
/// transaction handle is retained for the same lifetime.
struct Snapshot {
    table: ReadOnlyTable<&'static [u8], &'static [u8]>,
    _txn: ReadTransaction,
}

/// Cursor over a [`RedbStore`]: a shared snapshot plus the key it is
/// positioned at. The sentinel holds neither, so an end comparison never
/// needs a live engine handle, and stepping the sentinel backwards reports
/// `NotFound` rather than reattaching to the engine.
struct RedbCursor {
    snapshot: Option<Arc<Snapshot>>,
    position: Option<Vec<u8>>,
}

impl RedbCursor {
    fn live(&self) -> StoreResult<(&Snapshot, &[u8])> {
        match (&self.snapshot, &self.position) {
            (Some(snapshot), Some(position)) => Ok((snapshot, position)),
            _ => Err(StoreError::NotFound("cursor at end".to_string())),
        }
    }
}

impl Cursor for RedbCursor {
    fn key(&self) -> StoreResult<Vec<u8>> {
        let (_, position) = self.live()?;
        Ok(position.to_vec())
    }

    fn value(&self) -> StoreResult<Vec<u8>> {
        let (snapshot, position) = self.live()?;
        snapshot
            .table
            .get(position)
            .map_err(storage_err)?
            .map(|guard| guard.value().to_vec())
            .ok_or_else(|| StoreError::NotFound(hex::encode(position)))
    }

    fn is_end(&self) -> bool {
        self.position.is_none()
    }

    fn equal(&self, other: &dyn Cursor) -> bool {
        let Some(other) = other.as_any().downcast_ref::<RedbCursor>() else {
            return false;
        };
        match (&self.snapshot, &other.snapshot) {
            (None, None) => self.position == other.position,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) && self.position == other.position,
            _ => false,
        }
    }

    fn increment(&mut self) -> StoreResult<()> {
        let (snapshot, position) = match (&self.snapshot, &self.position) {
            (Some(snapshot), Some(position)) => (snapshot, position),
            _ => {
                return Err(StoreError::NotFound(
                    "cursor advanced past the end".to_string(),
                ))
            }
        };
        let mut range = snapshot
            .table
            .range::<&[u8]>((Bound::Excluded(position.as_slice()), Bound::Unbounded))
            .map_err(storage_err)?;
        match range.next() {
            Some(Ok((key, _))) => {
                let next = key.value().to_vec();
                drop(range);
                self.position = Some(next);
            }
            Some(Err(e)) => return Err(storage_err(e)),
            // Ran off the end: degrade to the sentinel, releasing the
            // snapshot.
            None => {
                drop(range);
                self.snapshot = None;
                self.position = None;
            }
        }
        Ok(())
    }

    fn decrement(&mut self) -> StoreResult<()> {
        let (snapshot, position) = match (&self.snapshot, &self.position) {
            (Some(snapshot), Some(position)) => (snapshot, position),
            _ => {
                return Err(StoreError::NotFound(
                    "cursor retreated past the end".to_string(),
                ))
            }
        };
        let mut range = snapshot
            .table
            .range::<&[u8]>((Bound::Unbounded, Bound::Excluded(position.as_slice())))
            .map_err(storage_err)?;
        match range.next_back() {
            Some(Ok((key, _))) => {
                let prev = key.value().to_vec();
                drop(range);
                self.position = Some(prev);
            }
            Some(Err(e)) => return Err(storage_err(e)),
            None => {
                drop(range);
                self.snapshot = None;
                self.position = None;
            }
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Cursor> {
        // Clones share the read snapshot but advance independently.
        Box::new(RedbCursor {
            snapshot: self.snapshot.clone(),
            position: self.position.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Engine error translation
// ---------------------------------------------------------------------------

fn storage_err(e: redb::StorageError) -> StoreError {
    match e {
        redb::StorageError::Io(io) => match io.kind() {
            ErrorKind::NotFound => StoreError::NoSuchPath(io.to_string()),
            ErrorKind::PermissionDenied => StoreError::PermissionDenied(io.to_string()),
            ErrorKind::OutOfMemory => StoreError::OutOfMemory(io.to_string()),
            _ => StoreError::Io(io),
        },
        redb::StorageError::Corrupted(message) => StoreError::Corruption(message),
        redb::StorageError::ValueTooLarge(size) => {
            StoreError::Capacity(format!("value too large: {size} bytes"))
        }
        redb::StorageError::LockPoisoned(location) => StoreError::Internal(location.to_string()),
        other => StoreError::Internal(other.to_string()),
    }
}

fn db_err(e: redb::DatabaseError) -> StoreError {
    match e {
        redb::DatabaseError::Storage(e) => storage_err(e),
        redb::DatabaseError::DatabaseAlreadyOpen => {
            StoreError::InvalidArgument("database already open".to_string())
        }
        redb::DatabaseError::UpgradeRequired(version) => {
            StoreError::Incompatible(format!("database format v{version} requires upgrade"))
        }
        redb::DatabaseError::RepairAborted => {
            StoreError::Corruption("database repair aborted".to_string())
        }
        other => StoreError::Internal(other.to_string()),
    }
}

fn txn_err(e: redb::TransactionError) -> StoreError {
    match e {
        redb::TransactionError::Storage(e) => storage_err(e),
        other => StoreError::Internal(other.to_string()),
    }
}

fn table_err(e: redb::TableError) -> StoreError {
    match e {
        redb::TableError::Storage(e) => storage_err(e),
        redb::TableError::TableDoesNotExist(name) => StoreError::NotFound(name),
        other => StoreError::Incompatible(other.to_string()),
    }
}

fn commit_err(e: redb::CommitError) -> StoreError {
    match e {
        redb::CommitError::Storage(e) => storage_err(e),
        other => StoreError::Internal(other.to_string()),
    }
}
