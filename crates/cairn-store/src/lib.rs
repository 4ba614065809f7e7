//! Ordered key/value storage behind a backend-agnostic trait.
//!
//! The [`Datastore`] trait reduces a backend to six primitives (seek to
//! first, sentinel, exact lookup, positioned insert, positioned erase,
//! capacity) and derives the full map surface from them, so every backend
//! gets `insert`, `find`, `erase`, `get`, iteration and bulk operations
//! for free. Traversal goes through [`Cursor`] (the backend-specific
//! handle) wrapped in [`Iter`] (the backend-agnostic bidirectional
//! iterator).
//!
//! Two backends ship here:
//!
//! - [`MemoryStore`]: a `BTreeMap` behind a lock, process lifetime only.
//! - [`RedbStore`]: a transactional embedded engine; each mutation commits
//!   in its own write transaction and each cursor pins a consistent read
//!   snapshot for its lifetime.
//!
//! On top of the byte-level store sit three typed façades:
//! [`BlockStore`] for content-addressed blocks, and [`TypedMap`] /
//! [`TypedSet`] which pass keys and values through bijective [`Codec`]s.

pub mod blockstore;
pub mod codec;
pub mod cursor;
pub mod datastore;
pub mod error;
pub mod iter;
pub mod map;
pub mod memory;
pub mod redb;
pub mod set;

pub use blockstore::{BlockStore, Blocks};
pub use codec::{BytesCodec, Codec, PairCodec, TextCodec};
pub use cursor::Cursor;
pub use datastore::Datastore;
pub use error::{StoreError, StoreResult};
pub use iter::{Entries, Entry, Iter};
pub use map::TypedMap;
pub use memory::MemoryStore;
pub use self::redb::{RedbConfig, RedbStore};
pub use set::TypedSet;
