//! Foundation types for Cairn.
//!
//! This crate provides the value types shared by every Cairn storage layer:
//!
//! - [`HashCode`]: enumerated hash algorithm identifier
//! - [`Digest`]: owned byte sequence identifying content under a hash
//!   algorithm, ordered lexicographically
//! - [`Block`]: content-addressed value whose key is the digest of its
//!   payload, computed exactly once at construction
//!
//! No storage logic lives here; backends and façades are in `cairn-store`.

pub mod block;
pub mod digest;
pub mod error;

pub use block::Block;
pub use digest::{Digest, HashCode};
pub use error::TypeError;
