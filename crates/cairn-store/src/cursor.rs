use std::any::Any;

use crate::error::StoreResult;

/// Backend-specific traversal handle.
///
/// A cursor is positioned either at a live entry or at the backend's
/// sentinel "end" position. Cursors share no state across backends; the
/// only backend-independent surface is this trait, and [`crate::Iter`]
/// builds bidirectional iteration on top of it.
///
/// Running off either end of the store is never undefined behavior: a
/// cursor that steps past the last (or before the first) entry degrades to
/// its sentinel state, and dereferencing a sentinel yields
/// [`crate::StoreError::NotFound`].
pub trait Cursor {
    /// The key at the current position.
    fn key(&self) -> StoreResult<Vec<u8>>;

    /// The value at the current position.
    fn value(&self) -> StoreResult<Vec<u8>>;

    /// Returns `true` if the cursor is at the sentinel position.
    fn is_end(&self) -> bool;

    /// Compare positions. Cursors of different backends are never equal;
    /// two sentinels of the same store always are.
    fn equal(&self, other: &dyn Cursor) -> bool;

    /// Move the cursor forwards.
    fn increment(&mut self) -> StoreResult<()>;

    /// Move the cursor backwards.
    fn decrement(&mut self) -> StoreResult<()>;

    /// Duplicate the current position. The clone advances independently of
    /// the original; backends that hold a read snapshot share it between
    /// the clones.
    fn clone_box(&self) -> Box<dyn Cursor>;

    /// Downcast hook for backend-internal cursor inspection.
    fn as_any(&self) -> &dyn Any;
}
