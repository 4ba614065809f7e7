use thiserror::Error;

/// Errors from datastore operations.
///
/// Backend engine status codes are translated into this taxonomy at the
/// backend boundary. "No matching entry" during traversal is not an error:
/// the traversal primitives recover it locally into the end-cursor sentinel,
/// and only [`StoreError::NotFound`] from a direct lookup such as
/// `Datastore::get` reaches the caller. No operation retries automatically.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested entry was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed key/value, bad codec input, or invalid cursor reuse.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An engine space or slot limit was reached.
    #[error("capacity exhausted: {0}")]
    Capacity(String),

    /// I/O error from the underlying storage engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("no such path: {0}")]
    NoSuchPath(String),

    /// Structural damage reported by the engine. Fatal to the operation,
    /// never retried.
    #[error("corruption detected: {0}")]
    Corruption(String),

    /// Version or format mismatch reported by the engine.
    #[error("incompatible database: {0}")]
    Incompatible(String),

    /// Engine-reported failure with no better classification.
    #[error("internal error: {0}")]
    Internal(String),

    /// A bijective codec could not reconstruct a typed value from its byte
    /// representation.
    #[error("cannot decode {input:?} as {target}")]
    Decode {
        target: &'static str,
        input: String,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
