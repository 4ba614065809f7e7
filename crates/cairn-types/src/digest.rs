use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use crate::error::TypeError;

/// Length of a SHA-256 or BLAKE3 digest in bytes (256 bits).
pub const DIGEST_LENGTH: usize = 32;

/// Enumerated hash algorithm identifier.
///
/// The digest primitive is consumed, not implemented: each code maps to an
/// existing hash function with a fixed 32-byte output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashCode {
    /// SHA-256 (FIPS 180-4).
    Sha2_256,
    /// BLAKE3, 256-bit output.
    Blake3,
}

impl HashCode {
    /// Digest length in bytes for this algorithm.
    pub const fn size(self) -> usize {
        DIGEST_LENGTH
    }

    /// Compute the digest of `data` under this algorithm.
    pub fn digest(self, data: &[u8]) -> Digest {
        match self {
            HashCode::Sha2_256 => {
                let mut hasher = sha2::Sha256::new();
                hasher.update(data);
                Digest::from_bytes(&hasher.finalize())
            }
            HashCode::Blake3 => Digest::from_bytes(blake3::hash(data).as_bytes()),
        }
    }

    /// Canonical name, e.g. `"sha2-256"`.
    pub const fn name(self) -> &'static str {
        match self {
            HashCode::Sha2_256 => "sha2-256",
            HashCode::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashCode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha2-256" => Ok(HashCode::Sha2_256),
            "blake3" => Ok(HashCode::Blake3),
            other => Err(TypeError::UnknownHashCode(other.to_string())),
        }
    }
}

/// Content-identifying byte sequence.
///
/// A `Digest` always owns its bytes; digests are small, so copying on
/// construction is cheap and rules out dangling views into foreign buffers.
/// Two digests are equal iff their byte sequences are equal; ordering is
/// lexicographic over bytes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Digest(Vec<u8>);

impl Digest {
    /// The empty digest. Identifies nothing; used for key-less blocks.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Copy a digest from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty digest.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..self.0.len().min(4)])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for Vec<u8> {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}
