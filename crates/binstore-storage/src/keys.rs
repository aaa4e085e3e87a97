//! Shared key generation for storage backends.
//!
//! Key format: `binary/{id}/{versionId}`. A binary without a version id is
//! stored under `binary/{id}/_current`. The marker cannot collide with a real
//! version id because `_` is outside the id alphabet enforced by `BinaryRef`.
//!
//! Keys are always `/`-separated; the local backend maps segments onto native
//! path components.

use crate::traits::{StorageError, StorageResult};
use binstore_core::BinaryRef;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Namespace every derived key is rooted under.
pub const BINARY_PREFIX: &str = "binary";

/// Final key segment for a binary without a version id.
pub const CURRENT_VERSION_SEGMENT: &str = "_current";

/// Storage address derived from a `BinaryRef`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Version segment used in keys and local URLs.
pub fn version_segment(binary: &BinaryRef) -> &str {
    binary.version_id().unwrap_or(CURRENT_VERSION_SEGMENT)
}

/// Derive the storage key for a binary. Pure and deterministic.
pub fn derive_key(binary: &BinaryRef) -> StorageKey {
    StorageKey(format!(
        "{}/{}/{}",
        BINARY_PREFIX,
        binary.id(),
        version_segment(binary)
    ))
}

/// Validate a caller-supplied key before it reaches a medium.
///
/// Rejects empty keys, absolute keys, backslashes, and empty, `.` or `..`
/// segments. Derived keys always pass.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key has an invalid segment: {}",
            key
        )));
    }
    Ok(())
}
