//! Object key normalization.
//!
//! OpenDAL normalizes every path before it talks to the store: surrounding
//! whitespace and leading slashes are dropped and repeated slashes collapse.
//! Upload policies pin the key verbatim, so both credentials go through
//! [`normalize_key`] to address the same object.

use imgdrop_shared::ObjectKey;

use super::error::StorageError;

/// Normalize `key` the way the storage operator would.
///
/// Keys that are empty after normalization or that end in `/` (directories)
/// cannot name an object and are rejected.
pub fn normalize_key(key: &ObjectKey) -> Result<ObjectKey, StorageError> {
    let trimmed = key.as_str().trim().trim_start_matches('/');
    if trimmed.ends_with('/') {
        return Err(StorageError::InvalidKey(format!("{key} names a directory")));
    }

    let normalized = trimmed
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if normalized.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".to_string()));
    }

    Ok(ObjectKey::new(normalized))
}
