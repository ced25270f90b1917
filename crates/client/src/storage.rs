//! File-backed client-side persistence.
//!
//! The storefront keeps three slots on disk under the configured data
//! directory: the access token, the refresh token, and the serialized cart.
//! Each slot is a single file owned exclusively by one store; there is no
//! locking because the slots are only touched through the owning handles.
//!
//! Raw I/O failures are wrapped as [`StorageError::Io`] so callers see a
//! recoverable "storage unavailable" condition instead of a bare
//! `std::io::Error`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::token::TokenKind;

/// Errors from the client-side persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file I/O failed; storage is unavailable.
    #[error("storage unavailable at {path}: {source}")]
    Io {
        /// The slot that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Stored data could not be serialized.
    #[error("corrupt data in {path}: {source}")]
    Corrupt {
        /// The slot that failed.
        path: PathBuf,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Read a slot; a missing file is `Ok(None)`.
pub(crate) fn read_slot(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StorageError::Io {
            path: path.to_owned(),
            source: err,
        }),
    }
}

/// Write a slot, creating the data directory on first use.
pub(crate) fn write_slot(path: &Path, contents: &str) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

/// Remove a slot; a missing file is not an error.
pub(crate) fn remove_slot(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StorageError::Io {
            path: path.to_owned(),
            source: err,
        }),
    }
}

/// Persistent storage for the access/refresh token pair.
///
/// A pure key-value pass-through: no validation, no caching. Tokens updated
/// by a refresh are therefore picked up by the next read automatically.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Create a store rooted at the data directory. The directory is created
    /// lazily on first write.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.to_owned(),
        }
    }

    /// Read a token. Missing token yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when storage is unavailable.
    pub fn get(&self, kind: TokenKind) -> Result<Option<String>, StorageError> {
        read_slot(&self.path(kind))
    }

    /// Store a token, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when storage is unavailable.
    pub fn set(&self, kind: TokenKind, value: &str) -> Result<(), StorageError> {
        write_slot(&self.path(kind), value)
    }

    /// Delete a token. Deleting an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when storage is unavailable.
    pub fn remove(&self, kind: TokenKind) -> Result<(), StorageError> {
        remove_slot(&self.path(kind))
    }

    fn path(&self, kind: TokenKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_token_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path());
        assert!(store.get(TokenKind::Access).expect("get").is_none());
    }

    #[test]
    fn test_set_get_remove_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path());

        store.set(TokenKind::Access, "abc.def.ghi").expect("set");
        assert_eq!(
            store.get(TokenKind::Access).expect("get").as_deref(),
            Some("abc.def.ghi")
        );

        store.remove(TokenKind::Access).expect("remove");
        assert!(store.get(TokenKind::Access).expect("get").is_none());
    }

    #[test]
    fn test_slots_are_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path());

        store.set(TokenKind::Access, "access").expect("set");
        store.set(TokenKind::Refresh, "refresh").expect("set");
        store.remove(TokenKind::Access).expect("remove");

        assert!(store.get(TokenKind::Access).expect("get").is_none());
        assert_eq!(
            store.get(TokenKind::Refresh).expect("get").as_deref(),
            Some("refresh")
        );
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path());

        store.set(TokenKind::Refresh, "old").expect("set");
        store.set(TokenKind::Refresh, "new").expect("set");
        assert_eq!(
            store.get(TokenKind::Refresh).expect("get").as_deref(),
            Some("new")
        );
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::new(dir.path());
        assert!(store.remove(TokenKind::Refresh).is_ok());
    }
}
