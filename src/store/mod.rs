//! Lock store backends.
//!
//! The guard needs exactly one primitive from the shared store: an atomic
//! set-if-absent. Everything else (`delete`, `exists`, `get`, `keys`,
//! `delete_if_value`) serves release and inspection.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process map behind a mutex (tests, single process)
//! - [`FileStore`]: one file per key, created with **create_new** semantics
//!   (exclusive create), shared by every process that sees the directory
//! - `RedisStore` (feature `redis`): `SET key value NX` against a Redis server

mod file;
mod memory;
#[cfg(feature = "redis")]
mod redis;


use crate::key::LockKey;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

/// A store operation could not complete.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("failed to {op} '{}': {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A half-written lock file could not be removed; the key stays held.
    #[error(
        "failed to write lock file '{}' ({source}) and could not remove it ({cleanup}); lock '{key}' is still held",
        path.display()
    )]
    Stranded {
        key: LockKey,
        path: PathBuf,
        #[source]
        source: std::io::Error,
        cleanup: std::io::Error,
    },

    /// Lock metadata could not be encoded.
    #[error("failed to encode lock metadata: {0}")]
    Encode(#[from] serde_json::Error),

    /// Redis command failed.
    #[cfg(feature = "redis")]
    #[error("redis command failed: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A key-value store usable for job locks.
pub trait LockStore: Send + Sync {
    /// Atomically create `key` with `value` if it does not exist.
    ///
    /// Returns `true` iff this call created the key.
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &LockKey) -> StoreResult<()>;

    /// Remove `key` only if its value equals `expected`.
    ///
    /// Returns `true` iff the key was removed.
    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool>;

    fn exists(&self, key: &LockKey) -> StoreResult<bool>;

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>>;

    /// All keys starting with `prefix`, sorted.
    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>>;
}

impl<S: LockStore + ?Sized> LockStore for &S {
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool> {
        (**self).set_if_absent(key, value)
    }

    fn delete(&self, key: &LockKey) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool> {
        (**self).delete_if_value(key, expected)
    }

    fn exists(&self, key: &LockKey) -> StoreResult<bool> {
        (**self).exists(key)
    }

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>> {
        (**self).keys(prefix)
    }
}

impl<S: LockStore + ?Sized> LockStore for Arc<S> {
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool> {
        (**self).set_if_absent(key, value)
    }

    fn delete(&self, key: &LockKey) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool> {
        (**self).delete_if_value(key, expected)
    }

    fn exists(&self, key: &LockKey) -> StoreResult<bool> {
        (**self).exists(key)
    }

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>> {
        (**self).keys(prefix)
    }
}

impl<S: LockStore + ?Sized> LockStore for Box<S> {
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool> {
        (**self).set_if_absent(key, value)
    }

    fn delete(&self, key: &LockKey) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool> {
        (**self).delete_if_value(key, expected)
    }

    fn exists(&self, key: &LockKey) -> StoreResult<bool> {
        (**self).exists(key)
    }

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>> {
        (**self).keys(prefix)
    }
}
