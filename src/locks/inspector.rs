//! Read-only lock inspection and manual clearing.
//!
//! Nothing here takes part in acquisition. Checking `is_locked` and then
//! acquiring is not atomic; only the guard's `set_if_absent` is.

use super::metadata::LockMetadata;
use super::types::LockInfo;
use crate::key::{DeriverRegistry, KeyDeriver, LockKey};
use crate::store::{LockStore, StoreResult};
use serde_json::Value;

/// Default minutes after which a held lock is reported as stale.
pub const DEFAULT_STALE_MINUTES: u32 = 120;

/// Diagnostic view of the locks in a store.
#[derive(Debug, Clone)]
pub struct LockInspector<S> {
    store: S,
    derivers: DeriverRegistry,
    stale_minutes: u32,
}

impl<S: LockStore> LockInspector<S> {
    pub fn new(store: S, derivers: DeriverRegistry) -> Self {
        Self {
            store,
            derivers,
            stale_minutes: DEFAULT_STALE_MINUTES,
        }
    }

    pub fn with_stale_minutes(mut self, stale_minutes: u32) -> Self {
        self.stale_minutes = stale_minutes;
        self
    }

    /// Whether the lock for `(job_type, args)` is currently held.
    pub fn is_locked(&self, job_type: &str, args: &[Value]) -> StoreResult<bool> {
        self.store
            .exists(&self.derivers.derive_key(job_type, args))
    }

    /// Details of the lock for `(job_type, args)`, if held.
    pub fn describe(&self, job_type: &str, args: &[Value]) -> StoreResult<Option<LockInfo>> {
        self.describe_key(&self.derivers.derive_key(job_type, args))
    }

    /// Details of the lock stored under `key`, if held.
    pub fn describe_key(&self, key: &LockKey) -> StoreResult<Option<LockInfo>> {
        Ok(self.store.get(key)?.map(|value| self.info(key.clone(), &value)))
    }

    /// Every lock in the registry's namespace, sorted by key.
    ///
    /// Locks whose key was released between listing and reading are left out.
    pub fn list(&self) -> StoreResult<Vec<LockInfo>> {
        let mut locks = Vec::new();
        for key in self.store.keys(self.derivers.namespace())? {
            if let Some(info) = self.describe_key(&key)? {
                locks.push(info);
            }
        }
        Ok(locks)
    }

    /// Remove the lock stored under `key`, regardless of who holds it.
    ///
    /// Returns what was removed, or `None` if the key was not held. This is
    /// the manual remedy for locks left behind by crashed workers.
    pub fn clear(&self, key: &LockKey) -> StoreResult<Option<LockInfo>> {
        let Some(info) = self.describe_key(key)? else {
            return Ok(None);
        };
        self.store.delete(key)?;
        Ok(Some(info))
    }

    fn info(&self, key: LockKey, value: &[u8]) -> LockInfo {
        let metadata = LockMetadata::from_bytes(value).ok();
        let is_stale = metadata
            .as_ref()
            .is_some_and(|meta| meta.is_stale(self.stale_minutes));
        LockInfo {
            key,
            metadata,
            is_stale,
        }
    }
}
