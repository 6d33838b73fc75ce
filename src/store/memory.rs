//! In-process lock store.

use super::{LockStore, StoreResult};
use crate::key::LockKey;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Lock store backed by a map behind a mutex.
///
/// Every operation holds the mutex for its whole duration, so
/// `set_if_absent` and `delete_if_value` are atomic among threads sharing
/// the store. It does not coordinate separate processes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<LockKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<LockKey, Vec<u8>>> {
        // A panic while holding the mutex cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl LockStore for MemoryStore {
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool> {
        let mut entries = self.entries();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.clone(), value.to_vec());
        Ok(true)
    }

    fn delete(&self, key: &LockKey) -> StoreResult<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool> {
        let mut entries = self.entries();
        match entries.get(key) {
            Some(value) if value.as_slice() == expected => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn exists(&self, key: &LockKey) -> StoreResult<bool> {
        Ok(self.entries().contains_key(key))
    }

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries().get(key).cloned())
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>> {
        Ok(self
            .entries()
            .keys()
            .filter(|key| key.as_str().starts_with(prefix))
            .cloned()
            .collect())
    }
}
