use crate::key::LockKey;
use crate::store::{LockStore, MemoryStore, StoreError, StoreResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Memory store that counts calls and can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct InstrumentedStore {
    inner: MemoryStore,
    set_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    exists_calls: AtomicUsize,
    fail_acquire: AtomicBool,
    fail_release: AtomicBool,
}

impl InstrumentedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_acquire() -> Self {
        let store = Self::default();
        store.fail_acquire.store(true, Ordering::SeqCst);
        store
    }

    pub(crate) fn failing_release() -> Self {
        let store = Self::default();
        store.fail_release.store(true, Ordering::SeqCst);
        store
    }

    pub(crate) fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Both `delete` and `delete_if_value` calls.
    pub(crate) fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn unavailable() -> StoreError {
        StoreError::Backend("store unavailable".to_string())
    }
}

impl LockStore for InstrumentedStore {
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.set_if_absent(key, value)
    }

    fn delete(&self, key: &LockKey) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.delete(key)
    }

    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.delete_if_value(key, expected)
    }

    fn exists(&self, key: &LockKey) -> StoreResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(key)
    }

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>> {
        self.inner.keys(prefix)
    }
}
