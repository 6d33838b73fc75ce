//! RAII release of an acquired lock.

use super::types::ReleaseMode;
use crate::key::LockKey;
use crate::store::{LockStore, StoreResult};

/// RAII guard for an acquired lock.
///
/// The normal path calls [`release`](Self::release) and handles its error.
/// If the guard is dropped unreleased (the work panicked), the lock is
/// released from `Drop`; a failure there cannot be returned, so it is
/// reported as an error event naming the key that is still held.
pub(crate) struct HeldLock<'a, S: LockStore + ?Sized> {
    store: &'a S,
    key: LockKey,
    marker: Vec<u8>,
    mode: ReleaseMode,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, S: LockStore + ?Sized> HeldLock<'a, S> {
    pub(crate) fn new(store: &'a S, key: LockKey, marker: Vec<u8>, mode: ReleaseMode) -> Self {
        Self {
            store,
            key,
            marker,
            mode,
            released: false,
        }
    }

    /// Release the lock, issuing exactly one store call.
    pub(crate) fn release(mut self) -> StoreResult<()> {
        self.released = true;
        self.release_inner()
    }

    fn release_inner(&self) -> StoreResult<()> {
        match self.mode {
            ReleaseMode::Unconditional => self.store.delete(&self.key),
            // Someone else's marker (or no key) means there is nothing of ours to remove.
            ReleaseMode::OwnerChecked => self
                .store
                .delete_if_value(&self.key, &self.marker)
                .map(|_| ()),
        }
    }
}

impl<S: LockStore + ?Sized> Drop for HeldLock<'_, S> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.release_inner()
        {
            tracing::error!(
                key = %self.key,
                error = %e,
                "failed to release job lock after a panic; the lock is still held"
            );
        }
    }
}
