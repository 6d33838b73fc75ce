//! The guarded-run primitive.

use super::held::HeldLock;
use super::inspector::LockInspector;
use super::metadata::LockMetadata;
use super::types::{GuardError, ReleaseMode, RunOutcome};
use crate::job::JobIdentity;
use crate::key::{DeriverRegistry, KeyDeriver, LockKey};
use crate::store::{LockStore, StoreError};
use serde_json::Value;

/// Runs units of work under a store-backed lock, at most one per key.
///
/// A guard holds the store handle and the key derivers. Dispatchers keep one
/// guard per process and wrap each job's work with [`run`](Self::run).
#[derive(Debug, Clone)]
pub struct LockGuard<S> {
    store: S,
    derivers: DeriverRegistry,
    release_mode: ReleaseMode,
}

impl<S: LockStore> LockGuard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            derivers: DeriverRegistry::default(),
            release_mode: ReleaseMode::default(),
        }
    }

    pub fn with_derivers(mut self, derivers: DeriverRegistry) -> Self {
        self.derivers = derivers;
        self
    }

    pub fn with_release_mode(mut self, release_mode: ReleaseMode) -> Self {
        self.release_mode = release_mode;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn derivers(&self) -> &DeriverRegistry {
        &self.derivers
    }

    pub fn release_mode(&self) -> ReleaseMode {
        self.release_mode
    }

    pub fn derive_key(&self, job_type: &str, args: &[Value]) -> LockKey {
        self.derivers.derive_key(job_type, args)
    }

    /// An inspector over the same store and derivers.
    pub fn inspector(&self) -> LockInspector<&S> {
        LockInspector::new(&self.store, self.derivers.clone())
    }

    /// Run `work` if the lock for `(job_type, args)` can be acquired.
    ///
    /// - Lock held elsewhere: returns `Ok(RunOutcome::Skipped)` without
    ///   calling `work`.
    /// - Lock acquired: calls `work`, then releases the lock before
    ///   returning, whether `work` returned `Ok`, returned `Err`, or panicked.
    ///
    /// Issues one `set_if_absent` and, when acquired, one release call. Store
    /// failures are returned as they are, never retried.
    pub fn run<R, E, F>(
        &self,
        job_type: &str,
        args: &[Value],
        work: F,
    ) -> Result<RunOutcome<R>, GuardError<E>>
    where
        F: FnOnce() -> Result<R, E>,
    {
        let key = self.derive_key(job_type, args);
        let marker = LockMetadata::new(job_type)
            .to_bytes()
            .map_err(|e| GuardError::Store(StoreError::Encode(e)))?;

        let acquired = self
            .store
            .set_if_absent(&key, &marker)
            .map_err(GuardError::Store)?;
        if !acquired {
            return Ok(RunOutcome::Skipped { key });
        }

        let held = HeldLock::new(&self.store, key.clone(), marker, self.release_mode);
        let result = work();

        match (held.release(), result) {
            (Ok(()), Ok(value)) => Ok(RunOutcome::Completed(value)),
            (Ok(()), Err(e)) => Err(GuardError::Work(e)),
            (Err(source), result) => Err(GuardError::Release {
                key,
                source,
                work_error: result.err(),
            }),
        }
    }

    /// [`run`](Self::run) for a job identity held as a value.
    pub fn run_job<R, E, F>(
        &self,
        job: &JobIdentity,
        work: F,
    ) -> Result<RunOutcome<R>, GuardError<E>>
    where
        F: FnOnce() -> Result<R, E>,
    {
        self.run(job.job_type(), job.args(), work)
    }
}
