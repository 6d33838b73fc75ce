//! Outcome, error and information types for guarded runs.

use super::metadata::LockMetadata;
use crate::key::LockKey;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a guard gives its lock back after the work finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMode {
    /// Plain delete of the key, whoever holds it now.
    #[default]
    Unconditional,
    /// Delete only while the key still holds this guard's marker.
    OwnerChecked,
}

/// Result of a guarded run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RunOutcome<R> {
    /// The lock was acquired, the work ran and the lock was released.
    Completed(R),
    /// Another holder owns the lock; the work was not run.
    Skipped { key: LockKey },
}

impl<R> RunOutcome<R> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped { .. })
    }

    /// The work's return value, or `None` if skipped.
    pub fn completed(self) -> Option<R> {
        match self {
            RunOutcome::Completed(value) => Some(value),
            RunOutcome::Skipped { .. } => None,
        }
    }

    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> RunOutcome<T> {
        match self {
            RunOutcome::Completed(value) => RunOutcome::Completed(f(value)),
            RunOutcome::Skipped { key } => RunOutcome::Skipped { key },
        }
    }
}

/// A guarded run failed.
#[derive(Error, Debug)]
pub enum GuardError<E> {
    /// The work failed; the lock was released before returning.
    #[error("job work failed: {0}")]
    Work(#[source] E),

    /// The lock could not be acquired because the store failed.
    #[error("failed to acquire job lock: {0}")]
    Store(#[source] StoreError),

    /// The work finished but the lock could not be released; the key is
    /// still held and needs manual clearing.
    #[error("failed to release job lock '{key}', it remains held: {source}")]
    Release {
        key: LockKey,
        #[source]
        source: StoreError,
        /// The work's own error, when it had failed too.
        work_error: Option<E>,
    },
}

impl<E> GuardError<E> {
    /// The work's error, if the work failed.
    pub fn into_work_error(self) -> Option<E> {
        match self {
            GuardError::Work(e) => Some(e),
            GuardError::Release { work_error, .. } => work_error,
            GuardError::Store(_) => None,
        }
    }

    /// Key left behind by a failed release.
    pub fn stale_key(&self) -> Option<&LockKey> {
        match self {
            GuardError::Release { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Information about a held lock.
#[derive(Debug, Clone)]
pub struct LockInfo {
    pub key: LockKey,

    /// Decoded marker; `None` when the value is not joblock metadata.
    pub metadata: Option<LockMetadata>,

    /// Whether the lock is older than the stale threshold.
    pub is_stale: bool,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.metadata {
            Some(meta) => write!(
                f,
                "{} (owner: {}, age: {}, job: {}{})",
                self.key,
                meta.owner,
                meta.age_string(),
                meta.job,
                if self.is_stale { ", STALE" } else { "" }
            ),
            None => write!(f, "{} (no metadata)", self.key),
        }
    }
}
