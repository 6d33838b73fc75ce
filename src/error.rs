//! Error types for joblock.
//!
//! Uses thiserror for derive macros. The library core reports failures with
//! [`StoreError`](crate::store::StoreError) and
//! [`GuardError`](crate::locks::GuardError); `JoblockError` is the
//! operator-facing error used by config loading and the CLI.

use crate::exit_codes;
use crate::key::LockKey;
use crate::store::StoreError;
use thiserror::Error;

/// Operator-facing error type.
///
/// Each variant maps to a specific exit code.
#[derive(Error, Debug)]
pub enum JoblockError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// The lock store could not complete an operation.
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    /// The lock was held by another worker.
    #[error("Lock is held by another worker: {0}")]
    LockHeld(LockKey),

    /// The guarded job ran and failed.
    #[error("Job failed: {0}")]
    WorkFailed(String),

    /// The job finished but its lock could not be released.
    #[error(
        "lock '{key}' could not be released and is still held; clear it with `joblock lock clear {key} --force` once the store is reachable: {source}"
    )]
    StaleLock {
        key: LockKey,
        #[source]
        source: StoreError,
    },
}

impl JoblockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            JoblockError::UserError(_) => exit_codes::USER_ERROR,
            JoblockError::Store(_) => exit_codes::STORE_FAILURE,
            JoblockError::LockHeld(_) => exit_codes::LOCK_HELD,
            JoblockError::WorkFailed(_) => exit_codes::WORK_FAILURE,
            JoblockError::StaleLock { .. } => exit_codes::STORE_FAILURE,
        }
    }
}

/// Result type alias for joblock operations.
pub type Result<T> = std::result::Result<T, JoblockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = JoblockError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn store_error_has_correct_exit_code() {
        let err = JoblockError::Store(StoreError::Backend("connection refused".to_string()));
        assert_eq!(err.exit_code(), exit_codes::STORE_FAILURE);
    }

    #[test]
    fn lock_held_has_correct_exit_code() {
        let err = JoblockError::LockHeld(LockKey::new("locked:Job-[1]"));
        assert_eq!(err.exit_code(), exit_codes::LOCK_HELD);
    }

    #[test]
    fn work_failed_has_correct_exit_code() {
        let err = JoblockError::WorkFailed("exit status 1".to_string());
        assert_eq!(err.exit_code(), exit_codes::WORK_FAILURE);
    }

    #[test]
    fn stale_lock_names_the_key() {
        let err = JoblockError::StaleLock {
            key: LockKey::new("locked:Job-[1]"),
            source: StoreError::Backend("timeout".to_string()),
        };
        assert_eq!(err.exit_code(), exit_codes::STORE_FAILURE);
        let msg = err.to_string();
        assert!(msg.contains("locked:Job-[1]"));
        assert!(msg.contains("--force"));
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = JoblockError::WorkFailed("exit status 3".to_string());
        assert_eq!(err.to_string(), "Job failed: exit status 3");

        let err = JoblockError::LockHeld(LockKey::new("locked:Job-[]"));
        assert_eq!(
            err.to_string(),
            "Lock is held by another worker: locked:Job-[]"
        );
    }
}
