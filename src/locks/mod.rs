//! Job locking for joblock.
//!
//! This module implements the at-most-one-concurrent-run discipline:
//! - [`LockGuard`] acquires a job's lock with the store's atomic
//!   set-if-absent, runs the work, and releases the lock on every exit path
//! - [`LockInspector`] reports, lists and manually clears locks
//!
//! # Skipping
//!
//! A worker that loses the race does not wait, retry, or get notified: its
//! run returns [`RunOutcome::Skipped`]. That is a normal outcome, not an
//! error, and dispatchers treat it as a completed job.
//!
//! # Lock Metadata
//!
//! Each lock's value is JSON metadata:
//! - `owner`: The owner of the lock (e.g., `user@HOST`)
//! - `pid`: The process ID (optional)
//! - `created_at`: RFC3339 timestamp
//! - `job`: The job type name
//! - `token`: Unique per acquisition (used by owner-checked release)
//!
//! # Stale Locks
//!
//! Locks never expire. A worker that crashes between acquisition and release
//! leaves its key set until someone clears it. The inspector flags locks
//! older than the stale threshold so operators can find them.

mod guard;
mod held;
mod inspector;
mod metadata;
mod types;


// Re-export public API
pub use guard::LockGuard;
pub use inspector::{DEFAULT_STALE_MINUTES, LockInspector};
pub use metadata::LockMetadata;
pub use types::{GuardError, LockInfo, ReleaseMode, RunOutcome};

pub(crate) use metadata::get_owner_string;
