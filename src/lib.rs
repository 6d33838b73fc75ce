//! joblock: at most one concurrent run per job, across any number of workers.
//!
//! Workers coordinate through a shared store that offers an atomic
//! "set if absent". Each job invocation derives a lock key from its type name
//! and arguments; the [`LockGuard`](locks::LockGuard) runs the job only if it
//! creates that key, and deletes the key when the job finishes. A worker
//! that finds the key already present skips the job.
//!
//! ```
//! use joblock::locks::{LockGuard, RunOutcome};
//! use joblock::store::MemoryStore;
//! use serde_json::json;
//!
//! let guard = LockGuard::new(MemoryStore::new());
//! let outcome = guard.run("SyncAccount", &[json!("acct-42")], || {
//!     Ok::<_, std::io::Error>("synced")
//! })?;
//! assert_eq!(outcome, RunOutcome::Completed("synced"));
//! # Ok::<(), joblock::locks::GuardError<std::io::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod job;
pub mod key;
pub mod locks;
pub mod logging;
pub mod store;

#[cfg(test)]
mod test_support;
