//! Exit code constants for the joblock CLI.
//!
//! - 0: Success (including a skipped run, unless `--fail-on-skip` is set)
//! - 1: User error (bad args, bad config, unknown lock)
//! - 2: The guarded job itself failed
//! - 3: The lock store could not be reached, or a lock could not be released
//! - 4: The lock was held by another worker and `--fail-on-skip` was set

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or a lock that does not exist.
pub const USER_ERROR: i32 = 1;

/// The guarded command ran and failed.
pub const WORK_FAILURE: i32 = 2;

/// Store communication failure, including a failed release.
pub const STORE_FAILURE: i32 = 3;

/// Lock held by another worker.
pub const LOCK_HELD: i32 = 4;
