//! Lock key derivation.
//!
//! A [`LockKey`] names the mutual-exclusion domain of a job invocation. Keys
//! are derived from the job type name and its argument list by a
//! [`KeyDeriver`]; the default deriver produces
//! `"locked:" + job_type + "-" + <compact JSON array of args>`.
//!
//! Job types can override derivation through a [`DeriverRegistry`] to
//! collapse the key space (a constant key, a subset of the arguments) or to
//! widen it with extra context.
//!
//! Derivation is pure: it never consults a store.

mod deriver;
mod registry;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use deriver::{ArgSubsetKey, ConstantKey, DefaultKeyDeriver, KeyDeriver, render_args};
pub use registry::DeriverRegistry;

/// Namespace prefix used by the default deriver.
pub const DEFAULT_NAMESPACE: &str = "locked:";

/// A store key identifying one lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockKey(String);

impl LockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LockKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for LockKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for LockKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}
