//! Configuration types and defaults for joblock.
//!
//! This module defines enums, constants, and default value functions
//! used by the Config struct.

use crate::key::{ArgSubsetKey, ConstantKey, DEFAULT_NAMESPACE, DeriverRegistry};
use serde::{Deserialize, Serialize};

/// Which lock store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// One lock file per key in a shared directory (default).
    #[default]
    File,
    /// A Redis server (requires the `redis` feature).
    Redis,
}

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Lock directory for the file backend.
    pub dir: String,

    /// Connection URL for the redis backend.
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            dir: default_store_dir(),
            redis_url: default_redis_url(),
        }
    }
}

/// Per-job-type key override.
///
/// `constant: true` locks on the job type alone; `key_args` locks on the
/// listed argument positions only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobKeyConfig {
    pub constant: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_args: Option<Vec<usize>>,
}

impl JobKeyConfig {
    /// Register this override for `job_type` in `registry`.
    pub(crate) fn apply(&self, job_type: &str, registry: &mut DeriverRegistry) {
        if self.constant {
            let key = registry.namespaced(job_type);
            registry.register(job_type, ConstantKey::new(key));
        } else if let Some(positions) = &self.key_args {
            let namespace = registry.namespace().to_string();
            registry.register(job_type, ArgSubsetKey::new(namespace, positions.clone()));
        }
    }
}

pub fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

pub fn default_store_dir() -> String {
    ".joblock/locks".to_string()
}

pub fn default_redis_url() -> String {
    "redis://127.0.0.1/".to_string()
}

pub fn default_events_file() -> String {
    ".joblock/events.ndjson".to_string()
}

pub fn default_lock_stale_minutes() -> u32 {
    crate::locks::DEFAULT_STALE_MINUTES
}

pub fn default_true() -> bool {
    true
}
