//! Config struct definition and default implementation.

use super::types::*;
use crate::locks::ReleaseMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for joblock.
///
/// This struct represents the contents of `joblock.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Key settings
    // =========================================================================
    /// Prefix of every default-derived lock key (default: "locked:").
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Key overrides per job type.
    #[serde(default)]
    pub jobs: BTreeMap<String, JobKeyConfig>,

    // =========================================================================
    // Store settings
    // =========================================================================
    #[serde(default)]
    pub store: StoreConfig,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Minutes after which a lock is reported as stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    /// How a finished run gives its lock back.
    #[serde(default)]
    pub release_mode: ReleaseMode,

    // =========================================================================
    // Audit settings
    // =========================================================================
    /// Whether `run` and `lock clear` append to the events log.
    #[serde(default = "default_true")]
    pub record_events: bool,

    /// Path of the NDJSON events log.
    #[serde(default = "default_events_file")]
    pub events_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            jobs: BTreeMap::new(),
            store: StoreConfig::default(),
            lock_stale_minutes: default_lock_stale_minutes(),
            release_mode: ReleaseMode::default(),
            record_events: default_true(),
            events_file: default_events_file(),
        }
    }
}
