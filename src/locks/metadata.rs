//! Lock metadata stored as the value of each lock record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Lock metadata written as the marker value of a lock.
///
/// The guard never reads it back in the default release mode; it exists for
/// operators (`joblock lock list`) and for owner-checked release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Timestamp when the lock was created (RFC3339).
    pub created_at: DateTime<Utc>,

    /// Job type name the lock was taken for.
    pub job: String,

    /// Unique per acquisition; distinguishes two holders of the same key.
    pub token: String,
}

impl LockMetadata {
    /// Create new lock metadata with the current timestamp.
    pub fn new(job: &str) -> Self {
        let created_at = Utc::now();
        let pid = std::process::id();
        let token = format!(
            "{}-{}-{}",
            pid,
            created_at.timestamp_nanos_opt().unwrap_or_default(),
            TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        Self {
            owner: get_owner_string(),
            pid: Some(pid),
            created_at,
            job: job.to_string(),
            token,
        }
    }

    /// Parse metadata from a stored marker value.
    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Encode as the marker value written to the store.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Calculate the age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Check if the lock is stale based on the given threshold in minutes.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age().num_minutes() > i64::from(stale_minutes)
    }
}

/// Get the owner string for lock metadata.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
