//! Event logging for joblock.
//!
//! The CLI dispatcher appends one event per lock transition so operators can
//! reconstruct who ran what and which locks were left behind. Events are
//! stored in NDJSON format (one JSON object per line).
//!
//! The lock guard itself never writes events; only the dispatcher layer does.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: acquired, skipped, released, work_failed, release_failed, lock_clear
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `key`: The lock key the event concerns
//! - `details`: Freeform object with action-specific details

use crate::error::{JoblockError, Result};
use crate::key::LockKey;
use crate::locks::get_owner_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Lock acquired; the job is about to run.
    Acquired,
    /// Lock held elsewhere; the job did not run.
    Skipped,
    /// Job finished and its lock was released.
    Released,
    /// Job failed; its lock was released.
    WorkFailed,
    /// Lock could not be released and is still held.
    ReleaseFailed,
    /// Lock cleared manually.
    LockClear,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Acquired => write!(f, "acquired"),
            EventAction::Skipped => write!(f, "skipped"),
            EventAction::Released => write!(f, "released"),
            EventAction::WorkFailed => write!(f, "work_failed"),
            EventAction::ReleaseFailed => write!(f, "release_failed"),
            EventAction::LockClear => write!(f, "lock_clear"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    pub key: LockKey,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event for `key`.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction, key: LockKey) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_owner_string(),
            key,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            JoblockError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Append an event to the events log at `events_file`.
///
/// The file and its parent directory are created if they don't exist. Each
/// append results in one line with a trailing newline.
pub fn append_event(events_file: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    if let Some(events_dir) = events_file.parent()
        && !events_dir.as_os_str().is_empty()
        && !events_dir.exists()
    {
        fs::create_dir_all(events_dir).map_err(|e| {
            JoblockError::UserError(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(events_file)
        .map_err(|e| {
            JoblockError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        JoblockError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        JoblockError::UserError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read every event from `events_file`, oldest first.
///
/// A missing file reads as no events. Lines that fail to parse are skipped.
pub fn read_events(events_file: &Path) -> Result<Vec<Event>> {
    let content = match fs::read_to_string(events_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(JoblockError::UserError(format!(
                "failed to read events file '{}': {}",
                events_file.display(),
                e
            )));
        }
    };

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}
