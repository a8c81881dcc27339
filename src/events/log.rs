//! Append-only NDJSON event log.
//!
//! Each dispatched notification becomes one JSON object per line:
//! - `ts`: RFC3339 timestamp of the event
//! - `actor`: the local actor string (`user@HOST`)
//! - `event`: the lock event, tagged by `kind`
//! - `broadcast`: broadcast name and channels, omitted when disabled

use super::{Broadcast, EventDispatcher, LockEvent, Notification};
use crate::error::{LockingError, Result};
use crate::principal::local_actor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One line of the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub ts: DateTime<Utc>,
    pub actor: String,
    pub event: LockEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<Broadcast>,
}

impl LogEntry {
    fn from_notification(notification: &Notification) -> Self {
        Self {
            ts: notification.occurred_at,
            actor: local_actor(),
            event: notification.event.clone(),
            broadcast: notification.broadcast.clone(),
        }
    }

    /// Serialize the entry to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            LockingError::Storage(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Dispatcher appending notifications to an NDJSON file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry back, oldest first.
    pub fn read_all(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            LockingError::Storage(format!(
                "failed to read events file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    LockingError::Storage(format!("failed to parse event line: {}", e))
                })
            })
            .collect()
    }

    /// Append one entry as a line, creating the file and directory if needed.
    fn append(&self, entry: &LogEntry) -> Result<()> {
        let json_line = entry.to_ndjson_line()?;

        if let Some(events_dir) = self.path.parent()
            && !events_dir.exists()
        {
            fs::create_dir_all(events_dir).map_err(|e| {
                LockingError::Storage(format!(
                    "failed to create events directory '{}': {}",
                    events_dir.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LockingError::Storage(format!(
                    "failed to open events file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            LockingError::Storage(format!(
                "failed to write event to '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        file.sync_all().map_err(|e| {
            LockingError::Storage(format!(
                "failed to sync events file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

impl EventDispatcher for EventLog {
    fn dispatch(&self, notification: &Notification) -> Result<()> {
        self.append(&LogEntry::from_notification(notification))
    }
}
