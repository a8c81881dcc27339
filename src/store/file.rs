//! Lock store keeping one JSON file per subject.
//!
//! Layout:
//! ```text
//! <dir>/
//!   post~42.lock
//!   invoice~2024%2F07.lock
//! ```
//!
//! The type tag and id are percent-escaped so any subject maps to a single
//! flat file name.
//!
//! Writes are atomic but there is no cross-process lock around them. A save
//! replaces whatever is on disk, so the last write wins. `delete` reads the
//! file, compares ids, then removes it; a save that lands between the read
//! and the remove is deleted with it. Both races are accepted.

use super::LockStore;
use crate::error::{LockingError, Result};
use crate::fs::{atomic_write_file, remove_if_exists};
use crate::locks::LockRecord;
use crate::subject::SubjectRef;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

const LOCK_EXTENSION: &str = "lock";

#[derive(Debug, Clone)]
pub struct FileLockStore {
    dir: PathBuf,
}

impl FileLockStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding a subject's record.
    pub fn record_path(&self, subject: &SubjectRef) -> PathBuf {
        self.dir.join(format!(
            "{}~{}.{}",
            escape(&subject.type_tag),
            escape(&subject.id),
            LOCK_EXTENSION
        ))
    }

    fn read(&self, subject: &SubjectRef) -> Result<Option<LockRecord>> {
        let path = self.record_path(subject);
        match fs::read_to_string(&path) {
            Ok(content) => LockRecord::from_json(&content).map(Some).map_err(|e| {
                LockingError::Storage(format!("corrupt lock file '{}': {}", path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LockingError::Storage(format!(
                "failed to read lock file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    /// Load every readable record. Unparsable files are skipped.
    fn load_all(&self) -> Result<Vec<LockRecord>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LockingError::Storage(format!(
                    "failed to read lock directory '{}': {}",
                    self.dir.display(),
                    e
                )));
            }
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                LockingError::Storage(format!(
                    "failed to read lock directory '{}': {}",
                    self.dir.display(),
                    e
                ))
            })?;
            let path = entry.path();

            let is_lock_file = path.extension().is_some_and(|ext| ext == LOCK_EXTENSION)
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_lock_file {
                continue;
            }

            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| LockRecord::from_json(&content).map_err(|e| e.to_string()))
            {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable lock file"),
            }
        }

        records.sort_by(|a, b| a.subject.cmp(&b.subject));
        Ok(records)
    }
}

impl LockStore for FileLockStore {
    fn find_active(&self, subject: &SubjectRef, now: DateTime<Utc>) -> Result<Option<LockRecord>> {
        Ok(self.read(subject)?.filter(|record| record.is_active_at(now)))
    }

    fn save(&self, record: &LockRecord) -> Result<()> {
        atomic_write_file(self.record_path(&record.subject), &record.to_json()?)
    }

    fn delete(&self, record: &LockRecord) -> Result<bool> {
        match self.read(&record.subject)? {
            Some(stored) if stored.id == record.id => {
                remove_if_exists(self.record_path(&record.subject))
            }
            _ => Ok(false),
        }
    }

    fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<LockRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|record| !record.is_active_at(now))
            .collect())
    }

    fn all(&self) -> Result<Vec<LockRecord>> {
        self.load_all()
    }
}

/// Percent-escape every byte outside `[A-Za-z0-9_-]`.
fn escape(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for byte in part.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{:02X}", byte));
        }
    }
    escaped
}
