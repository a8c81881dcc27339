//! Persistence for lock records.
//!
//! Stores key records by subject: at most one record exists per subject, so
//! saving a fresh record replaces an expired leftover.

mod file;
mod memory;

pub use file::FileLockStore;
pub use memory::MemoryLockStore;

use crate::error::Result;
use crate::locks::LockRecord;
use crate::subject::SubjectRef;
use chrono::{DateTime, Utc};

/// Storage backend for lock records.
pub trait LockStore: Send + Sync {
    /// The subject's record if it is still active at `now`.
    fn find_active(&self, subject: &SubjectRef, now: DateTime<Utc>) -> Result<Option<LockRecord>>;

    /// Insert or replace the subject's record.
    fn save(&self, record: &LockRecord) -> Result<()>;

    /// Delete the record. Returns `false` when no record with this id was
    /// stored, which includes a record already replaced by a newer one.
    /// The id check and the removal need not be atomic; see
    /// [`FileLockStore`].
    fn delete(&self, record: &LockRecord) -> Result<bool>;

    /// Records whose `locked_until` is at or before `now`.
    fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<LockRecord>>;

    /// Delete every expired record, returning how many were removed.
    fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        for record in self.find_expired(now)? {
            if self.delete(&record)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Every stored record, active or not, ordered by subject.
    fn all(&self) -> Result<Vec<LockRecord>>;
}
