//! In-process lock store.

use super::LockStore;
use crate::error::{LockingError, Result};
use crate::locks::LockRecord;
use crate::subject::SubjectRef;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryLockStore {
    records: Mutex<HashMap<SubjectRef, LockRecord>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<SubjectRef, LockRecord>>> {
        self.records
            .lock()
            .map_err(|e| LockingError::Storage(format!("lock store mutex poisoned: {}", e)))
    }
}

impl LockStore for MemoryLockStore {
    fn find_active(&self, subject: &SubjectRef, now: DateTime<Utc>) -> Result<Option<LockRecord>> {
        Ok(self
            .records()?
            .get(subject)
            .filter(|record| record.is_active_at(now))
            .cloned())
    }

    fn save(&self, record: &LockRecord) -> Result<()> {
        self.records()?
            .insert(record.subject.clone(), record.clone());
        Ok(())
    }

    fn delete(&self, record: &LockRecord) -> Result<bool> {
        let mut records = self.records()?;
        match records.get(&record.subject) {
            Some(stored) if stored.id == record.id => {
                records.remove(&record.subject);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<LockRecord>> {
        let mut expired: Vec<LockRecord> = self
            .records()?
            .values()
            .filter(|record| !record.is_active_at(now))
            .cloned()
            .collect();
        expired.sort_by(|a, b| a.subject.cmp(&b.subject));
        Ok(expired)
    }

    fn all(&self) -> Result<Vec<LockRecord>> {
        let mut records: Vec<LockRecord> = self.records()?.values().cloned().collect();
        records.sort_by(|a, b| a.subject.cmp(&b.subject));
        Ok(records)
    }
}
