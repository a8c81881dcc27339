//! Lockable subjects.
//!
//! Any entity can be locked: it names itself with a [`SubjectRef`] (type tag
//! plus id) and carries a [`LockState`] holding its currently loaded lock
//! record, exposed through the [`Lockable`] trait.

use crate::duration::DurationInput;
use crate::error::{LockingError, Result};
use crate::locks::LockRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a locked entity: its type tag and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectRef {
    pub type_tag: String,
    pub id: String,
}

impl SubjectRef {
    /// Create a subject reference, rejecting empty parts.
    pub fn new(type_tag: impl Into<String>, id: impl Into<String>) -> Result<Self> {
        let type_tag = type_tag.into();
        let id = id.into();

        if type_tag.trim().is_empty() {
            return Err(LockingError::UserError(
                "subject type must not be empty".to_string(),
            ));
        }
        if id.trim().is_empty() {
            return Err(LockingError::UserError(format!(
                "subject id for type '{}' must not be empty",
                type_tag
            )));
        }

        Ok(Self { type_tag, id })
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_tag, self.id)
    }
}

/// In-memory reference from an entity to its lock record.
///
/// An empty state means "not locked" everywhere.
#[derive(Debug, Clone, Default)]
pub struct LockState {
    record: Option<LockRecord>,
}

impl LockState {
    pub fn record(&self) -> Option<&LockRecord> {
        self.record.as_ref()
    }

    pub fn record_mut(&mut self) -> Option<&mut LockRecord> {
        self.record.as_mut()
    }

    pub fn attach(&mut self, record: LockRecord) {
        self.record = Some(record);
    }

    pub fn clear(&mut self) -> Option<LockRecord> {
        self.record.take()
    }
}

/// Capability granting lock behavior to an entity.
pub trait Lockable {
    /// Stable reference to this entity.
    fn subject_ref(&self) -> SubjectRef;

    fn lock_state(&self) -> &LockState;

    fn lock_state_mut(&mut self) -> &mut LockState;

    /// Entity-level default lock duration, consulted after an explicit one.
    fn lock_duration(&self) -> Option<DurationInput> {
        None
    }
}

/// Minimal lockable handle for callers that only know the subject reference.
#[derive(Debug, Clone)]
pub struct SubjectHandle {
    subject: SubjectRef,
    state: LockState,
}

impl SubjectHandle {
    pub fn new(subject: SubjectRef) -> Self {
        Self {
            subject,
            state: LockState::default(),
        }
    }
}

impl Lockable for SubjectHandle {
    fn subject_ref(&self) -> SubjectRef {
        self.subject.clone()
    }

    fn lock_state(&self) -> &LockState {
        &self.state
    }

    fn lock_state_mut(&mut self) -> &mut LockState {
        &mut self.state
    }
}
