//! Lock operations on [`Lockable`] entities.

use super::{LockArg, LockEngine, LockRequest};
use crate::error::Result;
use crate::events::LockEvent;
use crate::principal::HolderId;
use crate::subject::Lockable;
use chrono::{DateTime, Utc};

/// Entity-facing lock API.
///
/// Queries read the record held in the entity's [`LockState`]; call
/// [`Locker::load`] to refresh it from the store.
///
/// [`LockState`]: crate::subject::LockState
pub struct Locker {
    engine: LockEngine,
}

impl Locker {
    pub fn new(engine: LockEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &LockEngine {
        &self.engine
    }

    /// Replace the entity's lock state with the store's active record.
    pub fn load<L: Lockable + ?Sized>(&self, subject: &mut L) -> Result<()> {
        let record = self.engine.find_active(&subject.subject_ref())?;
        let state = subject.lock_state_mut();
        match record {
            Some(record) => state.attach(record),
            None => {
                state.clear();
            }
        }
        Ok(())
    }

    pub fn is_locked<L: Lockable + ?Sized>(&self, subject: &L) -> bool {
        self.engine.is_active(subject.lock_state().record())
    }

    pub fn is_accessible<L: Lockable + ?Sized>(&self, subject: &L, token: Option<&str>) -> bool {
        !self.is_locked(subject) || self.engine.verify(subject.lock_state().record(), token)
    }

    pub fn locked_until<L: Lockable + ?Sized>(&self, subject: &L) -> Option<DateTime<Utc>> {
        if !self.is_locked(subject) {
            return None;
        }
        subject.lock_state().record().map(|record| record.locked_until)
    }

    pub fn locked_by<L: Lockable + ?Sized>(&self, subject: &L) -> Option<HolderId> {
        if !self.is_locked(subject) {
            return None;
        }
        subject
            .lock_state()
            .record()
            .and_then(|record| record.holder_id.clone())
    }

    /// Lock the entity and return the lock token.
    ///
    /// `first` is a duration or, to lock with the default duration on
    /// someone's behalf, a holder; a holder there overrides `holder`.
    pub fn lock<L: Lockable + ?Sized>(
        &self,
        subject: &mut L,
        first: Option<LockArg>,
        holder: Option<HolderId>,
    ) -> Result<String> {
        let subject_ref = subject.subject_ref();
        let request = LockRequest::from_args(first, holder);
        let subject_default = subject.lock_duration();

        let mut record = self
            .engine
            .acquire(&subject_ref, subject_default.as_ref(), request)?;
        let token = record.ensure_token().to_string();

        subject.lock_state_mut().attach(record);
        self.engine.notify(LockEvent::Locked {
            subject: subject_ref,
        });

        Ok(token)
    }

    /// Release the entity's lock.
    ///
    /// Returns whether a record was removed; `Unlocked` is emitted only then,
    /// so repeated calls notify once.
    pub fn unlock<L: Lockable + ?Sized>(&self, subject: &mut L) -> Result<bool> {
        let subject_ref = subject.subject_ref();

        let mut removed = match subject.lock_state().record() {
            Some(record) => self.engine.release(record)?,
            None => false,
        };
        if !removed && let Some(stored) = self.engine.find_active(&subject_ref)? {
            removed = self.engine.release(&stored)?;
        }

        subject.lock_state_mut().clear();
        if removed {
            self.engine.notify(LockEvent::Unlocked {
                subject: subject_ref,
            });
        }

        Ok(removed)
    }

    /// Ask the holder to release the entity.
    ///
    /// Returns the possibly shortened expiry, or `None` without notifying
    /// anyone when the entity is not locked. A lock released or replaced
    /// since the entity loaded it counts as not locked and the entity's
    /// state is cleared.
    pub fn request_unlock<L: Lockable + ?Sized>(
        &self,
        subject: &mut L,
        requesting_user: Option<HolderId>,
        message: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        if !self.is_locked(subject) {
            return Ok(None);
        }

        let requested = match subject.lock_state_mut().record_mut() {
            Some(record) => self
                .engine
                .request_release(record, requesting_user, message, true)?,
            None => false,
        };

        if !requested {
            subject.lock_state_mut().clear();
            return Ok(None);
        }

        Ok(self.locked_until(subject))
    }
}
