//! Lock record engine.
//!
//! Owns the collaborators every lock operation needs: the store, the
//! config, the clock, the principal lookup, and an optional dispatcher.
//! Operations take the subject explicitly; the [`Locker`](super::Locker)
//! facade adapts them to [`Lockable`](crate::subject::Lockable) entities.

use super::{LockRecord, LockRequest};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::duration::{self, DurationInput, HARD_DEFAULT_DURATION, LockDuration};
use crate::error::Result;
use crate::events::{EventDispatcher, LockEvent, Notification};
use crate::principal::{self, HolderId, NoPrincipal, PrincipalLookup};
use crate::store::LockStore;
use crate::subject::SubjectRef;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct LockEngine {
    store: Arc<dyn LockStore>,
    config: Config,
    clock: Arc<dyn Clock>,
    principal: Arc<dyn PrincipalLookup>,
    dispatcher: Option<Arc<dyn EventDispatcher>>,
}

impl LockEngine {
    /// Engine on the system clock, with no principal and no dispatcher.
    pub fn new(store: Arc<dyn LockStore>, config: Config) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
            principal: Arc::new(NoPrincipal),
            dispatcher: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_principal_lookup(mut self, principal: Arc<dyn PrincipalLookup>) -> Self {
        self.principal = principal;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn LockStore {
        self.store.as_ref()
    }

    /// Resolve the lock duration for a subject type.
    ///
    /// Precedence: `explicit`, then `subject_default` (falling back to the
    /// configured `subject_durations` entry), then `default_duration`, then
    /// five minutes.
    pub fn resolve_duration(
        &self,
        explicit: Option<&DurationInput>,
        subject_default: Option<&DurationInput>,
        type_tag: &str,
    ) -> Result<LockDuration> {
        if let Some(input) = explicit
            && let Some(duration) = input.parse()?
        {
            return Ok(duration);
        }

        // An empty entity default defers to the configured one for its type.
        let configured_subject = self.config.subject_duration(type_tag);
        let entity_level = match subject_default {
            Some(input) => input.parse()?.map(|_| input),
            None => None,
        };

        duration::resolve_duration(
            None,
            entity_level.or(configured_subject.as_ref()),
            self.config.default_duration_input().as_ref(),
            &DurationInput::from(HARD_DEFAULT_DURATION),
        )
    }

    pub fn resolve_holder(&self, explicit: Option<HolderId>) -> Option<HolderId> {
        principal::resolve_holder(
            explicit,
            self.config.use_current_principal,
            self.principal.as_ref(),
        )
    }

    pub fn find_active(&self, subject: &SubjectRef) -> Result<Option<LockRecord>> {
        self.store.find_active(subject, self.now())
    }

    /// Lock `subject`, refreshing its active record or creating one.
    ///
    /// The returned record is persisted and carries a token. Re-locking an
    /// active record keeps its token.
    pub fn acquire(
        &self,
        subject: &SubjectRef,
        subject_default: Option<&DurationInput>,
        request: LockRequest,
    ) -> Result<LockRecord> {
        let now = self.now();
        let duration =
            self.resolve_duration(request.duration.as_ref(), subject_default, &subject.type_tag)?;
        let holder = self.resolve_holder(request.holder);

        let mut record = match self.store.find_active(subject, now)? {
            Some(record) => record,
            None => LockRecord::new(subject.clone(), now),
        };

        self.apply(&mut record, &duration, holder, now)?;

        debug!(
            subject = %subject,
            holder = ?record.holder_id,
            locked_until = %record.locked_until,
            "acquired lock"
        );
        Ok(record)
    }

    fn apply(
        &self,
        record: &mut LockRecord,
        duration: &LockDuration,
        holder: Option<HolderId>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        record.locked_until = duration.expires_at(now)?;
        record.holder_id = holder;
        record.ensure_token();
        self.store.save(record)
    }

    pub fn is_active(&self, record: Option<&LockRecord>) -> bool {
        record.is_some_and(|record| record.is_active_at(self.now()))
    }

    /// Whether `token` opens the lock. An inactive lock opens for anyone.
    pub fn verify(&self, record: Option<&LockRecord>, token: Option<&str>) -> bool {
        match record {
            Some(record) if record.is_active_at(self.now()) => record.matches_token(token),
            _ => true,
        }
    }

    /// Delete the persisted record. Returns whether a record was removed.
    pub fn release(&self, record: &LockRecord) -> Result<bool> {
        let removed = self.store.delete(record)?;
        debug!(subject = %record.subject, removed, "released lock");
        Ok(removed)
    }

    /// Ask the holder to release `record`.
    ///
    /// Emits `UnlockRequested`; with `shorten` and a configured
    /// `request_shorten_duration`, re-locks for that duration keeping the
    /// holder. An inactive record, or one no longer stored under the same
    /// id, is left alone and `false` returned.
    pub fn request_release(
        &self,
        record: &mut LockRecord,
        requesting_user: Option<HolderId>,
        message: &str,
        shorten: bool,
    ) -> Result<bool> {
        let now = self.now();
        if !record.is_active_at(now) {
            return Ok(false);
        }

        // The caller's copy may be stale: the lock can have been released,
        // or released and taken again, since it was loaded.
        match self.store.find_active(&record.subject, now)? {
            Some(current) if current.id == record.id => *record = current,
            _ => {
                debug!(subject = %record.subject, "unlock request on a lock that is gone");
                return Ok(false);
            }
        }

        self.notify(LockEvent::UnlockRequested {
            subject: record.subject.clone(),
            requesting_user,
            message: message.to_string(),
        });

        if shorten
            && let Some(input) = self.config.shorten_duration_input()
            && let Some(duration) = input.parse()?
        {
            let holder = record.holder_id.clone();
            self.apply(record, &duration, holder, now)?;
            debug!(
                subject = %record.subject,
                locked_until = %record.locked_until,
                "shortened lock after unlock request"
            );
        }

        Ok(true)
    }

    /// Hand an event to the dispatcher, if any. Failures are only logged.
    pub fn notify(&self, event: LockEvent) {
        let Some(dispatcher) = &self.dispatcher else {
            return;
        };

        let notification = Notification::new(event, &self.config, self.now());
        if let Err(e) = dispatcher.dispatch(&notification) {
            warn!(
                kind = %notification.event.kind(),
                subject = %notification.event.subject(),
                error = %e,
                "failed to dispatch lock event"
            );
        }
    }
}
