//! Removal of expired locks.
//!
//! Expired records stop counting as locks the moment they expire but stay in
//! the store until swept. A sweep deletes them and emits one `Unlocked` per
//! distinct subject that still exists.

use crate::error::Result;
use crate::events::LockEvent;
use crate::locks::LockEngine;
use crate::subject::SubjectRef;
use std::collections::BTreeSet;
use tracing::info;

/// Decides whether a subject still exists.
pub trait SubjectResolver {
    fn resolves(&self, subject: &SubjectRef) -> bool;
}

impl<F> SubjectResolver for F
where
    F: Fn(&SubjectRef) -> bool,
{
    fn resolves(&self, subject: &SubjectRef) -> bool {
        self(subject)
    }
}

/// Resolver treating every subject as existing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllSubjects;

impl SubjectResolver for AllSubjects {
    fn resolves(&self, _subject: &SubjectRef) -> bool {
        true
    }
}

/// Outcome of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records deleted.
    pub removed: usize,
    /// Subjects notified as unlocked, in order.
    pub unlocked: Vec<SubjectRef>,
}

/// Delete every expired record and notify once per resolvable subject.
pub fn flush_expired(engine: &LockEngine, resolver: &dyn SubjectResolver) -> Result<SweepReport> {
    let now = engine.now();
    let store = engine.store();

    // Only subjects whose expired record this sweep actually removed are
    // notified; a record replaced since the listing is left alone.
    let mut removed = 0;
    let mut unlocked = BTreeSet::new();
    for record in store.find_expired(now)? {
        if !store.delete(&record)? {
            continue;
        }
        removed += 1;
        if resolver.resolves(&record.subject) {
            unlocked.insert(record.subject);
        }
    }

    for subject in &unlocked {
        engine.notify(LockEvent::Unlocked {
            subject: subject.clone(),
        });
    }

    info!(
        removed,
        unlocked = unlocked.len(),
        "expired locks flushed"
    );

    Ok(SweepReport {
        removed,
        unlocked: unlocked.into_iter().collect(),
    })
}
