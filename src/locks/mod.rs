//! Soft locks on arbitrary subjects.
//!
//! A lock is a [`LockRecord`] naming the subject, an optional holder, an
//! expiry and a token. [`LockEngine`] implements the record operations;
//! [`Locker`] exposes them on [`Lockable`](crate::subject::Lockable)
//! entities.
//!
//! Locks are advisory: nothing prevents writes to a locked entity. Callers
//! ask [`Locker::is_accessible`] with the token they were handed.
//!
//! Two concurrent `lock` calls on one subject both refresh the same logical
//! record and the last save wins. With [`FileLockStore`](crate::store::FileLockStore)
//! an expired-lock sweep racing a fresh `lock` can also remove the new record.

mod engine;
mod facade;
mod record;
mod request;

pub use engine::LockEngine;
pub use facade::Locker;
pub use record::LockRecord;
pub use request::{LockArg, LockRequest};
