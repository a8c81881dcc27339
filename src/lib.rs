//! Softlock: timestamp-based soft locking of records.
//!
//! A lock is a record naming a subject, an optional holder, an expiry and a
//! token. Locks are advisory: holders present their token and everyone else
//! checks [`Locker::is_accessible`](locks::Locker::is_accessible) before
//! editing. Expired locks stop counting immediately and are removed by
//! [`sweep::flush_expired`].

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod context;
pub mod duration;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod principal;
pub mod store;
pub mod subject;
pub mod sweep;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{LockingError, Result};
pub use locks::{LockArg, LockEngine, LockRecord, LockRequest, Locker};
pub use subject::{LockState, Lockable, SubjectRef};
