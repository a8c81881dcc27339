//! Error types for softlock.
//!
//! Uses thiserror for derive macros. Every variant maps to a CLI exit code so
//! the binary can report failures consistently.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for lock operations.
#[derive(Error, Debug)]
pub enum LockingError {
    /// Invalid arguments, configuration, or store layout.
    #[error("{0}")]
    UserError(String),

    /// A duration could not be parsed into a timestamp.
    #[error("invalid lock duration: {0}")]
    InvalidDuration(String),

    /// The storage collaborator failed to read, persist or delete a record.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The subject is locked and the presented token does not open it.
    #[error("{0}")]
    Locked(String),
}

impl LockingError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockingError::UserError(_) => exit_codes::USER_ERROR,
            LockingError::InvalidDuration(_) => exit_codes::INVALID_DURATION,
            LockingError::Storage(_) => exit_codes::STORAGE_FAILURE,
            LockingError::Locked(_) => exit_codes::LOCKED,
        }
    }
}

/// Result type alias for softlock operations.
pub type Result<T> = std::result::Result<T, LockingError>;
