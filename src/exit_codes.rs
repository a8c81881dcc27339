//! Exit code constants for the softlock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config or store)
//! - 2: Duration could not be parsed
//! - 3: Storage failure
//! - 4: Subject is locked and not accessible with the given token

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration or store layout.
pub const USER_ERROR: i32 = 1;

/// A lock duration could not be parsed.
pub const INVALID_DURATION: i32 = 2;

/// The lock store failed to read, write or delete a record.
pub const STORAGE_FAILURE: i32 = 3;

/// The subject is held by an active lock that the caller cannot open.
pub const LOCKED: i32 = 4;
