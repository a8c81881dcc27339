//! Arguments accepted by `lock`.

use crate::duration::DurationInput;
use crate::principal::{HolderId, Principal};
use chrono::{DateTime, Duration, Utc};

/// First positional argument of a lock call: a duration, or a holder when
/// the caller wants the default duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockArg {
    Duration(DurationInput),
    Holder(HolderId),
}

impl LockArg {
    /// Lock on behalf of an identity object, with the default duration.
    pub fn by(principal: &impl Principal) -> Self {
        LockArg::Holder(principal.principal_id())
    }
}

impl From<DurationInput> for LockArg {
    fn from(duration: DurationInput) -> Self {
        LockArg::Duration(duration)
    }
}

impl From<&str> for LockArg {
    fn from(text: &str) -> Self {
        LockArg::Duration(text.into())
    }
}

impl From<String> for LockArg {
    fn from(text: String) -> Self {
        LockArg::Duration(text.into())
    }
}

impl From<Duration> for LockArg {
    fn from(span: Duration) -> Self {
        LockArg::Duration(span.into())
    }
}

impl From<DateTime<Utc>> for LockArg {
    fn from(at: DateTime<Utc>) -> Self {
        LockArg::Duration(at.into())
    }
}

impl From<HolderId> for LockArg {
    fn from(holder: HolderId) -> Self {
        LockArg::Holder(holder)
    }
}

/// Normalized lock arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockRequest {
    pub duration: Option<DurationInput>,
    pub holder: Option<HolderId>,
}

impl LockRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: impl Into<DurationInput>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_holder(mut self, holder: impl Into<HolderId>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    /// Normalize the `(first, holder)` call shape.
    ///
    /// A holder in first position becomes the holder, the duration stays
    /// unset, and the second argument is ignored.
    pub fn from_args(first: Option<LockArg>, holder: Option<HolderId>) -> Self {
        match first {
            Some(LockArg::Holder(first_holder)) => Self {
                duration: None,
                holder: Some(first_holder),
            },
            Some(LockArg::Duration(duration)) => Self {
                duration: Some(duration),
                holder,
            },
            None => Self {
                duration: None,
                holder,
            },
        }
    }
}
