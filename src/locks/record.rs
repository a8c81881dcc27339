//! The persisted lock record.

use crate::error::{LockingError, Result};
use crate::principal::HolderId;
use crate::subject::SubjectRef;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A lock on one subject.
///
/// Activity is never stored: a record is active while `now < locked_until`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Opaque record id, assigned at creation.
    pub id: String,

    /// The locked entity.
    pub subject: SubjectRef,

    /// Who holds the lock, if anyone could be determined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_id: Option<HolderId>,

    /// Moment the lock stops being active.
    pub locked_until: DateTime<Utc>,

    /// Credential that opens the lock. Generated once, never replaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LockRecord {
    /// Create an unsaved record without holder or token.
    pub fn new(subject: SubjectRef, locked_until: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject,
            holder_id: None,
            locked_until,
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    /// Get the token, generating it first if the record has none yet.
    pub fn ensure_token(&mut self) -> &str {
        if self.token().is_none() {
            self.token = Some(generate_token());
        }
        self.token.as_deref().unwrap_or_default()
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.locked_until
    }

    /// Whether `token` is this record's token. A record without a token
    /// matches nothing.
    pub fn matches_token(&self, token: Option<&str>) -> bool {
        match (self.token(), token) {
            (Some(own), Some(given)) => own == given,
            _ => false,
        }
    }

    /// Time left until expiry; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.locked_until.signed_duration_since(now)
    }

    /// Format the remaining time as a short human-readable string.
    pub fn remaining_string(&self, now: DateTime<Utc>) -> String {
        let remaining = self.remaining(now);
        if remaining <= Duration::zero() {
            return "expired".to_string();
        }

        let seconds = remaining.num_seconds();
        let minutes = remaining.num_minutes();
        let hours = remaining.num_hours();
        let days = remaining.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Parse a record from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| LockingError::Storage(format!("failed to parse lock record: {}", e)))
    }

    /// Serialize the record to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LockingError::Storage(format!("failed to serialize lock record: {}", e)))
    }
}

fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
