//! Lock lifecycle notifications.
//!
//! The engine and facade describe what happened as a [`LockEvent`], wrap it
//! in a [`Notification`] carrying broadcast metadata from the config, and
//! hand it to an optional [`EventDispatcher`]. Dispatch is fire-and-forget:
//! the lock operation never fails because a dispatcher did.

mod log;

pub use log::{EventLog, LogEntry};

use crate::config::Config;
use crate::error::{LockingError, Result};
use crate::principal::HolderId;
use crate::subject::SubjectRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Kinds of lock events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Locked,
    Unlocked,
    UnlockRequested,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Locked => "locked",
            EventKind::Unlocked => "unlocked",
            EventKind::UnlockRequested => "unlock_requested",
        }
    }

    /// Parse an event kind from its snake_case name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "locked" => Some(Self::Locked),
            "unlocked" => Some(Self::Unlocked),
            "unlock_requested" => Some(Self::UnlockRequested),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something that happened to a subject's lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LockEvent {
    Locked {
        subject: SubjectRef,
    },
    Unlocked {
        subject: SubjectRef,
    },
    UnlockRequested {
        subject: SubjectRef,
        #[serde(skip_serializing_if = "Option::is_none")]
        requesting_user: Option<HolderId>,
        message: String,
    },
}

impl LockEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LockEvent::Locked { .. } => EventKind::Locked,
            LockEvent::Unlocked { .. } => EventKind::Unlocked,
            LockEvent::UnlockRequested { .. } => EventKind::UnlockRequested,
        }
    }

    pub fn subject(&self) -> &SubjectRef {
        match self {
            LockEvent::Locked { subject }
            | LockEvent::Unlocked { subject }
            | LockEvent::UnlockRequested { subject, .. } => subject,
        }
    }
}

/// Where and under which name an event should be broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    pub name: String,
    pub channels: Vec<String>,
}

/// An event plus its delivery metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub event: LockEvent,
    pub occurred_at: DateTime<Utc>,
    /// `None` when broadcasting is disabled in the config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<Broadcast>,
}

impl Notification {
    pub fn new(event: LockEvent, config: &Config, occurred_at: DateTime<Utc>) -> Self {
        let kind = event.kind();
        let broadcast = config.broadcast_enabled.then(|| Broadcast {
            name: config.broadcast_name(kind),
            channels: config.channels_for(kind).to_vec(),
        });

        Self {
            event,
            occurred_at,
            broadcast,
        }
    }
}

/// Receives lock notifications.
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, notification: &Notification) -> Result<()>;
}

/// Dispatcher that keeps notifications in memory, in dispatch order.
#[derive(Debug, Default)]
pub struct MemoryDispatcher {
    received: Mutex<Vec<Notification>>,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    /// Just the events, without metadata.
    pub fn events(&self) -> Vec<LockEvent> {
        self.notifications()
            .into_iter()
            .map(|notification| notification.event)
            .collect()
    }
}

impl EventDispatcher for MemoryDispatcher {
    fn dispatch(&self, notification: &Notification) -> Result<()> {
        self.received
            .lock()
            .map_err(|_| LockingError::Storage("event buffer poisoned".to_string()))?
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn subject() -> SubjectRef {
        SubjectRef::new("post", "1").unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_event_kind_names_roundtrip() {
        for kind in [EventKind::Locked, EventKind::Unlocked, EventKind::UnlockRequested] {
            assert_eq!(EventKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_str("deleted"), None);
    }

    #[test]
    fn test_event_kind_and_subject() {
        let event = LockEvent::UnlockRequested {
            subject: subject(),
            requesting_user: Some(HolderId::from("bob")),
            message: "please".to_string(),
        };
        assert_eq!(event.kind(), EventKind::UnlockRequested);
        assert_eq!(event.subject(), &subject());
    }

    #[test]
    fn test_notification_carries_configured_broadcast() {
        let mut config = Config::default();
        config.channels.unlocked = vec!["posts".to_string()];
        config
            .broadcast_as
            .insert("unlocked".to_string(), "post.unlocked".to_string());

        let notification =
            Notification::new(LockEvent::Unlocked { subject: subject() }, &config, at());

        let broadcast = notification.broadcast.unwrap();
        assert_eq!(broadcast.name, "post.unlocked");
        assert_eq!(broadcast.channels, vec!["posts"]);
        assert_eq!(notification.occurred_at, at());
    }

    #[test]
    fn test_notification_without_broadcast_when_disabled() {
        let config = Config {
            broadcast_enabled: false,
            ..Config::default()
        };

        let notification = Notification::new(LockEvent::Locked { subject: subject() }, &config, at());
        assert!(notification.broadcast.is_none());
    }

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let event = LockEvent::Locked { subject: subject() };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["kind"], "locked");
        assert_eq!(json["subject"]["type_tag"], "post");
        assert_eq!(json["subject"]["id"], "1");
    }

    #[test]
    fn test_memory_dispatcher_keeps_order() {
        let dispatcher = MemoryDispatcher::new();
        let config = Config::default();

        dispatcher
            .dispatch(&Notification::new(LockEvent::Locked { subject: subject() }, &config, at()))
            .unwrap();
        dispatcher
            .dispatch(&Notification::new(LockEvent::Unlocked { subject: subject() }, &config, at()))
            .unwrap();

        let kinds: Vec<EventKind> = dispatcher.events().iter().map(LockEvent::kind).collect();
        assert_eq!(kinds, vec![EventKind::Locked, EventKind::Unlocked]);
    }
}
