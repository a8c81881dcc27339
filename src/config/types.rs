//! Configuration types and defaults for softlock.

use serde::{Deserialize, Serialize};

/// Broadcast channels for each lock event kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channels for `locked` events.
    pub locked: Vec<String>,

    /// Channels for `unlocked` events.
    pub unlocked: Vec<String>,

    /// Channels for `unlock_requested` events.
    pub request: Vec<String>,
}

// Default value functions for serde
pub(crate) fn default_holder_model() -> String {
    "user".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}
