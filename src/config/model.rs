//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration consumed by the lock engine.
///
/// This struct represents the contents of `config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Duration settings
    // =========================================================================
    /// System-wide default lock duration (e.g. "10 minutes").
    /// Unset falls back to the built-in 5 minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_duration: Option<String>,

    /// Per subject type default durations, keyed by type tag.
    pub subject_durations: BTreeMap<String, String>,

    /// Duration a lock is shortened to when someone requests its release.
    /// Unset means requests only notify.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_shorten_duration: Option<String>,

    // =========================================================================
    // Holder settings
    // =========================================================================
    /// Whether a lock without an explicit holder is attributed to the
    /// current principal.
    #[serde(default = "default_true")]
    pub use_current_principal: bool,

    /// Name of the identity model holders refer to, used when showing a
    /// holder (`user alice`).
    #[serde(default = "default_holder_model")]
    pub holder_model: String,

    // =========================================================================
    // Notification settings
    // =========================================================================
    /// Whether dispatched events carry broadcast metadata.
    #[serde(default = "default_true")]
    pub broadcast_enabled: bool,

    /// Broadcast name overrides keyed by event kind.
    pub broadcast_as: BTreeMap<String, String>,

    /// Broadcast channels per event kind.
    pub channels: ChannelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration: None,
            subject_durations: BTreeMap::new(),
            request_shorten_duration: None,
            use_current_principal: default_true(),
            holder_model: default_holder_model(),
            broadcast_enabled: default_true(),
            broadcast_as: BTreeMap::new(),
            channels: ChannelConfig::default(),
        }
    }
}
