//! Config loading, validation, and lookup operations.

use super::model::Config;
use crate::duration::DurationInput;
use crate::error::{LockingError, Result};
use crate::events::EventKind;
use crate::principal::HolderId;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LockingError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockingError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from a YAML file, using defaults when the file is absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| LockingError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LockingError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - every duration value must parse
    /// - `holder_model` must be non-empty
    /// - `broadcast_as` keys must name a known event kind
    pub fn validate(&self) -> Result<()> {
        let durations = self
            .default_duration
            .iter()
            .map(|d| ("default_duration".to_string(), d))
            .chain(
                self.request_shorten_duration
                    .iter()
                    .map(|d| ("request_shorten_duration".to_string(), d)),
            )
            .chain(
                self.subject_durations
                    .iter()
                    .map(|(tag, d)| (format!("subject_durations.{}", tag), d)),
            );

        for (key, value) in durations {
            DurationInput::from(value.as_str()).parse().map_err(|e| {
                LockingError::UserError(format!("config validation failed: {}: {}", key, e))
            })?;
        }

        if self.holder_model.trim().is_empty() {
            return Err(LockingError::UserError(
                "config validation failed: holder_model must not be empty".to_string(),
            ));
        }

        for key in self.broadcast_as.keys() {
            if EventKind::from_str(key).is_none() {
                return Err(LockingError::UserError(format!(
                    "config validation failed: broadcast_as key '{}' is not an event kind (expected one of: locked, unlocked, unlock_requested)",
                    key
                )));
            }
        }

        Ok(())
    }

    /// System-wide default duration, if configured.
    pub fn default_duration_input(&self) -> Option<DurationInput> {
        self.default_duration.as_deref().map(DurationInput::from)
    }

    /// Duration to shorten a lock to on an unlock request, if configured.
    pub fn shorten_duration_input(&self) -> Option<DurationInput> {
        self.request_shorten_duration
            .as_deref()
            .map(DurationInput::from)
    }

    /// Configured default duration for a subject type.
    pub fn subject_duration(&self, type_tag: &str) -> Option<DurationInput> {
        self.subject_durations
            .get(type_tag)
            .map(|d| DurationInput::from(d.as_str()))
    }

    /// Broadcast channels for an event kind.
    pub fn channels_for(&self, kind: EventKind) -> &[String] {
        match kind {
            EventKind::Locked => &self.channels.locked,
            EventKind::Unlocked => &self.channels.unlocked,
            EventKind::UnlockRequested => &self.channels.request,
        }
    }

    /// Broadcast name for an event kind: the override, else the kind name.
    pub fn broadcast_name(&self, kind: EventKind) -> String {
        self.broadcast_as
            .get(kind.as_str())
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| kind.as_str().to_string())
    }

    /// Show a holder qualified by the configured holder model.
    pub fn describe_holder(&self, holder: &HolderId) -> String {
        format!("{} {}", self.holder_model, holder)
    }
}
