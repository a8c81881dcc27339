//! Implementation of the `softlock init` command.
//!
//! Creates the store layout (`locks/`, `events/`) and a commented
//! `config.yaml`. Idempotent: an existing config is left untouched.

use crate::config::Config;
use crate::context::StoreContext;
use crate::error::{LockingError, Result};
use crate::fs::atomic_write_file;
use std::fs;
use std::path::Path;

/// Written to `config.yaml` on first init. Every key is optional.
pub(crate) const CONFIG_TEMPLATE: &str = r#"# softlock configuration
#
# Durations accept relative descriptions ("5 minutes", "1 hour 30 minutes")
# or absolute timestamps ("2025-06-01 12:00:00"). Empty or "0" means unset.

# Lock duration when neither the call nor the subject type sets one.
# Falls back to 5 minutes.
# default_duration: 5 minutes

# Per-type defaults, consulted before default_duration.
subject_durations: {}

# Re-lock for this long when someone requests an unlock.
# request_shorten_duration: 1 minute

# Record the current user as holder when none is given.
use_current_principal: true

holder_model: user

# Event broadcast metadata written to events/events.ndjson.
broadcast_enabled: true
broadcast_as: {}
channels:
  locked: []
  unlocked: []
  request: []
"#;

/// Execute the `softlock init` command.
pub fn cmd_init(ctx: &StoreContext) -> Result<()> {
    create_dir(&ctx.locks_dir)?;
    create_dir(&ctx.events_dir())?;

    let config_path = ctx.config_path();
    let config_created = if config_path.exists() {
        Config::load(&config_path)?;
        false
    } else {
        atomic_write_file(&config_path, CONFIG_TEMPLATE)?;
        true
    };

    println!("Initialized lock store at {}", ctx.root.display());
    if !config_created {
        println!("Kept existing {}", config_path.display());
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        LockingError::Storage(format!(
            "failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}
