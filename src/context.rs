//! Store directory resolution for the CLI.
//!
//! Every command works against one store directory:
//!
//! ```text
//! <root>/
//!   config.yaml
//!   locks/           one `<type>~<id>.lock` file per subject
//!   events/
//!     events.ndjson
//! ```
//!
//! The root comes from `--store`, else `$SOFTLOCK_DIR`, else `./.softlock`.

use crate::error::{LockingError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the store directory.
pub const STORE_DIR_ENV: &str = "SOFTLOCK_DIR";

/// Store directory used when nothing else is given, relative to the cwd.
pub const DEFAULT_STORE_DIR: &str = ".softlock";

/// Resolved paths of a store directory. All paths are absolute.
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub root: PathBuf,
    pub locks_dir: PathBuf,
}

impl StoreContext {
    /// Resolve the store directory.
    ///
    /// # Returns
    ///
    /// * `Ok(StoreContext)` - Resolved paths; nothing is created
    /// * `Err(LockingError::UserError)` - The working directory is unavailable
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            LockingError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        let root = match explicit {
            Some(dir) => dir.to_path_buf(),
            None => match env::var_os(STORE_DIR_ENV) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => PathBuf::from(DEFAULT_STORE_DIR),
            },
        };

        Ok(Self::at(cwd.join(root)))
    }

    /// Context rooted at a known directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let locks_dir = root.join("locks");
        Self { root, locks_dir }
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir() && self.locks_dir.is_dir()
    }

    /// Fail with a pointer to `softlock init` unless the store exists.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.exists() {
            return Err(LockingError::UserError(format!(
                "lock store not initialized.\n\
                 Expected lock directory at: {}\n\n\
                 Run `softlock init` to create it.",
                self.locks_dir.display()
            )));
        }
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn events_dir(&self) -> PathBuf {
        self.root.join("events")
    }

    pub fn events_file(&self) -> PathBuf {
        self.events_dir().join("events.ndjson")
    }
}
