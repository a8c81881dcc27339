//! Configuration model for softlock.
//!
//! This module defines the Config struct that represents `config.yaml` in the
//! store directory. It supports forward-compatible YAML parsing (unknown
//! fields are ignored), defaults for every field, and validation of values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Config;
pub use types::ChannelConfig;
