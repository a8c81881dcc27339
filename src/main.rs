//! Softlock: timestamp-based soft locks on arbitrary records.
//!
//! Main entry point for the `softlock` CLI. Installs logging, parses
//! arguments, dispatches to the command handler, and maps errors to exit
//! codes.

use softlock::cli::Cli;
use softlock::{commands, exit_codes};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse_args();

    match commands::dispatch(cli.store.as_deref(), cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `softlock=warn`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("softlock=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
