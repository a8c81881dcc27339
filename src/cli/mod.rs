//! CLI argument parsing for softlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! Implementations live in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Softlock: timestamp-based soft locks on arbitrary records.
///
/// A lock names a subject (`<type> <id>`), an optional holder, an expiry
/// and a token. Locks are advisory: callers present the token to check
/// whether they may edit.
#[derive(Parser, Debug)]
#[command(name = "softlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store directory (default: $SOFTLOCK_DIR, then ./.softlock).
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for softlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the store directory and a default config.yaml.
    Init,

    /// Lock a subject and print the lock token.
    Lock(LockArgs),

    /// Release a subject's lock.
    Unlock(SubjectArgs),

    /// Show a subject's lock state.
    Status(TokenArgs),

    /// Exit 0 if the subject is accessible with the token, 4 otherwise.
    Check(TokenArgs),

    /// Ask the holder to release a lock.
    ///
    /// Shortens the lock when `request_shorten_duration` is configured.
    RequestUnlock(RequestUnlockArgs),

    /// List active locks.
    List(ListArgs),

    /// Delete expired locks and emit an unlock event per subject.
    Flush,
}

/// Identifies a subject by type tag and id.
#[derive(Args, Debug, Clone)]
pub struct SubjectArgs {
    /// Subject type, e.g. `post`.
    #[arg(value_name = "TYPE")]
    pub type_tag: String,

    /// Subject id.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct LockArgs {
    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Lock duration: "3 minutes", "1 hour 30 minutes", "2 days ago", "now",
    /// "tomorrow", or an expiry timestamp ("2025-06-01 12:00:00", RFC 3339).
    ///
    /// Units: s, min, h, d, w (singular, plural and short forms).
    /// Falls back to the configured default, then 5 minutes.
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Holder id (default: the current user when use_current_principal is set).
    #[arg(long)]
    pub holder: Option<String>,
}

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Lock token to check against.
    #[arg(short, long)]
    pub token: Option<String>,
}

#[derive(Args, Debug)]
pub struct RequestUnlockArgs {
    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Requesting user (default: the current user).
    #[arg(short, long)]
    pub user: Option<String>,

    #[arg(short, long, default_value = "")]
    pub message: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Include expired locks that have not been flushed yet.
    #[arg(long)]
    pub all: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["softlock", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init));
        assert!(cli.store.is_none());
    }

    #[test]
    fn parse_lock_full() {
        let cli = Cli::try_parse_from([
            "softlock",
            "lock",
            "post",
            "42",
            "--duration",
            "3 minutes",
            "--holder",
            "alice",
            "--store",
            "/tmp/locks",
        ])
        .unwrap();

        assert_eq!(cli.store, Some(PathBuf::from("/tmp/locks")));
        match cli.command {
            Command::Lock(args) => {
                assert_eq!(args.subject.type_tag, "post");
                assert_eq!(args.subject.id, "42");
                assert_eq!(args.duration.as_deref(), Some("3 minutes"));
                assert_eq!(args.holder.as_deref(), Some("alice"));
            }
            other => panic!("Expected Lock command, got {:?}", other),
        }
    }

    #[test]
    fn parse_lock_requires_subject() {
        assert!(Cli::try_parse_from(["softlock", "lock", "post"]).is_err());
    }

    #[test]
    fn parse_check_with_token() {
        let cli = Cli::try_parse_from(["softlock", "check", "post", "1", "-t", "abc"]).unwrap();
        match cli.command {
            Command::Check(args) => assert_eq!(args.token.as_deref(), Some("abc")),
            other => panic!("Expected Check command, got {:?}", other),
        }
    }

    #[test]
    fn parse_request_unlock_defaults() {
        let cli = Cli::try_parse_from(["softlock", "request-unlock", "post", "1"]).unwrap();
        match cli.command {
            Command::RequestUnlock(args) => {
                assert!(args.user.is_none());
                assert_eq!(args.message, "");
            }
            other => panic!("Expected RequestUnlock command, got {:?}", other),
        }
    }

    #[test]
    fn parse_list_and_flush() {
        let cli = Cli::try_parse_from(["softlock", "list", "--all"]).unwrap();
        assert!(matches!(cli.command, Command::List(ListArgs { all: true })));

        let cli = Cli::try_parse_from(["softlock", "--store", "s", "flush"]).unwrap();
        assert!(matches!(cli.command, Command::Flush));
    }
}
