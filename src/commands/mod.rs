//! Command implementations for softlock.
//!
//! [`dispatch`] resolves the store directory and routes each CLI command to
//! its handler. Handlers take a resolved [`StoreContext`] so tests can point
//! them at a temporary store.

mod init;
mod lock;
mod status;

#[cfg(test)]
mod tests;

use crate::cli::{Command, SubjectArgs};
use crate::config::Config;
use crate::context::StoreContext;
use crate::error::Result;
use crate::events::EventLog;
use crate::locks::{LockEngine, Locker};
use crate::principal::EnvPrincipal;
use crate::store::FileLockStore;
use crate::subject::{SubjectHandle, SubjectRef};
use crate::sweep::{AllSubjects, flush_expired};
use std::path::Path;
use std::sync::Arc;

pub use init::cmd_init;
pub use lock::{cmd_lock, cmd_request_unlock, cmd_unlock};
pub use status::{cmd_check, cmd_list, cmd_status};

/// Dispatch a command to its implementation.
pub fn dispatch(store: Option<&Path>, command: Command) -> Result<()> {
    let ctx = StoreContext::resolve(store)?;
    run(&ctx, command)
}

/// Run a command against a resolved store.
pub fn run(ctx: &StoreContext, command: Command) -> Result<()> {
    match command {
        Command::Init => cmd_init(ctx),
        Command::Lock(args) => cmd_lock(ctx, args),
        Command::Unlock(args) => cmd_unlock(ctx, args),
        Command::Status(args) => cmd_status(ctx, args),
        Command::Check(args) => cmd_check(ctx, args),
        Command::RequestUnlock(args) => cmd_request_unlock(ctx, args),
        Command::List(args) => cmd_list(ctx, args),
        Command::Flush => cmd_flush(ctx),
    }
}

/// Build a locker over the store's files, config and event log.
///
/// The current principal is the local `user@HOST`.
pub fn open_locker(ctx: &StoreContext) -> Result<Locker> {
    ctx.ensure_initialized()?;
    let config = Config::load_or_default(ctx.config_path())?;

    let engine = LockEngine::new(Arc::new(FileLockStore::new(&ctx.locks_dir)), config)
        .with_principal_lookup(Arc::new(EnvPrincipal))
        .with_dispatcher(Arc::new(EventLog::new(ctx.events_file())));

    Ok(Locker::new(engine))
}

/// Load the subject named on the command line with its current lock.
fn load_subject(locker: &Locker, args: &SubjectArgs) -> Result<SubjectHandle> {
    let subject = SubjectRef::new(args.type_tag.as_str(), args.id.as_str())?;
    let mut handle = SubjectHandle::new(subject);
    locker.load(&mut handle)?;
    Ok(handle)
}

/// Execute the `softlock flush` command.
pub fn cmd_flush(ctx: &StoreContext) -> Result<()> {
    let locker = open_locker(ctx)?;
    let report = flush_expired(locker.engine(), &AllSubjects)?;

    if report.removed == 0 {
        println!("No expired locks.");
    } else {
        println!("Flushed {} expired lock(s).", report.removed);
        for subject in &report.unlocked {
            println!("  unlocked {}", subject);
        }
    }

    Ok(())
}
