//! Implementations of `softlock lock`, `unlock` and `request-unlock`.

use super::{load_subject, open_locker};
use crate::cli::{LockArgs, RequestUnlockArgs, SubjectArgs};
use crate::context::StoreContext;
use crate::error::Result;
use crate::locks::LockArg;
use crate::principal::HolderId;

/// Execute the `softlock lock` command, printing the token.
pub fn cmd_lock(ctx: &StoreContext, args: LockArgs) -> Result<()> {
    let locker = open_locker(ctx)?;
    let mut subject = load_subject(&locker, &args.subject)?;

    let duration = args.duration.map(LockArg::from);
    let holder = args.holder.map(HolderId::from);
    let token = locker.lock(&mut subject, duration, holder)?;

    println!("{}", token);
    Ok(())
}

/// Execute the `softlock unlock` command.
pub fn cmd_unlock(ctx: &StoreContext, args: SubjectArgs) -> Result<()> {
    let locker = open_locker(ctx)?;
    let mut subject = load_subject(&locker, &args)?;

    if locker.unlock(&mut subject)? {
        println!("Unlocked {}:{}", args.type_tag, args.id);
    } else {
        println!("{}:{} was not locked", args.type_tag, args.id);
    }
    Ok(())
}

/// Execute the `softlock request-unlock` command.
pub fn cmd_request_unlock(ctx: &StoreContext, args: RequestUnlockArgs) -> Result<()> {
    let locker = open_locker(ctx)?;
    let mut subject = load_subject(&locker, &args.subject)?;

    let user = locker
        .engine()
        .resolve_holder(args.user.map(HolderId::from));

    match locker.request_unlock(&mut subject, user, &args.message)? {
        Some(until) => println!("Unlock requested; locked until {}", until.to_rfc3339()),
        None => println!(
            "{}:{} is not locked",
            args.subject.type_tag, args.subject.id
        ),
    }
    Ok(())
}
