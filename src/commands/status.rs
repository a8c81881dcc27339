//! Implementations of `softlock status`, `check` and `list`.

use super::{load_subject, open_locker};
use crate::cli::{ListArgs, TokenArgs};
use crate::context::StoreContext;
use crate::error::{LockingError, Result};
use crate::subject::Lockable;

/// Execute the `softlock status` command.
pub fn cmd_status(ctx: &StoreContext, args: TokenArgs) -> Result<()> {
    let locker = open_locker(ctx)?;
    let subject = load_subject(&locker, &args.subject)?;
    let now = locker.engine().now();

    println!("Subject:    {}:{}", args.subject.type_tag, args.subject.id);
    match locker.locked_until(&subject) {
        Some(until) => {
            let remaining = subject
                .lock_state()
                .record()
                .map(|record| record.remaining_string(now))
                .unwrap_or_default();
            let holder = locker
                .locked_by(&subject)
                .map(|h| locker.engine().config().describe_holder(&h))
                .unwrap_or_else(|| "-".to_string());

            println!("Locked:     yes");
            println!("Holder:     {}", holder);
            println!("Until:      {} ({} left)", until.to_rfc3339(), remaining);
        }
        None => println!("Locked:     no"),
    }

    if args.token.is_some() {
        let accessible = locker.is_accessible(&subject, args.token.as_deref());
        println!("Accessible: {}", if accessible { "yes" } else { "no" });
    }

    Ok(())
}

/// Execute the `softlock check` command.
///
/// Succeeds when the subject is accessible with the token; otherwise fails
/// with [`LockingError::Locked`].
pub fn cmd_check(ctx: &StoreContext, args: TokenArgs) -> Result<()> {
    let locker = open_locker(ctx)?;
    let subject = load_subject(&locker, &args.subject)?;

    if locker.is_accessible(&subject, args.token.as_deref()) {
        return Ok(());
    }

    let holder = locker
        .locked_by(&subject)
        .map(|h| format!(" by {}", locker.engine().config().describe_holder(&h)))
        .unwrap_or_default();
    let until = locker
        .locked_until(&subject)
        .map(|t| format!(" until {}", t.to_rfc3339()))
        .unwrap_or_default();

    Err(LockingError::Locked(format!(
        "{}:{} is locked{}{}",
        args.subject.type_tag, args.subject.id, holder, until
    )))
}

/// Execute the `softlock list` command.
pub fn cmd_list(ctx: &StoreContext, args: ListArgs) -> Result<()> {
    let locker = open_locker(ctx)?;
    let engine = locker.engine();
    let now = engine.now();

    let records: Vec<_> = engine
        .store()
        .all()?
        .into_iter()
        .filter(|record| args.all || record.is_active_at(now))
        .collect();

    if records.is_empty() {
        println!("No locks.");
        return Ok(());
    }

    println!("{:<30} {:<24} {:<26} REMAINING", "SUBJECT", "HOLDER", "UNTIL");
    for record in records {
        let holder = record
            .holder_id
            .as_ref()
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<30} {:<24} {:<26} {}",
            record.subject.to_string(),
            holder,
            record.locked_until.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            record.remaining_string(now)
        );
    }

    Ok(())
}
