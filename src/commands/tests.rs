//! Tests for command flows against a temporary store.

use super::*;
use crate::cli::{ListArgs, LockArgs, RequestUnlockArgs, SubjectArgs, TokenArgs};
use crate::commands::init::CONFIG_TEMPLATE;
use crate::error::LockingError;
use crate::events::{EventKind, EventLog};
use crate::locks::LockRecord;
use crate::store::LockStore;
use std::fs;
use tempfile::TempDir;

fn init_store() -> (TempDir, StoreContext) {
    let temp_dir = TempDir::new().unwrap();
    let ctx = StoreContext::at(temp_dir.path().join("store"));
    cmd_init(&ctx).unwrap();
    (temp_dir, ctx)
}

fn subject_args(id: &str) -> SubjectArgs {
    SubjectArgs {
        type_tag: "post".to_string(),
        id: id.to_string(),
    }
}

fn lock_args(id: &str, duration: Option<&str>, holder: Option<&str>) -> LockArgs {
    LockArgs {
        subject: subject_args(id),
        duration: duration.map(str::to_string),
        holder: holder.map(str::to_string),
    }
}

fn token_args(id: &str, token: Option<&str>) -> TokenArgs {
    TokenArgs {
        subject: subject_args(id),
        token: token.map(str::to_string),
    }
}

fn stored(ctx: &StoreContext) -> Vec<LockRecord> {
    FileLockStore::new(&ctx.locks_dir).all().unwrap()
}

fn event_kinds(ctx: &StoreContext) -> Vec<EventKind> {
    EventLog::new(ctx.events_file())
        .read_all()
        .unwrap()
        .into_iter()
        .map(|entry| entry.event.kind())
        .collect()
}

#[test]
fn test_init_creates_layout() {
    let (_temp_dir, ctx) = init_store();

    assert!(ctx.locks_dir.is_dir());
    assert!(ctx.events_dir().is_dir());
    assert_eq!(fs::read_to_string(ctx.config_path()).unwrap(), CONFIG_TEMPLATE);
}

#[test]
fn test_init_template_is_valid_config() {
    let config = Config::from_yaml(CONFIG_TEMPLATE).unwrap();

    assert!(config.default_duration.is_none());
    assert!(config.use_current_principal);
    assert!(config.broadcast_enabled);
}

#[test]
fn test_init_is_idempotent() {
    let (_temp_dir, ctx) = init_store();
    fs::write(ctx.config_path(), "default_duration: 2 minutes\n").unwrap();

    cmd_init(&ctx).unwrap();

    assert_eq!(
        fs::read_to_string(ctx.config_path()).unwrap(),
        "default_duration: 2 minutes\n"
    );
}

#[test]
fn test_init_rejects_invalid_existing_config() {
    let (_temp_dir, ctx) = init_store();
    fs::write(ctx.config_path(), "default_duration: someday\n").unwrap();

    let err = cmd_init(&ctx).unwrap_err();
    assert!(matches!(err, LockingError::UserError(_)));
}

#[test]
fn test_commands_require_init() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = StoreContext::at(temp_dir.path().join("missing"));

    let err = cmd_lock(&ctx, lock_args("1", None, None)).unwrap_err();
    assert!(matches!(err, LockingError::UserError(_)));
    assert!(err.to_string().contains("softlock init"));
}

#[test]
fn test_lock_writes_record_and_event() {
    let (_temp_dir, ctx) = init_store();

    cmd_lock(&ctx, lock_args("1", Some("10 minutes"), Some("alice"))).unwrap();

    let records = stored(&ctx);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].holder_id.as_ref().unwrap().as_str(), "alice");
    assert!(records[0].token().is_some());
    assert_eq!(event_kinds(&ctx), vec![EventKind::Locked]);
}

#[test]
fn test_lock_uses_current_user_as_holder() {
    let (_temp_dir, ctx) = init_store();

    cmd_lock(&ctx, lock_args("1", None, None)).unwrap();

    let holder = stored(&ctx)[0].holder_id.clone().unwrap();
    assert!(holder.as_str().contains('@'));
}

#[test]
fn test_invalid_duration_maps_to_exit_code() {
    let (_temp_dir, ctx) = init_store();

    let err = cmd_lock(&ctx, lock_args("1", Some("eventually"), None)).unwrap_err();

    assert!(matches!(err, LockingError::InvalidDuration(_)));
    assert_eq!(err.exit_code(), crate::exit_codes::INVALID_DURATION);
    assert!(stored(&ctx).is_empty());
}

#[test]
fn test_check_honours_token() {
    let (_temp_dir, ctx) = init_store();
    cmd_lock(&ctx, lock_args("1", None, Some("alice"))).unwrap();
    let token = stored(&ctx)[0].token().unwrap().to_string();

    cmd_check(&ctx, token_args("1", Some(&token))).unwrap();
    cmd_check(&ctx, token_args("2", None)).unwrap();

    let err = cmd_check(&ctx, token_args("1", Some("wrong"))).unwrap_err();
    assert!(matches!(err, LockingError::Locked(_)));
    assert_eq!(err.exit_code(), crate::exit_codes::LOCKED);
    assert!(err.to_string().contains("post:1 is locked by user alice"));
}

#[test]
fn test_relock_keeps_token() {
    let (_temp_dir, ctx) = init_store();
    cmd_lock(&ctx, lock_args("1", None, None)).unwrap();
    let first = stored(&ctx)[0].token().unwrap().to_string();

    cmd_lock(&ctx, lock_args("1", Some("1 hour"), None)).unwrap();

    let records = stored(&ctx);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].token(), Some(first.as_str()));
}

#[test]
fn test_unlock_twice_logs_one_event() {
    let (_temp_dir, ctx) = init_store();
    cmd_lock(&ctx, lock_args("1", None, None)).unwrap();

    cmd_unlock(&ctx, subject_args("1")).unwrap();
    cmd_unlock(&ctx, subject_args("1")).unwrap();

    assert!(stored(&ctx).is_empty());
    assert_eq!(
        event_kinds(&ctx),
        vec![EventKind::Locked, EventKind::Unlocked]
    );
}

#[test]
fn test_request_unlock_shortens_with_config() {
    let (_temp_dir, ctx) = init_store();
    fs::write(ctx.config_path(), "request_shorten_duration: 30 seconds\n").unwrap();
    cmd_lock(&ctx, lock_args("1", Some("1 hour"), Some("alice"))).unwrap();
    let before = stored(&ctx)[0].locked_until;

    cmd_request_unlock(
        &ctx,
        RequestUnlockArgs {
            subject: subject_args("1"),
            user: Some("bob".to_string()),
            message: "need it".to_string(),
        },
    )
    .unwrap();

    let record = &stored(&ctx)[0];
    assert!(record.locked_until < before);
    assert_eq!(record.holder_id.as_ref().unwrap().as_str(), "alice");

    let entries = EventLog::new(ctx.events_file()).read_all().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].event.kind(), EventKind::UnlockRequested);
}

#[test]
fn test_request_unlock_on_free_subject_logs_nothing() {
    let (_temp_dir, ctx) = init_store();

    cmd_request_unlock(
        &ctx,
        RequestUnlockArgs {
            subject: subject_args("1"),
            user: None,
            message: String::new(),
        },
    )
    .unwrap();

    assert!(event_kinds(&ctx).is_empty());
}

#[test]
fn test_status_and_list_run() {
    let (_temp_dir, ctx) = init_store();
    cmd_list(&ctx, ListArgs { all: false }).unwrap();

    cmd_lock(&ctx, lock_args("1", None, Some("alice"))).unwrap();

    cmd_status(&ctx, token_args("1", Some("nope"))).unwrap();
    cmd_status(&ctx, token_args("2", None)).unwrap();
    cmd_list(&ctx, ListArgs { all: true }).unwrap();
}

#[test]
fn test_flush_removes_expired_locks() {
    let (_temp_dir, ctx) = init_store();
    cmd_lock(&ctx, lock_args("1", Some("-1 minute"), None)).unwrap();
    cmd_lock(&ctx, lock_args("2", Some("1 hour"), None)).unwrap();

    run(&ctx, Command::Flush).unwrap();

    let records = stored(&ctx);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subject.id, "2");
    assert_eq!(
        event_kinds(&ctx),
        vec![EventKind::Locked, EventKind::Locked, EventKind::Unlocked]
    );
}

#[test]
fn test_empty_subject_rejected() {
    let (_temp_dir, ctx) = init_store();

    let err = cmd_lock(&ctx, lock_args(" ", None, None)).unwrap_err();
    assert!(matches!(err, LockingError::UserError(_)));
}

#[test]
fn test_check_names_holder_with_configured_model() {
    let (_temp_dir, ctx) = init_store();
    fs::write(ctx.config_path(), "holder_model: account\n").unwrap();
    cmd_lock(&ctx, lock_args("1", None, Some("alice"))).unwrap();

    let err = cmd_check(&ctx, token_args("1", None)).unwrap_err();
    assert!(err.to_string().contains("locked by account alice"));
}
