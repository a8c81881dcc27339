//! Shared fixtures for unit tests.

use crate::clock::ManualClock;
use crate::config::Config;
use crate::duration::DurationInput;
use crate::events::MemoryDispatcher;
use crate::locks::{LockEngine, Locker};
use crate::principal::{FixedPrincipal, HolderId};
use crate::store::MemoryLockStore;
use crate::subject::{LockState, Lockable, SubjectRef};
use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Changes the process working directory until dropped.
pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Fixed start time for clock-driven tests.
pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap()
}

/// A lockable entity with an optional entity-level duration.
#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub id: u64,
    pub lock_duration: Option<String>,
    pub state: LockState,
}

impl Post {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            lock_duration: None,
            state: LockState::default(),
        }
    }

    pub(crate) fn with_lock_duration(mut self, duration: &str) -> Self {
        self.lock_duration = Some(duration.to_string());
        self
    }
}

impl Lockable for Post {
    fn subject_ref(&self) -> SubjectRef {
        SubjectRef {
            type_tag: "post".to_string(),
            id: self.id.to_string(),
        }
    }

    fn lock_state(&self) -> &LockState {
        &self.state
    }

    fn lock_state_mut(&mut self) -> &mut LockState {
        &mut self.state
    }

    fn lock_duration(&self) -> Option<DurationInput> {
        self.lock_duration.as_deref().map(DurationInput::from)
    }
}

/// In-memory locker wired to a manual clock and a recording dispatcher.
pub(crate) struct Harness {
    pub locker: Locker,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryLockStore>,
    pub dispatcher: Arc<MemoryDispatcher>,
}

impl Harness {
    pub(crate) fn new(config: Config) -> Self {
        Self::with_principal(config, None)
    }

    pub(crate) fn with_principal(config: Config, principal: Option<&str>) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = Arc::new(MemoryLockStore::new());
        let dispatcher = Arc::new(MemoryDispatcher::new());

        let engine = LockEngine::new(store.clone(), config)
            .with_clock(clock.clone())
            .with_principal_lookup(Arc::new(FixedPrincipal(principal.map(HolderId::from))))
            .with_dispatcher(dispatcher.clone());

        Self {
            locker: Locker::new(engine),
            clock,
            store,
            dispatcher,
        }
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.locker.engine().now()
    }
}
