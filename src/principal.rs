//! Lock holders and principal lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the principal (user or session) holding a lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HolderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HolderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HolderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for HolderId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// An identity object that can hold locks.
pub trait Principal {
    fn principal_id(&self) -> HolderId;
}

impl Principal for HolderId {
    fn principal_id(&self) -> HolderId {
        self.clone()
    }
}

/// Looks up the principal acting right now, if any.
pub trait PrincipalLookup: Send + Sync {
    fn current_principal_id(&self) -> Option<HolderId>;
}

/// Lookup for contexts without an authenticated principal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrincipal;

impl PrincipalLookup for NoPrincipal {
    fn current_principal_id(&self) -> Option<HolderId> {
        None
    }
}

/// Lookup that always answers with the same principal.
#[derive(Debug, Clone)]
pub struct FixedPrincipal(pub Option<HolderId>);

impl PrincipalLookup for FixedPrincipal {
    fn current_principal_id(&self) -> Option<HolderId> {
        self.0.clone()
    }
}

/// Lookup that identifies the local OS user as `user@HOST`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvPrincipal;

impl PrincipalLookup for EnvPrincipal {
    fn current_principal_id(&self) -> Option<HolderId> {
        Some(HolderId(local_actor()))
    }
}

/// The local actor string, `user@HOST`.
pub(crate) fn local_actor() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Pick the holder for a lock.
///
/// An explicit holder wins. Otherwise the current principal is used when
/// `use_current_principal` is set; no principal yields `None`.
pub fn resolve_holder(
    explicit: Option<HolderId>,
    use_current_principal: bool,
    lookup: &dyn PrincipalLookup,
) -> Option<HolderId> {
    if explicit.is_some() {
        return explicit;
    }

    if use_current_principal {
        lookup.current_principal_id()
    } else {
        None
    }
}
