#![forbid(unsafe_code)]

//! Domain identifiers and the errors domain calls can return.
//!
//! Controllers never hold domain objects. They hold ids and hand them back
//! to a domain trait; the host resolves an id against its live state on
//! every call, so a stale id surfaces as [`DomainError::Missing`] instead of
//! a dangling reference.

use std::fmt;

use wlnav_core::{AnnouncementSink, Announcer};

/// Identity of a host object (bill, zone, area, thing, map object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Map cell coordinate. `y` grows northward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Name of a host definition (recipe, thing def, category, custom action).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefName(pub String);

impl DefName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DefName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Failure of a write-side domain call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The host refused the mutation; the string is spoken to the player.
    Rejected(String),
    /// The host failed unexpectedly; nothing was mutated.
    Failed(String),
    /// The target no longer exists.
    Missing,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
            Self::Missing => f.write_str("target no longer exists"),
        }
    }
}

impl std::error::Error for DomainError {}

/// Reason a controller refused to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// The domain object to open on does not exist.
    MissingTarget(String),
    /// The target exists but this kind cannot be opened on it.
    Disallowed { kind: &'static str, reason: String },
    Domain(DomainError),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget(what) => write!(f, "missing target: {what}"),
            Self::Disallowed { kind, reason } => write!(f, "cannot open {kind}: {reason}"),
            Self::Domain(err) => write!(f, "domain error: {err}"),
        }
    }
}

impl std::error::Error for NavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomainError> for NavError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Missing => Self::MissingTarget("target".to_owned()),
            other => Self::Domain(other),
        }
    }
}

/// Speak a failed domain call at `High` priority.
///
/// Rejections read the host's reason verbatim; unexpected failures are
/// prefixed with `Error:` and logged.
pub fn report_failure(announcer: &mut Announcer, sink: &mut dyn AnnouncementSink, err: &DomainError) {
    match err {
        DomainError::Rejected(reason) => {
            tracing::debug!(reason = %reason, "domain rejected mutation");
            announcer.high(sink, reason.clone());
        }
        DomainError::Failed(msg) => {
            tracing::warn!(error = %msg, "domain call failed");
            announcer.high(sink, format!("Error: {msg}"));
        }
        DomainError::Missing => {
            tracing::warn!("domain target vanished");
            announcer.high(sink, "Error: item no longer exists");
        }
    }
}
