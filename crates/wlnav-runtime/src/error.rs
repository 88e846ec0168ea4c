#![forbid(unsafe_code)]

//! Errors raised while configuring the session.
//!
//! Navigation itself never fails outward: domain failures are spoken and
//! logged inside the controllers. Only setup (config parsing, key bindings,
//! logging installation) returns these.

use std::fmt;
use std::path::PathBuf;

use wlnav_core::KeyParseError;

/// Configuration could not be loaded or is invalid.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The config document is not valid JSON for [`NavConfig`](crate::NavConfig).
    Json(serde_json::Error),
    /// A field holds an out-of-range or unparsable value.
    Invalid {
        field: &'static str,
        value: String,
        message: &'static str,
    },
    /// A key binding could not be parsed.
    Binding { field: &'static str, source: KeyParseError },
    /// Two bindings use the same key.
    DuplicateBinding { first: &'static str, second: &'static str },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: impl Into<String>, message: &'static str) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
            message,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Json(err) => write!(f, "invalid config: {err}"),
            Self::Invalid { field, value, message } => write!(f, "{field}={value} ({message})"),
            Self::Binding { field, source } => write!(f, "binding {field}: {source}"),
            Self::DuplicateBinding { first, second } => {
                write!(f, "bindings {first} and {second} use the same key")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Binding { source, .. } => Some(source),
            Self::Invalid { .. } | Self::DuplicateBinding { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// The tracing subscriber could not be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// The filter directive did not parse.
    Filter { directive: String, message: String },
    /// A global subscriber is already set.
    AlreadyInstalled(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter { directive, message } => write!(f, "bad log filter {directive:?}: {message}"),
            Self::AlreadyInstalled(msg) => write!(f, "subscriber already installed: {msg}"),
        }
    }
}

impl std::error::Error for LoggingError {}
