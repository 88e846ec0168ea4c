#![forbid(unsafe_code)]

//! Tracing subscriber installation.
//!
//! Hosts that already run their own subscriber skip [`init`]; every crate
//! only emits through `tracing` macros.

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::LoggingError;

/// Build the filter for `config`.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(&config.filter).map_err(|err| LoggingError::Filter {
        directive: config.filter.clone(),
        message: err.to_string(),
    })
}

/// Install a global fmt subscriber.
///
/// With `json` set and the `tracing-json` feature enabled, each event is
/// one JSON object per line. Without the feature `json` is ignored.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config)?;
    install(config, filter).map_err(|err| LoggingError::AlreadyInstalled(err.to_string()))?;
    tracing::debug!(filter = %config.filter, json = config.json, "logging initialised");
    Ok(())
}

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[cfg(feature = "tracing-json")]
fn install(config: &LogConfig, filter: EnvFilter) -> InitResult {
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);
    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

#[cfg(not(feature = "tracing-json"))]
fn install(_config: &LogConfig, filter: EnvFilter) -> InitResult {
    tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false).try_init()
}
