#![forbid(unsafe_code)]

//! Session configuration.
//!
//! # Sources
//! Defaults, then an optional JSON document, then `WLNAV_*` environment
//! variables:
//!
//! - `WLNAV_PAGE_SIZE` (positive integer)
//! - `WLNAV_ANNOUNCE_POSITIONS` (bool)
//! - `WLNAV_DEDUPE` (bool)
//! - `WLNAV_TYPEAHEAD` (bool)
//! - `WLNAV_HISTORY` (positive integer)
//! - `WLNAV_TEXT_MAX_LEN` (positive integer)
//! - `WLNAV_TRADE_STEP` (positive integer)
//! - `WLNAV_MAP_JUMP` (positive integer)
//! - `WLNAV_COORDINATES` (bool)
//! - `WLNAV_LOG` (tracing filter directive)
//! - `WLNAV_LOG_JSON` (bool)

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wlnav_widgets::MenuOptions;
use wlnav_widgets::flat_menu::DEFAULT_PAGE_SIZE;
use wlnav_widgets::map_cursor::DEFAULT_JUMP;
use wlnav_widgets::text_field::DEFAULT_MAX_LEN;
use wlnav_widgets::trade::DEFAULT_LARGE_STEP;

use crate::error::ConfigError;
use crate::keymap::KeyBindings;

const ENV_PAGE_SIZE: &str = "WLNAV_PAGE_SIZE";
const ENV_ANNOUNCE_POSITIONS: &str = "WLNAV_ANNOUNCE_POSITIONS";
const ENV_DEDUPE: &str = "WLNAV_DEDUPE";
const ENV_TYPEAHEAD: &str = "WLNAV_TYPEAHEAD";
const ENV_HISTORY: &str = "WLNAV_HISTORY";
const ENV_TEXT_MAX_LEN: &str = "WLNAV_TEXT_MAX_LEN";
const ENV_TRADE_STEP: &str = "WLNAV_TRADE_STEP";
const ENV_MAP_JUMP: &str = "WLNAV_MAP_JUMP";
const ENV_COORDINATES: &str = "WLNAV_COORDINATES";
const ENV_LOG: &str = "WLNAV_LOG";
const ENV_LOG_JSON: &str = "WLNAV_LOG_JSON";

pub const DEFAULT_HISTORY: usize = 50;
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive, e.g. `"wlnav_runtime=debug"`.
    pub filter: String,
    /// One JSON object per line. Needs the `tracing-json` feature.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub page_size: usize,
    pub announce_positions: bool,
    pub dedupe_repeats: bool,
    pub typeahead: bool,
    /// Announcements kept for repeat and inspection.
    pub history_capacity: usize,
    pub text_max_len: usize,
    pub trade_large_step: u32,
    pub map_jump: i32,
    pub announce_coordinates: bool,
    pub bindings: KeyBindings,
    pub log: LogConfig,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            announce_positions: true,
            dedupe_repeats: true,
            typeahead: true,
            history_capacity: DEFAULT_HISTORY,
            text_max_len: DEFAULT_MAX_LEN,
            trade_large_step: DEFAULT_LARGE_STEP,
            map_jump: DEFAULT_JUMP,
            announce_coordinates: false,
            bindings: KeyBindings::default(),
            log: LogConfig::default(),
        }
    }
}

impl NavConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Defaults overridden through `get`.
    pub fn from_env_with<F>(get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self::default().apply_env_with(get)
    }

    /// Apply `WLNAV_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| env::var(key).ok())
    }

    /// Apply `WLNAV_*` overrides read through `get`.
    pub fn apply_env_with<F>(mut self, mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(v) = get(ENV_PAGE_SIZE) {
            self.page_size = parse_positive("page_size", &v)?;
        }
        if let Some(v) = get(ENV_ANNOUNCE_POSITIONS) {
            self.announce_positions = parse_bool("announce_positions", &v)?;
        }
        if let Some(v) = get(ENV_DEDUPE) {
            self.dedupe_repeats = parse_bool("dedupe_repeats", &v)?;
        }
        if let Some(v) = get(ENV_TYPEAHEAD) {
            self.typeahead = parse_bool("typeahead", &v)?;
        }
        if let Some(v) = get(ENV_HISTORY) {
            self.history_capacity = parse_positive("history_capacity", &v)?;
        }
        if let Some(v) = get(ENV_TEXT_MAX_LEN) {
            self.text_max_len = parse_positive("text_max_len", &v)?;
        }
        if let Some(v) = get(ENV_TRADE_STEP) {
            let step = parse_positive("trade_large_step", &v)?;
            self.trade_large_step =
                u32::try_from(step).map_err(|_| ConfigError::invalid("trade_large_step", v, "too large"))?;
        }
        if let Some(v) = get(ENV_MAP_JUMP) {
            let jump = parse_positive("map_jump", &v)?;
            self.map_jump = i32::try_from(jump).map_err(|_| ConfigError::invalid("map_jump", v, "too large"))?;
        }
        if let Some(v) = get(ENV_COORDINATES) {
            self.announce_coordinates = parse_bool("announce_coordinates", &v)?;
        }
        if let Some(v) = get(ENV_LOG) {
            self.log.filter = v;
        }
        if let Some(v) = get(ENV_LOG_JSON) {
            self.log.json = parse_bool("log.json", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check ranges and key bindings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("page_size", self.page_size),
            ("history_capacity", self.history_capacity),
            ("text_max_len", self.text_max_len),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::invalid(field, "0", "expected positive integer"));
            }
        }
        if self.trade_large_step == 0 {
            return Err(ConfigError::invalid("trade_large_step", "0", "expected positive integer"));
        }
        if self.map_jump <= 0 {
            return Err(ConfigError::invalid("map_jump", self.map_jump.to_string(), "expected positive integer"));
        }
        self.bindings.resolve()?;
        Ok(())
    }

    /// Options shared by every menu controller.
    #[must_use]
    pub fn menu_options(&self) -> MenuOptions {
        MenuOptions::default()
            .with_page_size(self.page_size)
            .with_positions(self.announce_positions)
            .with_dedupe(self.dedupe_repeats)
            .with_typeahead(self.typeahead)
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_announce_positions(mut self, on: bool) -> Self {
        self.announce_positions = on;
        self
    }

    #[must_use]
    pub fn with_dedupe(mut self, on: bool) -> Self {
        self.dedupe_repeats = on;
        self
    }

    #[must_use]
    pub fn with_typeahead(mut self, on: bool) -> Self {
        self.typeahead = on;
        self
    }

    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_text_max_len(mut self, max_len: usize) -> Self {
        self.text_max_len = max_len;
        self
    }

    #[must_use]
    pub fn with_trade_large_step(mut self, step: u32) -> Self {
        self.trade_large_step = step;
        self
    }

    #[must_use]
    pub fn with_map_jump(mut self, jump: i32) -> Self {
        self.map_jump = jump;
        self
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(field, value, "expected bool (1/0/true/false)")),
    }
}

fn parse_positive(field: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::invalid(field, value, "expected positive integer"))
}
