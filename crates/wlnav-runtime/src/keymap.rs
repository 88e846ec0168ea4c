#![forbid(unsafe_code)]

//! Global key bindings.
//!
//! Bindings are written in key notation (`"Ctrl+R"`, `"i"`) so they can
//! live in a JSON config. [`KeyBindings::resolve`] parses them once into a
//! [`Keymap`], rejecting unknown keys and duplicates.

use serde::{Deserialize, Serialize};
use wlnav_core::KeyEvent;

use crate::error::ConfigError;

/// What a global binding does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// Speak the last announcement again. Works in every layer.
    RepeatLast,
    Inspect,
    Bills,
    ZoneActions,
    AreaManager,
    Trade,
    Filter,
}

/// Bindings as written in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub repeat_last: String,
    pub inspect: String,
    pub bills: String,
    pub zone_actions: String,
    pub area_manager: String,
    pub trade: String,
    pub filter: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            repeat_last: "Ctrl+R".to_owned(),
            inspect: "i".to_owned(),
            bills: "b".to_owned(),
            zone_actions: "z".to_owned(),
            area_manager: "a".to_owned(),
            trade: "t".to_owned(),
            filter: "f".to_owned(),
        }
    }
}

impl KeyBindings {
    fn fields(&self) -> [(&'static str, Binding, &str); 7] {
        [
            ("repeat_last", Binding::RepeatLast, &self.repeat_last),
            ("inspect", Binding::Inspect, &self.inspect),
            ("bills", Binding::Bills, &self.bills),
            ("zone_actions", Binding::ZoneActions, &self.zone_actions),
            ("area_manager", Binding::AreaManager, &self.area_manager),
            ("trade", Binding::Trade, &self.trade),
            ("filter", Binding::Filter, &self.filter),
        ]
    }

    /// Parse every binding.
    pub fn resolve(&self) -> Result<Keymap, ConfigError> {
        let mut entries: Vec<(&'static str, KeyEvent, Binding)> = Vec::new();
        for (field, binding, notation) in self.fields() {
            let key: KeyEvent = notation
                .parse()
                .map_err(|source| ConfigError::Binding { field, source })?;
            if let Some((first, _, _)) = entries.iter().find(|(_, k, _)| k.matches(&key)) {
                return Err(ConfigError::DuplicateBinding { first, second: field });
            }
            entries.push((field, key, binding));
        }
        Ok(Keymap {
            entries: entries.into_iter().map(|(_, key, binding)| (key.normalized(), binding)).collect(),
        })
    }
}

/// Parsed bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    entries: Vec<(KeyEvent, Binding)>,
}

impl Default for Keymap {
    fn default() -> Self {
        // The default notation always parses.
        KeyBindings::default().resolve().unwrap_or(Self { entries: Vec::new() })
    }
}

impl Keymap {
    #[must_use]
    pub fn lookup(&self, key: &KeyEvent) -> Option<Binding> {
        self.entries.iter().find(|(k, _)| k.matches(key)).map(|(_, b)| *b)
    }

    #[must_use]
    pub fn key_for(&self, binding: Binding) -> Option<KeyEvent> {
        self.entries.iter().find(|(_, b)| *b == binding).map(|(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlnav_core::KeyCode;

    #[test]
    fn defaults_resolve() {
        let map = Keymap::default();
        assert_eq!(map.lookup(&KeyEvent::ctrl(KeyCode::Char('r'))), Some(Binding::RepeatLast));
        assert_eq!(map.lookup(&KeyEvent::char('B')), Some(Binding::Bills));
        assert_eq!(map.lookup(&KeyEvent::plain(KeyCode::Down)), None);
        assert_eq!(map.key_for(Binding::Trade), Some(KeyEvent::char('t')));
    }

    #[test]
    fn unknown_key_is_reported_with_field() {
        let bindings = KeyBindings {
            inspect: "Hyper+I".into(),
            ..KeyBindings::default()
        };
        let err = bindings.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Binding { field: "inspect", .. }));
    }

    #[test]
    fn duplicate_keys_rejected() {
        let bindings = KeyBindings {
            trade: "B".into(),
            ..KeyBindings::default()
        };
        let err = bindings.resolve().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateBinding {
                first: "bills",
                second: "trade"
            }
        ));
    }
}
