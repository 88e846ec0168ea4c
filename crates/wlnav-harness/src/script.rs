#![forbid(unsafe_code)]

//! Key scripts: whitespace-separated key notation with optional repeats.
//!
//! ```
//! use wlnav_harness::KeyScript;
//!
//! let script: KeyScript = "Down*3 Enter Escape".parse().unwrap();
//! assert_eq!(script.len(), 5);
//! ```
//!
//! Each token is parsed by `KeyEvent::from_str`, so `Ctrl+R`, `Shift+Up`
//! and single characters work. `Token*N` repeats a key `N` times.

use std::fmt;
use std::str::FromStr;

use wlnav_core::{KeyEvent, KeyParseError};

/// Failure to parse a key script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Key { token: String, source: KeyParseError },
    Repeat { token: String },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key { token, source } => write!(f, "bad key {token:?}: {source}"),
            Self::Repeat { token } => write!(f, "bad repeat count in {token:?}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Key { source, .. } => Some(source),
            Self::Repeat { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyScript {
    keys: Vec<KeyEvent>,
}

impl KeyScript {
    #[must_use]
    pub fn keys(&self) -> &[KeyEvent] {
        &self.keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn push(&mut self, key: KeyEvent) {
        self.keys.push(key);
    }
}

fn split_repeat(token: &str) -> Result<(&str, usize), ScriptError> {
    match token.rsplit_once('*') {
        // A bare `*` (or `Shift+*`) is the asterisk key.
        Some((key, "")) if !key.is_empty() && !key.ends_with('+') => Err(ScriptError::Repeat {
            token: token.to_owned(),
        }),
        Some((key, count)) if !key.is_empty() && !key.ends_with('+') => {
            let n = count.parse::<usize>().map_err(|_| ScriptError::Repeat {
                token: token.to_owned(),
            })?;
            Ok((key, n))
        }
        _ => Ok((token, 1)),
    }
}

impl FromStr for KeyScript {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut keys = Vec::new();
        for token in s.split_whitespace() {
            let (notation, count) = split_repeat(token)?;
            let key: KeyEvent = notation.parse().map_err(|source| ScriptError::Key {
                token: token.to_owned(),
                source,
            })?;
            keys.extend(std::iter::repeat_n(key, count));
        }
        Ok(Self { keys })
    }
}

impl fmt::Display for KeyScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a KeyScript {
    type Item = &'a KeyEvent;
    type IntoIter = std::slice::Iter<'a, KeyEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlnav_core::KeyCode;

    #[test]
    fn repeats_expand() {
        let script: KeyScript = "Down*3 Enter Escape".parse().unwrap();
        let codes: Vec<KeyCode> = script.keys().iter().map(|k| k.code).collect();
        assert_eq!(
            codes,
            vec![KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Enter, KeyCode::Escape]
        );
    }

    #[test]
    fn modifiers_and_characters() {
        let script: KeyScript = "Ctrl+R Shift+Up b *".parse().unwrap();
        assert_eq!(script.keys()[0], KeyEvent::ctrl(KeyCode::Char('r')));
        assert_eq!(script.keys()[1], KeyEvent::shift(KeyCode::Up));
        assert!(script.keys()[2].is_char('b'));
        assert!(script.keys()[3].is_char('*'));
    }

    #[test]
    fn zero_repeat_is_empty() {
        let script: KeyScript = "Down*0".parse().unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn bad_tokens_report() {
        assert!(matches!("Down*x".parse::<KeyScript>(), Err(ScriptError::Repeat { .. })));
        assert!(matches!("Hyper+Q".parse::<KeyScript>(), Err(ScriptError::Key { .. })));
    }

    #[test]
    fn display_round_trips_notation() {
        let script: KeyScript = "Down*2 Ctrl+R".parse().unwrap();
        assert_eq!(script.to_string(), "Down Down Ctrl+r");
    }
}
