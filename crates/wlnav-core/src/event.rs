#![forbid(unsafe_code)]

//! Discrete key events delivered by the host input source.
//!
//! The engine only ever sees key-down events: there is no release, repeat,
//! or analog input. Keys can be written in a compact notation
//! (`"Ctrl+Shift+Up"`, `"Delete"`, `"b"`) which [`KeyEvent`] both parses and
//! prints, so bindings can live in configuration files.

use std::fmt;
use std::str::FromStr;

bitflags::bitflags! {
    /// Modifier keys held while a key was pressed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b000;
        /// Shift key.
        const SHIFT = 0b001;
        /// Alt / Option key.
        const ALT   = 0b010;
        /// Control key.
        const CTRL  = 0b100;
    }
}

/// Identifier of the pressed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyCode {
    /// A printable character (space included).
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key `F1`..`F24`.
    F(u8),
}

/// A single key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Key pressed without modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// Key pressed with Shift held.
    #[must_use]
    pub const fn shift(code: KeyCode) -> Self {
        Self::new(code, Modifiers::SHIFT)
    }

    /// Key pressed with Ctrl held.
    #[must_use]
    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(code, Modifiers::CTRL)
    }

    /// Key pressed with Alt held.
    #[must_use]
    pub const fn alt(code: KeyCode) -> Self {
        Self::new(code, Modifiers::ALT)
    }

    /// Unmodified printable character.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    /// True if this is the given character (ignoring case) without Ctrl or Alt.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        match self.code {
            KeyCode::Char(got) => {
                !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
                    && got.to_lowercase().eq(c.to_lowercase())
            }
            _ => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn has_shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    #[inline]
    #[must_use]
    pub fn has_ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[inline]
    #[must_use]
    pub fn has_alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Printable text this key would type, if any.
    ///
    /// Keys held with Ctrl or Alt never type text.
    #[must_use]
    pub fn text(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
                    && !c.is_control() =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    /// Canonical form used for binding comparison: characters lowercased.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(c) => {
                let lower = c.to_lowercase().next().unwrap_or(c);
                Self::new(KeyCode::Char(lower), self.modifiers)
            }
            _ => self,
        }
    }

    /// True if `other` is the same chord after normalization.
    #[must_use]
    pub fn matches(&self, other: &KeyEvent) -> bool {
        self.normalized() == other.normalized()
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::plain(code)
    }
}

// ---------------------------------------------------------------------------
// Notation
// ---------------------------------------------------------------------------

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("Space"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Enter => f.write_str("Enter"),
            Self::Escape => f.write_str("Escape"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Delete => f.write_str("Delete"),
            Self::Tab => f.write_str("Tab"),
            Self::BackTab => f.write_str("BackTab"),
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::PageUp => f.write_str("PageUp"),
            Self::PageDown => f.write_str("PageDown"),
            Self::F(n) => write!(f, "F{n}"),
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_ctrl() {
            f.write_str("Ctrl+")?;
        }
        if self.has_alt() {
            f.write_str("Alt+")?;
        }
        if self.has_shift() {
            f.write_str("Shift+")?;
        }
        write!(f, "{}", self.code)
    }
}

/// Failure to parse key notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The input was empty.
    Empty,
    /// A modifier name was not recognized.
    UnknownModifier(String),
    /// The key name was not recognized.
    UnknownKey(String),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty key notation"),
            Self::UnknownModifier(m) => write!(f, "unknown modifier: {m}"),
            Self::UnknownKey(k) => write!(f, "unknown key: {k}"),
        }
    }
}

impl std::error::Error for KeyParseError {}

fn parse_modifier(name: &str) -> Result<Modifiers, KeyParseError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Ok(Modifiers::CTRL),
        "alt" | "option" => Ok(Modifiers::ALT),
        "shift" => Ok(Modifiers::SHIFT),
        _ => Err(KeyParseError::UnknownModifier(name.to_string())),
    }
}

fn parse_code(name: &str) -> Result<KeyCode, KeyParseError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c.to_lowercase().next().unwrap_or(c)));
    }
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Escape,
        "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "plus" => KeyCode::Char('+'),
        _ => {
            let n = lower
                .strip_prefix('f')
                .and_then(|digits| digits.parse::<u8>().ok())
                .filter(|n| (1..=24).contains(n));
            match n {
                Some(n) => KeyCode::F(n),
                None => return Err(KeyParseError::UnknownKey(name.to_string())),
            }
        }
    };
    Ok(code)
}

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }
        if s == "+" {
            return Ok(Self::char('+'));
        }
        let (mods_part, key_part) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => s.rsplit_once('+').unwrap_or(("", s)),
        };
        if key_part.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        for name in mods_part.split('+').filter(|m| !m.trim().is_empty()) {
            modifiers |= parse_modifier(name)?;
        }
        Ok(Self::new(parse_code(key_part.trim())?, modifiers))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_names() {
        assert_eq!("Enter".parse(), Ok(KeyEvent::plain(KeyCode::Enter)));
        assert_eq!("esc".parse(), Ok(KeyEvent::plain(KeyCode::Escape)));
        assert_eq!("PgDn".parse(), Ok(KeyEvent::plain(KeyCode::PageDown)));
        assert_eq!("F5".parse(), Ok(KeyEvent::plain(KeyCode::F(5))));
        assert_eq!("space".parse(), Ok(KeyEvent::char(' ')));
    }

    #[test]
    fn parse_modifiers_any_order() {
        let expected = KeyEvent::new(KeyCode::Up, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!("Ctrl+Shift+Up".parse(), Ok(expected));
        assert_eq!("shift+ctrl+up".parse(), Ok(expected));
    }

    #[test]
    fn parse_single_char_is_lowercased() {
        assert_eq!("B".parse(), Ok(KeyEvent::char('b')));
        assert_eq!("Ctrl+C".parse(), Ok(KeyEvent::ctrl(KeyCode::Char('c'))));
    }

    #[test]
    fn parse_plus_key() {
        assert_eq!("+".parse(), Ok(KeyEvent::char('+')));
        assert_eq!("Ctrl++".parse(), Ok(KeyEvent::ctrl(KeyCode::Char('+'))));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<KeyEvent>(), Err(KeyParseError::Empty));
        assert_eq!(
            "Hyper+X".parse::<KeyEvent>(),
            Err(KeyParseError::UnknownModifier("Hyper".into()))
        );
        assert_eq!(
            "Banana".parse::<KeyEvent>(),
            Err(KeyParseError::UnknownKey("Banana".into()))
        );
        assert!("F99".parse::<KeyEvent>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for notation in ["Ctrl+Shift+Up", "Alt+Delete", "Space", "F12", "x"] {
            let key: KeyEvent = notation.parse().unwrap();
            assert_eq!(key.to_string().parse::<KeyEvent>(), Ok(key));
        }
    }

    #[test]
    fn text_ignores_ctrl_and_alt() {
        assert_eq!(KeyEvent::char('a').text(), Some('a'));
        assert_eq!(KeyEvent::shift(KeyCode::Char('A')).text(), Some('A'));
        assert_eq!(KeyEvent::ctrl(KeyCode::Char('a')).text(), None);
        assert_eq!(KeyEvent::alt(KeyCode::Char('a')).text(), None);
        assert_eq!(KeyEvent::plain(KeyCode::Enter).text(), None);
    }

    #[test]
    fn matches_is_case_insensitive_for_chars() {
        let bound: KeyEvent = "b".parse().unwrap();
        assert!(bound.matches(&KeyEvent::char('B')));
        assert!(!bound.matches(&KeyEvent::ctrl(KeyCode::Char('b'))));
    }

    #[test]
    fn is_char_rejects_ctrl() {
        assert!(KeyEvent::char('y').is_char('Y'));
        assert!(!KeyEvent::ctrl(KeyCode::Char('y')).is_char('y'));
    }
}
