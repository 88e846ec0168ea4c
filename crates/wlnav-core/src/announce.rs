#![forbid(unsafe_code)]

//! Announcement channel: text handed to the speech/clipboard sink.
//!
//! Announcing is fire-and-forget. The engine never waits for or inspects the
//! sink; it only decides *what* to say and *whether* to say it.
//!
//! # Invariants
//! 1. `High` announcements are always forwarded.
//! 2. With deduplication on, a `Normal` announcement whose text equals the
//!    last text forwarded by the same [`Announcer`] is dropped.
//! 3. Each controller owns its own [`Announcer`]; the cache is never shared.

use std::fmt;

/// Urgency of an announcement. `High` interrupts in-progress speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::High => f.write_str("high"),
        }
    }
}

/// One message for the output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Announcement {
    pub text: String,
    pub priority: Priority,
}

impl Announcement {
    #[must_use]
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }

    #[must_use]
    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(text, Priority::Normal)
    }

    #[must_use]
    pub fn high(text: impl Into<String>) -> Self {
        Self::new(text, Priority::High)
    }
}

/// Destination for announcements (speech synthesizer, clipboard, screen reader).
pub trait AnnouncementSink {
    fn announce(&mut self, announcement: Announcement);
}

impl AnnouncementSink for Vec<Announcement> {
    fn announce(&mut self, announcement: Announcement) {
        self.push(announcement);
    }
}

impl<S: AnnouncementSink + ?Sized> AnnouncementSink for &mut S {
    fn announce(&mut self, announcement: Announcement) {
        (**self).announce(announcement);
    }
}

impl<S: AnnouncementSink + ?Sized> AnnouncementSink for Box<S> {
    fn announce(&mut self, announcement: Announcement) {
        (**self).announce(announcement);
    }
}

/// Per-controller front end to a sink, with repeat suppression.
#[derive(Debug, Clone)]
pub struct Announcer {
    last_text: Option<String>,
    dedupe: bool,
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new()
    }
}

impl Announcer {
    /// Announcer with deduplication enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_text: None,
            dedupe: true,
        }
    }

    /// Enable or disable repeat suppression.
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn set_dedupe(&mut self, dedupe: bool) {
        self.dedupe = dedupe;
    }

    /// Forward `text` unless it repeats the previous `Normal` text.
    ///
    /// Returns `true` if the sink received it.
    pub fn say(&mut self, sink: &mut dyn AnnouncementSink, text: impl Into<String>, priority: Priority) -> bool {
        let text = text.into();
        if priority == Priority::Normal && self.dedupe && self.last_text.as_deref() == Some(text.as_str()) {
            tracing::trace!(text = %text, "announcement deduplicated");
            return false;
        }
        self.last_text = Some(text.clone());
        sink.announce(Announcement::new(text, priority));
        true
    }

    /// Shorthand for `say(.., Priority::Normal)`.
    pub fn normal(&mut self, sink: &mut dyn AnnouncementSink, text: impl Into<String>) -> bool {
        self.say(sink, text, Priority::Normal)
    }

    /// Shorthand for `say(.., Priority::High)`.
    pub fn high(&mut self, sink: &mut dyn AnnouncementSink, text: impl Into<String>) -> bool {
        self.say(sink, text, Priority::High)
    }

    /// Last forwarded text.
    #[must_use]
    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    /// Clear the repeat cache so the next announcement is always forwarded.
    pub fn forget(&mut self) {
        self.last_text = None;
    }
}
