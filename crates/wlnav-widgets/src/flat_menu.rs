#![forbid(unsafe_code)]

//! Flat menu navigator shared by every list-shaped controller.
//!
//! [`FlatMenu`] bundles the entry list, a wrapping [`ListCursor`], and a
//! per-menu [`Announcer`]. Kind controllers build a fresh entry list from
//! domain state and call [`FlatMenu::load`] on open or
//! [`FlatMenu::rebuild`] after a mutation; the menu keeps the selection on
//! the same `(kind, label)` entry, or clamps forward when it disappeared.
//!
//! # Announcement format
//!
//! ```text
//! {label}[ (unavailable)][, {detail}]. {i} of {n}
//! ```
//!
//! The position suffix is dropped when `announce_positions` is off.
//!
//! # Invariants
//! 1. The entry list is never empty: an empty build is replaced by a single
//!    disabled note carrying the menu's empty label.
//! 2. The cursor index is always within the entry list.

use std::fmt::Write as _;

use wlnav_core::rebuild::{relocate, snapshot};
use wlnav_core::{AnnouncementSink, Announcer, KeyCode, KeyEvent, ListCursor, MenuEntry, MenuEntryKind};

/// Default page length for PageUp/PageDown.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Presentation and navigation options shared by flat and tree menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOptions {
    /// Rows skipped by PageUp/PageDown.
    pub page_size: usize,
    /// Append `i of n` to every selection announcement.
    pub announce_positions: bool,
    /// Drop `Normal` announcements identical to the previous one.
    pub dedupe: bool,
    /// Letter keys jump to the next entry starting with that letter.
    pub typeahead: bool,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            announce_positions: true,
            dedupe: true,
            typeahead: true,
        }
    }
}

impl MenuOptions {
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_positions(mut self, announce_positions: bool) -> Self {
        self.announce_positions = announce_positions;
        self
    }

    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    #[must_use]
    pub fn with_typeahead(mut self, typeahead: bool) -> Self {
        self.typeahead = typeahead;
        self
    }
}

/// Entry list, cursor, and announcer for one flat menu.
#[derive(Debug, Clone)]
pub struct FlatMenu<P> {
    entries: Vec<MenuEntry<P>>,
    cursor: ListCursor,
    announcer: Announcer,
    options: MenuOptions,
    empty_label: String,
}

impl<P> FlatMenu<P> {
    /// Empty menu whose placeholder note reads `empty_label`.
    #[must_use]
    pub fn new(empty_label: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            cursor: ListCursor::new(),
            announcer: Announcer::new(),
            options: MenuOptions::default(),
            empty_label: empty_label.into(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.set_options(options);
        self
    }

    pub fn set_options(&mut self, options: MenuOptions) {
        self.announcer.set_dedupe(options.dedupe);
        self.options = options;
    }

    #[must_use]
    pub fn options(&self) -> &MenuOptions {
        &self.options
    }

    fn fill(&self, entries: Vec<MenuEntry<P>>) -> Vec<MenuEntry<P>> {
        if entries.is_empty() {
            vec![MenuEntry::note(self.empty_label.clone())]
        } else {
            entries
        }
    }

    /// Replace the model on open. Selects `initial` (clamped) and clears
    /// the repeat cache so the first announcement is never dropped.
    pub fn load(&mut self, entries: Vec<MenuEntry<P>>, initial: usize) {
        self.entries = self.fill(entries);
        self.cursor = ListCursor::at(initial, self.entries.len());
        self.announcer.forget();
    }

    /// Drop all model state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = ListCursor::new();
        self.announcer.forget();
    }

    /// Replace the model after a mutation, keeping the selection in place.
    pub fn rebuild(&mut self, entries: Vec<MenuEntry<P>>) {
        let previous = self.cursor.index();
        let key = snapshot(&self.entries, previous);
        let entries = self.fill(entries);
        let index = relocate(key.as_ref(), &entries, previous);
        self.entries = entries;
        self.cursor.select(index, self.entries.len());
    }

    #[must_use]
    pub fn entries(&self) -> &[MenuEntry<P>] {
        &self.entries
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&MenuEntry<P>> {
        self.entries.get(self.cursor.index())
    }

    #[must_use]
    pub fn selected_payload(&self) -> Option<&P> {
        self.selected().and_then(MenuEntry::payload)
    }

    /// True when only the placeholder note is showing.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.entries.len() == 1 && self.entries[0].kind == MenuEntryKind::Note && self.entries[0].label == self.empty_label
    }

    pub fn select_index(&mut self, index: usize) {
        self.cursor.select(index, self.entries.len());
    }

    /// Select the first entry carrying `payload`. Used after create or paste
    /// to land on the new entry.
    pub fn select_payload(&mut self, payload: &P) -> bool
    where
        P: PartialEq,
    {
        match self.entries.iter().position(|e| e.payload() == Some(payload)) {
            Some(i) => {
                self.cursor.select(i, self.entries.len());
                true
            }
            None => false,
        }
    }

    pub fn select_next(&mut self) {
        self.cursor.move_next(self.entries.len());
    }

    pub fn select_previous(&mut self) {
        self.cursor.move_previous(self.entries.len());
    }

    pub fn select_first(&mut self) {
        self.cursor.first();
    }

    pub fn select_last(&mut self) {
        self.cursor.last(self.entries.len());
    }

    pub fn page_down(&mut self) {
        self.cursor.page_down(self.entries.len(), self.options.page_size);
    }

    pub fn page_up(&mut self) {
        self.cursor.page_up(self.entries.len(), self.options.page_size);
    }

    /// Move to the next entry whose label starts with `c`, wrapping.
    ///
    /// The current entry is checked last, so repeated presses cycle through
    /// every match.
    pub fn jump_to_prefix(&mut self, c: char) -> bool {
        let len = self.entries.len();
        let start = self.cursor.index();
        let found = (1..=len)
            .map(|step| (start + step) % len)
            .find(|&i| starts_with_ignore_case(&self.entries[i].label, c));
        match found {
            Some(i) => {
                self.cursor.select(i, len);
                true
            }
            None => false,
        }
    }

    /// Announcement text for row `index`.
    #[must_use]
    pub fn describe_at(&self, index: usize) -> Option<String> {
        let entry = self.entries.get(index)?;
        let mut text = entry.label.clone();
        if !entry.enabled && entry.kind != MenuEntryKind::Note {
            text.push_str(" (unavailable)");
        }
        if !entry.detail.is_empty() {
            text.push_str(", ");
            text.push_str(&entry.detail);
        }
        if self.options.announce_positions {
            let _ = write!(text, ". {} of {}", index + 1, self.entries.len());
        }
        Some(text)
    }

    /// Announcement text for the current selection.
    #[must_use]
    pub fn describe(&self) -> String {
        self.describe_at(self.cursor.index()).unwrap_or_default()
    }

    /// Speak the current selection at `Normal` priority.
    pub fn announce_selection(&mut self, sink: &mut dyn AnnouncementSink) -> bool {
        let text = self.describe();
        self.announcer.normal(sink, text)
    }

    /// Speak the current selection even if it was the last thing said.
    pub fn reannounce(&mut self, sink: &mut dyn AnnouncementSink) -> bool {
        self.announcer.forget();
        self.announce_selection(sink)
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer {
        &mut self.announcer
    }

    /// Say `text` at `High` priority through this menu's announcer.
    pub fn say_high(&mut self, sink: &mut dyn AnnouncementSink, text: impl Into<String>) -> bool {
        self.announcer.high(sink, text)
    }

    /// Say `text` at `Normal` priority through this menu's announcer.
    pub fn say(&mut self, sink: &mut dyn AnnouncementSink, text: impl Into<String>) -> bool {
        self.announcer.normal(sink, text)
    }

    /// Refuse Delete and Ctrl+C in a menu whose entries can be neither
    /// deleted nor copied. Returns `true` when `key` was one of them.
    pub fn refuse_edit(&mut self, key: &KeyEvent, sink: &mut dyn AnnouncementSink) -> bool {
        match key.code {
            KeyCode::Delete => self.say_high(sink, "Cannot delete this item"),
            KeyCode::Char(c) if key.has_ctrl() && c.eq_ignore_ascii_case(&'c') => {
                self.say_high(sink, "Cannot copy this item")
            }
            _ => return false,
        };
        true
    }

    /// Handle the movement keys every flat menu shares.
    ///
    /// Up/Down wrap, Home/End jump, PageUp/PageDown clamp, and letters jump
    /// by prefix when type-ahead is on. Returns `false` for anything else so
    /// the caller can try its own bindings.
    pub fn handle_navigation(&mut self, key: &KeyEvent, sink: &mut dyn AnnouncementSink) -> bool {
        if key.has_ctrl() || key.has_alt() {
            return false;
        }
        match key.code {
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::Char(c) if self.options.typeahead && c.is_alphanumeric() => {
                if !self.jump_to_prefix(c) {
                    let upper: String = c.to_uppercase().collect();
                    self.say_high(sink, format!("No item starting with {upper}"));
                    return true;
                }
            }
            _ => return false,
        }
        self.announce_selection(sink);
        true
    }
}

fn starts_with_ignore_case(label: &str, c: char) -> bool {
    label
        .chars()
        .next()
        .is_some_and(|first| first.to_lowercase().eq(c.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wlnav_core::{Announcement, Priority};

    fn menu(labels: &[&str]) -> FlatMenu<usize> {
        let mut m = FlatMenu::new("Nothing here");
        m.load(
            labels.iter().enumerate().map(|(i, l)| MenuEntry::leaf(*l, i)).collect(),
            0,
        );
        m
    }

    fn texts(sink: &[Announcement]) -> Vec<&str> {
        sink.iter().map(|a| a.text.as_str()).collect()
    }

    #[test]
    fn down_wraps_and_announces_position() {
        let mut m = menu(&["A", "B"]);
        let mut sink: Vec<Announcement> = Vec::new();
        let down = KeyEvent::plain(KeyCode::Down);
        assert!(m.handle_navigation(&down, &mut sink));
        assert!(m.handle_navigation(&down, &mut sink));
        assert_eq!(texts(&sink), vec!["B. 2 of 2", "A. 1 of 2"]);
    }

    #[test]
    fn empty_build_gets_placeholder() {
        let mut m: FlatMenu<usize> = FlatMenu::new("No bills");
        m.load(Vec::new(), 3);
        assert_eq!(m.len(), 1);
        assert!(m.is_placeholder());
        assert_eq!(m.selected_payload(), None);
        assert_eq!(m.describe(), "No bills. 1 of 1");
    }

    #[test]
    fn single_entry_movement_is_deduplicated() {
        let mut m = menu(&["Only"]);
        let mut sink: Vec<Announcement> = Vec::new();
        m.reannounce(&mut sink);
        m.handle_navigation(&KeyEvent::plain(KeyCode::Down), &mut sink);
        m.handle_navigation(&KeyEvent::plain(KeyCode::Up), &mut sink);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn rebuild_after_delete_clamps_forward() {
        let mut m = menu(&["A", "B", "C", "D", "E"]);
        m.select_index(2);
        m.rebuild(vec![
            MenuEntry::leaf("A", 0),
            MenuEntry::leaf("B", 1),
            MenuEntry::leaf("D", 3),
            MenuEntry::leaf("E", 4),
        ]);
        assert_eq!(m.index(), 2);
        assert_eq!(m.selected().map(|e| e.label.as_str()), Some("D"));
    }

    #[test]
    fn rebuild_to_empty_shows_placeholder() {
        let mut m = menu(&["A"]);
        m.rebuild(Vec::new());
        assert!(m.is_placeholder());
        assert_eq!(m.index(), 0);
    }

    #[test]
    fn select_payload_finds_new_entry() {
        let mut m = menu(&["A", "B"]);
        m.rebuild(vec![MenuEntry::leaf("A", 0), MenuEntry::leaf("B", 1), MenuEntry::leaf("B", 9)]);
        assert!(m.select_payload(&9));
        assert_eq!(m.index(), 2);
        assert!(!m.select_payload(&42));
    }

    #[test]
    fn disabled_and_detail_are_announced() {
        let mut m: FlatMenu<u8> = FlatMenu::new("x");
        m.load(vec![MenuEntry::toggle("Make parka", 1).with_detail("suspended").with_enabled(false)], 0);
        assert_eq!(m.describe(), "Make parka (unavailable), suspended. 1 of 1");
    }

    #[test]
    fn positions_can_be_disabled() {
        let mut m = menu(&["A"]);
        m.set_options(MenuOptions::default().with_positions(false));
        assert_eq!(m.describe(), "A");
    }

    #[test]
    fn typeahead_cycles_matches() {
        let mut m = menu(&["Apple", "Bread", "Avocado"]);
        let mut sink: Vec<Announcement> = Vec::new();
        m.handle_navigation(&KeyEvent::char('a'), &mut sink);
        assert_eq!(m.index(), 2);
        m.handle_navigation(&KeyEvent::char('a'), &mut sink);
        assert_eq!(m.index(), 0);
    }

    #[test]
    fn typeahead_miss_is_high() {
        let mut m = menu(&["Apple"]);
        let mut sink: Vec<Announcement> = Vec::new();
        assert!(m.handle_navigation(&KeyEvent::char('z'), &mut sink));
        assert_eq!(sink, vec![Announcement::new("No item starting with Z", Priority::High)]);
    }

    #[test]
    fn paging_clamps() {
        let labels: Vec<String> = (0..25).map(|i| format!("Item {i}")).collect();
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let mut m = menu(&refs);
        m.page_down();
        assert_eq!(m.index(), 10);
        m.page_down();
        m.page_down();
        assert_eq!(m.index(), 24);
        m.page_up();
        assert_eq!(m.index(), 14);
    }

    #[test]
    fn ctrl_keys_are_not_navigation() {
        let mut m = menu(&["A", "B"]);
        let mut sink: Vec<Announcement> = Vec::new();
        assert!(!m.handle_navigation(&KeyEvent::ctrl(KeyCode::Down), &mut sink));
        assert!(!m.handle_navigation(&KeyEvent::plain(KeyCode::Enter), &mut sink));
        assert!(sink.is_empty());
    }
}
