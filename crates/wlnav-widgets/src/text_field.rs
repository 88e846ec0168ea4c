#![forbid(unsafe_code)]

//! Single-line text entry spoken one grapheme at a time.
//!
//! Used for renames. The cursor is a grapheme index, so combined characters
//! and emoji move and delete as one unit. Every edit is echoed: typed and
//! removed characters are spoken, arrow keys speak the character under the
//! cursor, and Up/Down read the whole text back.
//!
//! Enter validates and emits the text; Escape discards the edit. While open
//! the field swallows every key so typing never leaks into map navigation.

use unicode_segmentation::UnicodeSegmentation;
use wlnav_core::{AnnouncementSink, Announcer, KeyCode, KeyEvent};

use crate::domain::NavError;
use crate::response::Response;

/// Default limit on entered graphemes.
pub const DEFAULT_MAX_LEN: usize = 64;

/// Line editor with speech feedback.
#[derive(Debug, Clone)]
pub struct TextField {
    prompt: String,
    text: String,
    /// Cursor position in graphemes.
    cursor: usize,
    max_len: usize,
    announcer: Announcer,
    active: bool,
}

impl Default for TextField {
    fn default() -> Self {
        Self::new()
    }
}

impl TextField {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prompt: String::new(),
            text: String::new(),
            cursor: 0,
            max_len: DEFAULT_MAX_LEN,
            // Typing the same letter twice must be heard twice.
            announcer: Announcer::new().with_dedupe(false),
            active: false,
        }
    }

    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(1);
        self
    }

    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len.max(1);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_suppressing(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in graphemes.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    fn byte_offset(&self, grapheme: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn grapheme_at(&self, grapheme: usize) -> Option<&str> {
        self.text.graphemes(true).nth(grapheme)
    }

    /// Open with `initial` text, cursor at the end.
    pub fn open(
        &mut self,
        prompt: impl Into<String>,
        initial: impl Into<String>,
        sink: &mut dyn AnnouncementSink,
    ) -> Result<(), NavError> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(NavError::Disallowed {
                kind: "text field",
                reason: "missing prompt".to_owned(),
            });
        }
        self.text = initial.into();
        self.cursor = self.grapheme_count();
        self.active = true;
        tracing::debug!(prompt = %prompt, len = self.cursor, "text field opened");
        let text = if self.text.is_empty() {
            format!("{prompt}, empty")
        } else {
            format!("{prompt}: {}", self.text)
        };
        self.prompt = prompt;
        self.announcer.normal(sink, text);
        Ok(())
    }

    /// Close, discarding any edit.
    pub fn close(&mut self) {
        self.active = false;
        self.text.clear();
        self.prompt.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char, sink: &mut dyn AnnouncementSink) {
        if self.grapheme_count() >= self.max_len {
            self.announcer.high(sink, format!("Maximum length {} reached", self.max_len));
            return;
        }
        let before = self.grapheme_count();
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        // A combining mark joins the previous grapheme instead of adding one.
        if self.grapheme_count() > before {
            self.cursor += 1;
        }
        self.announcer.normal(sink, speak_grapheme(&c.to_string()));
    }

    pub fn delete_backward(&mut self, sink: &mut dyn AnnouncementSink) {
        if self.cursor == 0 {
            self.announcer.normal(sink, "Beginning of text");
            return;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        let removed: String = self.text.drain(start..end).collect();
        self.cursor -= 1;
        self.announcer.normal(sink, speak_grapheme(&removed));
    }

    pub fn delete_forward(&mut self, sink: &mut dyn AnnouncementSink) {
        if self.cursor >= self.grapheme_count() {
            self.announcer.normal(sink, "End of text");
            return;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        let removed: String = self.text.drain(start..end).collect();
        self.announcer.normal(sink, speak_grapheme(&removed));
    }

    /// Delete back to the start of the previous word.
    pub fn delete_word_backward(&mut self, sink: &mut dyn AnnouncementSink) {
        let target = self.word_start_before(self.cursor);
        if target == self.cursor {
            self.announcer.normal(sink, "Beginning of text");
            return;
        }
        let start = self.byte_offset(target);
        let end = self.byte_offset(self.cursor);
        let removed: String = self.text.drain(start..end).collect();
        self.cursor = target;
        self.announcer.normal(sink, removed.trim().to_owned());
    }

    fn word_start_before(&self, from: usize) -> usize {
        let graphemes: Vec<&str> = self.text.graphemes(true).collect();
        let mut i = from.min(graphemes.len());
        while i > 0 && is_space(graphemes[i - 1]) {
            i -= 1;
        }
        while i > 0 && !is_space(graphemes[i - 1]) {
            i -= 1;
        }
        i
    }

    fn word_end_after(&self, from: usize) -> usize {
        let graphemes: Vec<&str> = self.text.graphemes(true).collect();
        let mut i = from.min(graphemes.len());
        while i < graphemes.len() && is_space(graphemes[i]) {
            i += 1;
        }
        while i < graphemes.len() && !is_space(graphemes[i]) {
            i += 1;
        }
        i
    }

    fn announce_cursor(&mut self, sink: &mut dyn AnnouncementSink) {
        let text = match self.grapheme_at(self.cursor) {
            Some(g) => speak_grapheme(g),
            None => "End of text".to_owned(),
        };
        self.announcer.normal(sink, text);
    }

    pub fn move_left(&mut self, sink: &mut dyn AnnouncementSink) {
        if self.cursor == 0 {
            self.announcer.normal(sink, "Beginning of text");
            return;
        }
        self.cursor -= 1;
        self.announce_cursor(sink);
    }

    pub fn move_right(&mut self, sink: &mut dyn AnnouncementSink) {
        if self.cursor >= self.grapheme_count() {
            self.announcer.normal(sink, "End of text");
            return;
        }
        self.cursor += 1;
        self.announce_cursor(sink);
    }

    pub fn move_word_left(&mut self, sink: &mut dyn AnnouncementSink) {
        self.cursor = self.word_start_before(self.cursor);
        self.announce_cursor(sink);
    }

    pub fn move_word_right(&mut self, sink: &mut dyn AnnouncementSink) {
        self.cursor = self.word_end_after(self.cursor);
        self.announce_cursor(sink);
    }

    pub fn move_home(&mut self, sink: &mut dyn AnnouncementSink) {
        self.cursor = 0;
        self.announcer.normal(sink, "Beginning of text");
    }

    pub fn move_end(&mut self, sink: &mut dyn AnnouncementSink) {
        self.cursor = self.grapheme_count();
        self.announcer.normal(sink, "End of text");
    }

    /// Speak the whole text.
    pub fn read_back(&mut self, sink: &mut dyn AnnouncementSink) {
        let text = if self.text.is_empty() {
            "Empty".to_owned()
        } else {
            self.text.clone()
        };
        self.announcer.normal(sink, text);
    }

    fn submit(&mut self, sink: &mut dyn AnnouncementSink) -> Response<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            self.announcer.high(sink, "Text cannot be empty");
            return Response::Consumed;
        }
        if self.grapheme_count() > self.max_len {
            self.announcer.high(sink, format!("Text is longer than {} characters", self.max_len));
            return Response::Consumed;
        }
        let submitted = trimmed.to_owned();
        tracing::debug!(len = submitted.len(), "text submitted");
        self.close();
        Response::Emit(submitted)
    }

    pub fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn AnnouncementSink) -> Response<String> {
        if !self.active {
            return Response::Ignored;
        }
        let ctrl = key.has_ctrl();
        match key.code {
            KeyCode::Escape => {
                self.close();
                return Response::Closed;
            }
            KeyCode::Enter => return self.submit(sink),
            KeyCode::Backspace if ctrl => self.delete_word_backward(sink),
            KeyCode::Backspace => self.delete_backward(sink),
            KeyCode::Delete => self.delete_forward(sink),
            KeyCode::Left if ctrl => self.move_word_left(sink),
            KeyCode::Left => self.move_left(sink),
            KeyCode::Right if ctrl => self.move_word_right(sink),
            KeyCode::Right => self.move_right(sink),
            KeyCode::Home => self.move_home(sink),
            KeyCode::End => self.move_end(sink),
            KeyCode::Up | KeyCode::Down => self.read_back(sink),
            _ => match key.text() {
                Some(c) => self.insert_char(c, sink),
                None => return Response::Ignored,
            },
        }
        Response::Consumed
    }
}

fn is_space(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

fn speak_grapheme(g: &str) -> String {
    if is_space(g) {
        "space".to_owned()
    } else {
        g.to_owned()
    }
}
