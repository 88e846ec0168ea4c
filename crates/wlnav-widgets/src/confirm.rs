#![forbid(unsafe_code)]

//! Yes/No confirmation for destructive actions.
//!
//! The dialog starts focused on `No`. Left/Right/Tab cycle the focus, Enter
//! activates it, `y` and `n` answer directly, and Escape dismisses without
//! an answer. While open it takes precedence over every other controller
//! and swallows keys it does not use.

use wlnav_core::{AnnouncementSink, Announcer, KeyCode, KeyEvent, ListCursor};

use crate::domain::NavError;
use crate::response::Response;

const BUTTONS: [&str; 2] = ["Yes", "No"];
const NO: usize = 1;

/// Answer given to a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Confirmed,
    Declined,
}

/// Modal Yes/No question.
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
    message: String,
    focus: ListCursor,
    announcer: Announcer,
    active: bool,
}

impl ConfirmDialog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Label of the focused button.
    #[must_use]
    pub fn focused(&self) -> &'static str {
        BUTTONS[self.focus.index().min(BUTTONS.len() - 1)]
    }

    /// Ask `message`, focusing `No`.
    pub fn open(&mut self, message: impl Into<String>, sink: &mut dyn AnnouncementSink) -> Result<(), NavError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(NavError::Disallowed {
                kind: "confirm",
                reason: "empty question".to_owned(),
            });
        }
        self.focus = ListCursor::at(NO, BUTTONS.len());
        self.announcer.forget();
        self.active = true;
        tracing::debug!(message = %message, "confirmation opened");
        let text = format!("{message} {}", self.describe_focus());
        self.message = message;
        self.announcer.high(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        self.active = false;
        self.message.clear();
        self.focus = ListCursor::new();
    }

    fn describe_focus(&self) -> String {
        format!("{}, button {} of {}", self.focused(), self.focus.index() + 1, BUTTONS.len())
    }

    fn cycle(&mut self, forward: bool, sink: &mut dyn AnnouncementSink) {
        if forward {
            self.focus.move_next(BUTTONS.len());
        } else {
            self.focus.move_previous(BUTTONS.len());
        }
        let text = self.describe_focus();
        self.announcer.normal(sink, text);
    }

    fn answer(&mut self, result: ConfirmResult) -> Response<ConfirmResult> {
        tracing::debug!(?result, "confirmation answered");
        self.close();
        Response::Emit(result)
    }

    pub fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn AnnouncementSink) -> Response<ConfirmResult> {
        if !self.active {
            return Response::Ignored;
        }
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Tab if key.has_shift() => {
                self.cycle(false, sink);
                Response::Consumed
            }
            KeyCode::Right | KeyCode::Tab => {
                self.cycle(true, sink);
                Response::Consumed
            }
            KeyCode::Left | KeyCode::BackTab => {
                self.cycle(false, sink);
                Response::Consumed
            }
            KeyCode::Enter => {
                if self.focus.index() == NO {
                    self.answer(ConfirmResult::Declined)
                } else {
                    self.answer(ConfirmResult::Confirmed)
                }
            }
            _ if key.is_char('y') => self.answer(ConfirmResult::Confirmed),
            _ if key.is_char('n') => self.answer(ConfirmResult::Declined),
            _ => Response::Ignored,
        }
    }
}
