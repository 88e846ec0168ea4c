#![forbid(unsafe_code)]

//! Generic choice picker.
//!
//! Opened by a parent controller (through the session) to pick one value:
//! a recipe for a new bill, a priority for a zone. Executing an enabled
//! choice closes the picker and emits the value; the parent performs the
//! mutation and re-selects the result.

use wlnav_core::{AnnouncementSink, KeyCode, KeyEvent, MenuEntry};

use crate::domain::NavError;
use crate::flat_menu::{FlatMenu, MenuOptions};
use crate::response::Response;

/// One option offered by a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<T> {
    pub label: String,
    pub detail: String,
    pub value: T,
    pub enabled: bool,
}

impl<T> Choice<T> {
    #[must_use]
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            detail: String::new(),
            value,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Flat list of choices; emits the picked value.
#[derive(Debug, Clone)]
pub struct ChoicePicker<T> {
    menu: FlatMenu<usize>,
    choices: Vec<Choice<T>>,
    title: String,
    active: bool,
}

impl<T> Default for ChoicePicker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChoicePicker<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            menu: FlatMenu::new("No choices"),
            choices: Vec::new(),
            title: String::new(),
            active: false,
        }
    }

    pub fn set_options(&mut self, options: MenuOptions) {
        self.menu.set_options(options);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_suppressing(&self) -> bool {
        false
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn menu(&self) -> &FlatMenu<usize> {
        &self.menu
    }

    /// Open on `choices`, selecting `initial`. Refuses an empty list.
    pub fn open(
        &mut self,
        title: impl Into<String>,
        choices: Vec<Choice<T>>,
        initial: usize,
        sink: &mut dyn AnnouncementSink,
    ) -> Result<(), NavError> {
        let title = title.into();
        if choices.is_empty() {
            tracing::warn!(title = %title, "picker refused: no choices");
            return Err(NavError::Disallowed {
                kind: "picker",
                reason: "no choices".to_owned(),
            });
        }
        let entries = choices
            .iter()
            .enumerate()
            .map(|(i, c)| {
                MenuEntry::action(c.label.clone(), i)
                    .with_detail(c.detail.clone())
                    .with_enabled(c.enabled)
            })
            .collect();
        self.menu.load(entries, initial);
        self.choices = choices;
        self.active = true;
        tracing::debug!(title = %title, count = self.choices.len(), "picker opened");
        let text = format!("{title}. {}", self.menu.describe());
        self.title = title;
        self.menu.say(sink, text);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.active {
            tracing::debug!(title = %self.title, "picker closed");
        }
        self.active = false;
        self.menu.clear();
        self.choices.clear();
    }

    pub fn handle_key(&mut self, key: &KeyEvent, sink: &mut dyn AnnouncementSink) -> Response<T> {
        if !self.active {
            return Response::Ignored;
        }
        match key.code {
            KeyCode::Escape => {
                self.close();
                Response::Closed
            }
            KeyCode::Enter => self.pick(sink),
            _ if self.menu.refuse_edit(key, sink) => Response::Consumed,
            _ => Response::consumed_if(self.menu.handle_navigation(key, sink)),
        }
    }

    fn pick(&mut self, sink: &mut dyn AnnouncementSink) -> Response<T> {
        let Some(&index) = self.menu.selected_payload() else {
            return Response::Consumed;
        };
        let enabled = self.choices.get(index).is_some_and(|c| c.enabled);
        if !enabled {
            let label = self.choices.get(index).map(|c| c.label.clone()).unwrap_or_default();
            self.menu.say_high(sink, format!("{label} is not available"));
            return Response::Consumed;
        }
        let choices = std::mem::take(&mut self.choices);
        self.close();
        match choices.into_iter().nth(index) {
            Some(choice) => Response::Emit(choice.value),
            None => Response::Closed,
        }
    }
}
