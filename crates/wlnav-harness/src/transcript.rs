#![forbid(unsafe_code)]

//! Step-by-step record of a scripted run.
//!
//! Each [`Step`] holds the key, the session's [`Dispatch`] for it, and the
//! announcements that key produced. [`Transcript::to_jsonl`] renders one
//! JSON object per step:
//!
//! ```text
//! {"step":0,"key":"b","dispatch":{"outcome":"opened","layer":"bills"},"spoken":[{"text":"…","priority":"Normal"}]}
//! ```

use serde_json::{Value, json};
use wlnav_core::{Announcement, KeyEvent};
use wlnav_runtime::Dispatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub key: KeyEvent,
    pub dispatch: Dispatch,
    pub spoken: Vec<Announcement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    steps: Vec<Step>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Dispatch outcomes in order.
    #[must_use]
    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.steps.iter().map(|s| s.dispatch).collect()
    }

    /// Every spoken text in order.
    #[must_use]
    pub fn spoken_texts(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.spoken.iter().map(|a| a.text.as_str()))
            .collect()
    }

    #[must_use]
    pub fn last_spoken(&self) -> Option<&Announcement> {
        self.steps.iter().rev().find_map(|s| s.spoken.last())
    }

    #[must_use]
    pub fn step_json(index: usize, step: &Step) -> Value {
        json!({
            "step": index,
            "key": step.key.to_string(),
            "dispatch": serde_json::to_value(step.dispatch).unwrap_or(Value::Null),
            "spoken": serde_json::to_value(&step.spoken).unwrap_or(Value::Null),
        })
    }

    /// One JSON object per line, newline-terminated.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for (index, step) in self.steps.iter().enumerate() {
            out.push_str(&Self::step_json(index, step).to_string());
            out.push('\n');
        }
        out
    }
}
