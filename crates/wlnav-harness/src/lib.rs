#![forbid(unsafe_code)]

//! Test harness for wlnav.
//!
//! # Role in wlnav
//! `wlnav-harness` drives a real [`NavSession`] against [`FakeColony`], an
//! in-memory host implementing every domain trait, so end-to-end behavior
//! (arbitration, child composition, rebuild reselection) can be checked
//! by what the player would hear.
//!
//! ```
//! use wlnav_harness::{Harness, colony};
//!
//! let mut h = Harness::new();
//! h.goto(colony::STOVE_CELL);
//! let transcript = h.run("b Down Enter").unwrap();
//! assert_eq!(transcript.len(), 3);
//! ```

pub mod colony;
pub mod script;
pub mod transcript;

use wlnav_core::{Announcement, KeyEvent};
use wlnav_runtime::{ConfigError, Dispatch, NavConfig, NavSession};
use wlnav_widgets::Cell;

pub use colony::FakeColony;
pub use script::{KeyScript, ScriptError};
pub use transcript::{Step, Transcript};

/// A session wired to a fake colony, speaking into a `Vec`.
pub struct Harness {
    pub colony: FakeColony,
    pub session: NavSession<Vec<Announcement>>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Sample colony, default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            colony: FakeColony::sample(),
            session: NavSession::with_defaults(Vec::new()),
        }
    }

    pub fn with_config(colony: FakeColony, config: NavConfig) -> Result<Self, ConfigError> {
        let session = NavSession::new(config, Vec::new())?;
        Ok(Self { colony, session })
    }

    /// Move the map cursor silently.
    pub fn goto(&mut self, cell: Cell) {
        self.session.place_cursor(&self.colony, cell);
    }

    pub fn press(&mut self, key: KeyEvent) -> Dispatch {
        self.session.dispatch(&mut self.colony, &key)
    }

    /// Replay `script`, recording each step.
    pub fn play(&mut self, script: &KeyScript) -> Transcript {
        let mut transcript = Transcript::new();
        for key in script {
            let before = self.spoken().len();
            let dispatch = self.press(*key);
            let spoken = self.spoken()[before..].to_vec();
            tracing::debug!(key = %key, ?dispatch, spoken = spoken.len(), "script step");
            transcript.push(Step {
                key: *key,
                dispatch,
                spoken,
            });
        }
        transcript
    }

    /// Parse and replay key notation such as `"Down*3 Enter Escape"`.
    pub fn run(&mut self, script: &str) -> Result<Transcript, ScriptError> {
        let script: KeyScript = script.parse()?;
        Ok(self.play(&script))
    }

    /// Everything spoken so far.
    #[must_use]
    pub fn spoken(&self) -> &[Announcement] {
        self.session.sink()
    }

    #[must_use]
    pub fn last_spoken(&self) -> Option<&str> {
        self.spoken().last().map(|a| a.text.as_str())
    }
}
